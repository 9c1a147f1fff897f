//! Id to display-name mappings built from reference data.

use std::collections::HashMap;

use crate::model::{EntityId, Place, Station};

/// Which catalog an id belongs to; decides the fallback label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Station,
    Place,
}

impl EntityKind {
    /// Synthetic label used when an id has no catalog entry, e.g. `Station X99`.
    pub fn fallback_label(&self, id: &EntityId) -> String {
        match self {
            EntityKind::Station => format!("Station {id}"),
            EntityKind::Place => format!("Place {id}"),
        }
    }
}

/// A reference entity that can be listed in a [`Lookup`].
pub trait Named {
    fn id(&self) -> &EntityId;
    fn display_name(&self) -> &str;
}

impl Named for Station {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Named for Place {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.locality_name
    }
}

/// Mapping from entity id to display name.
#[derive(Debug, Clone)]
pub struct Lookup {
    kind: EntityKind,
    names: HashMap<EntityId, String>,
}

impl Lookup {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Resolves `id` to its name, or the kind's fallback label.
    ///
    /// The flag is `true` when the fallback was used.
    pub fn resolve(&self, id: &EntityId) -> (String, bool) {
        match self.get(id) {
            Some(name) => (name.to_string(), false),
            None => (self.kind.fallback_label(id), true),
        }
    }
}

/// Builds a [`Lookup`] from reference entities.
///
/// Duplicate ids are resolved by the last occurrence.
pub fn build_lookup<'a, T, I>(kind: EntityKind, entities: I) -> Lookup
where
    T: Named + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let names = entities
        .into_iter()
        .map(|e| (e.id().clone(), e.display_name().to_string()))
        .collect();

    Lookup { kind, names }
}
