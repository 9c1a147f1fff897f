//! Reference data and visit events consumed by the aggregation core.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a station or place.
///
/// The items API hands out ids as either JSON numbers or strings; both are
/// normalised to their string form so `1` and `"1"` refer to the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! entity_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for EntityId {
                fn from(id: $t) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

entity_id_from_int!(i32, i64, u32, u64);

impl EntityId {
    /// Reads an id out of a loosely typed JSON field.
    ///
    /// Accepts numbers, non-empty strings and expanded relation objects
    /// carrying an `id`. Anything else yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => i.into(),
                None => Self(n.to_string()),
            }),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().into()),
            serde_json::Value::Object(map) => map.get("id").and_then(Self::from_json),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => n.into(),
            Raw::Float(f) => Self(f.to_string()),
            Raw::Text(s) => s.into(),
        })
    }
}

/// A station from the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: EntityId,
    pub name: String,
    /// Precomputed total kept on the catalog row, if the API provides one.
    pub visitors_count: Option<u64>,
}

/// A place (locality) from the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: EntityId,
    pub locality_name: String,
}

/// A single visit event.
///
/// `created_at` is kept as the raw API string: parsing happens during window
/// aggregation so an unparseable value only drops the record from the
/// time-window counts, not from the rankings. A missing station or place
/// reference only keeps the record out of that category's ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitRecord {
    pub created_at: Option<String>,
    pub station_id: Option<EntityId>,
    pub place_id: Option<EntityId>,
}

impl VisitRecord {
    pub fn new(
        created_at: impl Into<String>,
        station_id: impl Into<EntityId>,
        place_id: impl Into<EntityId>,
    ) -> Self {
        Self {
            created_at: Some(created_at.into()),
            station_id: Some(station_id.into()),
            place_id: Some(place_id.into()),
        }
    }
}

/// The three datasets a dashboard load hands to the aggregator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub stations: Vec<Station>,
    pub places: Vec<Place>,
    pub visits: Vec<VisitRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"[1, "1", "X99"]"#).unwrap();

        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2].as_str(), "X99");
    }

    #[test]
    fn test_entity_id_from_json() {
        use serde_json::json;

        assert_eq!(EntityId::from_json(&json!(7)), Some(EntityId::from(7)));
        assert_eq!(EntityId::from_json(&json!(" X99 ")), Some(EntityId::from("X99")));
        assert_eq!(EntityId::from_json(&json!({"id": 3, "Station_Name": "A"})), Some(EntityId::from(3)));
        assert_eq!(EntityId::from_json(&json!("")), None);
        assert_eq!(EntityId::from_json(&json!(null)), None);
        assert_eq!(EntityId::from_json(&json!([1])), None);
    }

    #[test]
    fn test_entity_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&EntityId::from(42)).unwrap();
        assert_eq!(json, r#""42""#);
    }
}
