//! [`ItemsApi`](crate::services::items_api::ItemsApi) implementations.

pub mod directus;
pub mod local;
