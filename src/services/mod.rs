pub mod items_api;
