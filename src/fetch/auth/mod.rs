//! Request wrappers that attach the items-API token.

mod api_key;
mod url_param;

pub use api_key::ApiKey;
pub use url_param::UrlParam;
