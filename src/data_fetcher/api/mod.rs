pub mod http_client;
mod status_api;

pub use http_client::create_http_client;
pub use status_api::*;
