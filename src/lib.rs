pub mod cli;
pub mod config;
pub mod errors;
mod http_client;
pub mod incidents;
pub mod logging;
pub mod pagination;
pub mod recent_incidents;
pub mod service_provider;
pub mod timestamp;

pub use http_client::build_http_client;
