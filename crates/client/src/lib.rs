//! Backend access for the participant map: configuration, the HTTP client and
//! the load/refresh lifecycle that feeds a [`store::MapStore`].

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod loader;

pub use api::*;
pub use config::*;
pub use error::*;
pub use http::*;
pub use loader::*;
