//! Client for the PT Sandbox file-scanning API: upload files, create scan
//! tasks, poll their status and fetch reports.

mod client;
pub mod config;
mod errors;
pub mod tls;
pub mod types;
pub use self::client::Client;
pub use self::config::ClientConfig;
pub use self::errors::{ApiError, ApiErrorKind, Error};
