// twibi-api: Async Rust client for the Intelbras Twibi `/goform` management API

pub mod command;
pub mod connection;
pub mod error;
pub mod models;
pub mod module;
pub mod transport;

pub use command::{SetCommand, password_digest, timestamp_ms};
pub use connection::Connection;
pub use error::{Error, ErrorKind};
pub use models::ModuleMap;
pub use module::{ModuleId, join_modules};
pub use transport::TransportConfig;
