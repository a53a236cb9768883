//! Flowlink Core - Record types, reference schema, config, and error handling

pub mod config;
pub mod error;
pub mod protocol;
pub mod schema;
pub mod types;

pub use config::*;
pub use error::{Error, Result};
pub use protocol::*;
pub use schema::*;
pub use types::*;
