//! Flowlink Gateway - access gate, token issuance, and the HTTP query surface

pub mod auth;
pub mod query;
pub mod server;

pub use auth::{check, Identity, ResolvedAuth};
pub use query::QueryService;
pub use server::{router, start_gateway, GatewayState};
