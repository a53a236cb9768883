//! HTTP protocol — GraphQL-style request and response envelopes
//!
//! Wire format:
//!
//! Client → Server (query):
//!   POST /query  { "nodeId": "n1", "select": "trigger { resourceTemplate } actions" }
//!   Authorization: Bearer <token>
//!
//! Client → Server (login):
//!   POST /login  { "username": "alice", "password": "admin" }
//!
//! Server → Client:
//!   { "data": { "node": { ... } } }
//!   { "data": null, "errors": [ { "message": "Unauthorized" } ] }

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root query: fetch a node by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub node_id: Option<String>,
    /// Selection string or selection object; absent means every reference field.
    #[serde(default)]
    pub select: Option<Value>,
}

/// Identity issuance.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphError>,
}

impl GraphResponse {
    /// Successful response carrying one named root field.
    pub fn ok(field: &str, value: Value) -> Self {
        let mut data = serde_json::Map::new();
        data.insert(field.to_string(), value);
        Self {
            data: Value::Object(data),
            errors: Vec::new(),
        }
    }

    /// Error response; no partial data.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: Value::Null,
            errors: vec![GraphError {
                message: message.into(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphError {
    pub message: String,
}
