//! Root query — gate first, then resolve the requested node

use crate::auth::{self, Identity};
use flowlink_core::{CollectionKind, QueryRequest, Result};
use flowlink_graph::{LookupIndex, Resolver, Shape};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Executes root `node` queries against a shared, immutable index.
#[derive(Clone)]
pub struct QueryService {
    index: Arc<LookupIndex>,
}

impl QueryService {
    pub fn new(index: Arc<LookupIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &LookupIndex {
        &self.index
    }

    /// Fetch a node by id. `Ok(None)` means not found (or no id given).
    ///
    /// The access gate runs before the selection is parsed or anything is looked up.
    pub fn node(&self, identity: Option<&Identity>, request: &QueryRequest) -> Result<Option<Value>> {
        let identity = auth::check(identity)?;
        let shape = match &request.select {
            Some(select) => Shape::from_json(select)?,
            None => Shape::full(CollectionKind::Node),
        };
        let Some(node_id) = request.node_id.as_deref() else {
            return Ok(None);
        };

        let fields: Vec<&str> = shape.names().collect();
        debug!(user = %identity.username, node_id, ?fields, "resolving node");
        let resolved = Resolver::new(&self.index).resolve(CollectionKind::Node, node_id, &shape);
        if resolved.is_none() {
            debug!(node_id, "node not found");
        }
        Ok(resolved)
    }
}
