//! Record snapshot — the five collections, loaded once and never mutated

use flowlink_core::{
    ActionRecord, CollectionKind, Error, NodeRecord, ResourceTemplateRecord, ResponseRecord,
    Result, TriggerRecord,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub nodes: Vec<NodeRecord>,
    pub triggers: Vec<TriggerRecord>,
    pub actions: Vec<ActionRecord>,
    pub responses: Vec<ResponseRecord>,
    pub resource_templates: Vec<ResourceTemplateRecord>,
}

impl Snapshot {
    /// Load every collection file from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let snapshot = Self {
            nodes: read_collection(dir, CollectionKind::Node)?,
            triggers: read_collection(dir, CollectionKind::Trigger)?,
            actions: read_collection(dir, CollectionKind::Action)?,
            responses: read_collection(dir, CollectionKind::Response)?,
            resource_templates: read_collection(dir, CollectionKind::ResourceTemplate)?,
        };
        info!(
            "Loaded snapshot from {}: {} nodes, {} triggers, {} actions, {} responses, {} resource templates",
            dir.display(),
            snapshot.nodes.len(),
            snapshot.triggers.len(),
            snapshot.actions.len(),
            snapshot.responses.len(),
            snapshot.resource_templates.len(),
        );
        Ok(snapshot)
    }

    pub fn len(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Node => self.nodes.len(),
            CollectionKind::Trigger => self.triggers.len(),
            CollectionKind::Action => self.actions.len(),
            CollectionKind::Response => self.responses.len(),
            CollectionKind::ResourceTemplate => self.resource_templates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        CollectionKind::ALL.iter().all(|kind| self.len(*kind) == 0)
    }
}

fn read_collection<R: DeserializeOwned>(dir: &Path, kind: CollectionKind) -> Result<Vec<R>> {
    let path = dir.join(kind.file_name());
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::snapshot_error(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::snapshot_error(path.display().to_string(), e.to_string()))
}
