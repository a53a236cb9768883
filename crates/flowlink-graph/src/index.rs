//! Lookup index — point lookups by `_id` (and by `compositeId` for nodes)
//!
//! Each record is serialized once at build time into a [`Row`]; resolution
//! clones rows and never touches the typed snapshot again.

use crate::snapshot::Snapshot;
use flowlink_core::{CollectionKind, MatchField, Record, Reference, Result};
use serde_json::{Map, Value};
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// A record's plain fields plus its raw reference ids, as output.
pub type Row = Map<String, Value>;

/// A record found by the index.
#[derive(Clone, Copy, Debug)]
pub struct Entry<'a> {
    pub kind: CollectionKind,
    pub id: &'a str,
    pub row: &'a Row,
}

#[derive(Debug, Default)]
struct Collection {
    ids: Vec<String>,
    rows: Vec<Row>,
    by_id: HashMap<String, usize>,
    by_composite_id: HashMap<String, usize>,
}

impl Collection {
    fn build<R: Record>(records: &[R]) -> Result<Self> {
        let mut collection = Self::default();
        for (pos, record) in records.iter().enumerate() {
            let Value::Object(row) = serde_json::to_value(record)? else {
                continue;
            };
            collection.ids.push(record.id().to_string());
            collection.rows.push(row);
            let slot = collection.rows.len() - 1;

            match collection.by_id.entry(record.id().to_string()) {
                MapEntry::Vacant(e) => {
                    e.insert(slot);
                }
                MapEntry::Occupied(_) => {
                    warn!("Duplicate {} id {:?} at position {}; keeping the first", R::KIND, record.id(), pos);
                }
            }
            if let Some(composite_id) = record.composite_id() {
                match collection.by_composite_id.entry(composite_id.to_string()) {
                    MapEntry::Vacant(e) => {
                        e.insert(slot);
                    }
                    MapEntry::Occupied(_) => {
                        warn!("Duplicate {} compositeId {:?}; keeping the first", R::KIND, composite_id);
                    }
                }
            }
        }
        Ok(collection)
    }

    fn entry(&self, kind: CollectionKind, slot: usize) -> Entry<'_> {
        Entry {
            kind,
            id: &self.ids[slot],
            row: &self.rows[slot],
        }
    }
}

/// Immutable after build; safe to share across threads.
#[derive(Debug)]
pub struct LookupIndex {
    collections: HashMap<CollectionKind, Collection>,
    lookups: AtomicU64,
}

impl LookupIndex {
    pub fn build(snapshot: &Snapshot) -> Result<Self> {
        let mut collections = HashMap::new();
        collections.insert(CollectionKind::Node, Collection::build(&snapshot.nodes)?);
        collections.insert(CollectionKind::Trigger, Collection::build(&snapshot.triggers)?);
        collections.insert(CollectionKind::Action, Collection::build(&snapshot.actions)?);
        collections.insert(CollectionKind::Response, Collection::build(&snapshot.responses)?);
        collections.insert(
            CollectionKind::ResourceTemplate,
            Collection::build(&snapshot.resource_templates)?,
        );
        Ok(Self {
            collections,
            lookups: AtomicU64::new(0),
        })
    }

    /// Find the record in `kind` whose `matched_by` identifier equals `id`.
    pub fn get(&self, kind: CollectionKind, matched_by: MatchField, id: &str) -> Option<Entry<'_>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let collection = self.collections.get(&kind)?;
        let slot = match matched_by {
            MatchField::Id => collection.by_id.get(id),
            MatchField::CompositeId => collection.by_composite_id.get(id),
        }?;
        Some(collection.entry(kind, *slot))
    }

    pub fn lookup(&self, reference: &Reference) -> Option<Entry<'_>> {
        self.get(reference.kind, reference.matched_by, &reference.id)
    }

    /// Number of `get` calls served so far.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Records indexed for `kind`, duplicates included.
    pub fn len(&self, kind: CollectionKind) -> usize {
        self.collections.get(&kind).map_or(0, |c| c.rows.len())
    }

    pub fn is_empty(&self) -> bool {
        CollectionKind::ALL.iter().all(|kind| self.len(*kind) == 0)
    }
}
