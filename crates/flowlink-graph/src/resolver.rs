//! Reference resolver — turns an id plus a shape into an object graph
//!
//! For each record reached, the plain fields and raw ids are cloned from the
//! index row, then every reference field named in the shape is resolved and
//! written next to its raw ids. Missing targets become `null` (scalar) or are
//! dropped (list). A target already on the current resolution path is
//! treated as missing, which is what stops parent cycles.

use crate::index::{LookupIndex, Row};
use crate::shape::Shape;
use flowlink_core::{reference_fields, Cardinality, CollectionKind, RefField, Reference};
use serde_json::Value;
use std::collections::HashSet;
use tracing::trace;

/// The `(kind, _id)` pairs currently being resolved, root first.
#[derive(Clone, Debug, Default)]
pub struct ResolutionPath {
    visiting: HashSet<(CollectionKind, String)>,
}

impl ResolutionPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, kind: CollectionKind, id: &str) -> bool {
        self.visiting.contains(&(kind, id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.visiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visiting.is_empty()
    }

    fn enter(&mut self, kind: CollectionKind, id: &str) {
        self.visiting.insert((kind, id.to_string()));
    }

    fn leave(&mut self, kind: CollectionKind, id: &str) {
        self.visiting.remove(&(kind, id.to_string()));
    }
}

pub struct Resolver<'a> {
    index: &'a LookupIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a LookupIndex) -> Self {
        Self { index }
    }

    /// Resolve the record of `kind` whose `_id` is `id`; `None` if there is none.
    pub fn resolve(&self, kind: CollectionKind, id: &str, shape: &Shape) -> Option<Value> {
        let mut path = ResolutionPath::new();
        self.resolve_reference(&Reference::by_id(kind, id), shape, &mut path)
    }

    /// Resolve a tagged reference below an existing path.
    ///
    /// `path` is left as it was found when this returns.
    pub fn resolve_reference(
        &self,
        reference: &Reference,
        shape: &Shape,
        path: &mut ResolutionPath,
    ) -> Option<Value> {
        let Some(entry) = self.index.lookup(reference) else {
            trace!(%reference, "reference has no target");
            return None;
        };
        if path.contains(entry.kind, entry.id) {
            trace!(%reference, "reference cycles back onto the resolution path");
            return None;
        }

        path.enter(entry.kind, entry.id);
        let mut out = entry.row.clone();
        for field in reference_fields(entry.kind) {
            let Some(requested) = shape.get(field.name) else {
                continue;
            };
            let nested = requested.merge(&Shape::default_for(field.target));
            let ids = raw_ids(entry.row, field);
            let resolved = match field.cardinality {
                Cardinality::One => ids
                    .first()
                    .and_then(|id| self.resolve_reference(&field.reference(*id), &nested, path))
                    .unwrap_or(Value::Null),
                Cardinality::Many => Value::Array(
                    ids.iter()
                        .filter_map(|id| self.resolve_reference(&field.reference(*id), &nested, path))
                        .collect(),
                ),
            };
            out.insert(field.name.to_string(), resolved);
        }
        path.leave(entry.kind, entry.id);

        Some(Value::Object(out))
    }
}

/// Raw ids held by `field` on a row: a string, a list of strings, or nothing.
fn raw_ids<'r>(row: &'r Row, field: &RefField) -> Vec<&'r str> {
    match row.get(field.ids_field) {
        Some(Value::String(id)) => vec![id.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}
