//! Reference schema — which fields of a record point into which collection
//!
//! Every reference the resolver follows is declared here, together with the
//! identifier it is matched against. Call sites never infer either.

use crate::types::{CollectionKind, MatchField, Reference};

/// How many ids a reference field holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A declared reference field on one collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefField {
    pub owner: CollectionKind,
    /// Output field carrying the resolved record(s).
    pub name: &'static str,
    /// Output field carrying the raw id(s).
    pub ids_field: &'static str,
    pub target: CollectionKind,
    pub matched_by: MatchField,
    pub cardinality: Cardinality,
}

impl RefField {
    const fn new(
        owner: CollectionKind,
        name: &'static str,
        ids_field: &'static str,
        target: CollectionKind,
        matched_by: MatchField,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            owner,
            name,
            ids_field,
            target,
            matched_by,
            cardinality,
        }
    }

    /// Tag a raw id held by this field.
    pub fn reference(&self, id: impl Into<String>) -> Reference {
        match self.matched_by {
            MatchField::Id => Reference::by_id(self.target, id),
            MatchField::CompositeId => Reference::by_composite_id(self.target, id),
        }
    }
}

use CollectionKind::{Action, Node, ResourceTemplate, Response, Trigger};

pub const REFERENCE_FIELDS: &[RefField] = &[
    RefField::new(Node, "parents", "parentIds", Node, MatchField::CompositeId, Cardinality::Many),
    RefField::new(Node, "trigger", "triggerId", Trigger, MatchField::Id, Cardinality::One),
    RefField::new(Node, "responses", "responseIds", Response, MatchField::Id, Cardinality::Many),
    RefField::new(Node, "actions", "actionIds", Action, MatchField::Id, Cardinality::Many),
    RefField::new(Node, "postActions", "postActionIds", Action, MatchField::Id, Cardinality::Many),
    RefField::new(
        Trigger,
        "resourceTemplate",
        "resourceTemplateId",
        ResourceTemplate,
        MatchField::Id,
        Cardinality::One,
    ),
    RefField::new(
        Action,
        "resourceTemplate",
        "resourceTemplateId",
        ResourceTemplate,
        MatchField::Id,
        Cardinality::One,
    ),
];

/// Reference fields declared on `kind`, in declaration order.
pub fn reference_fields(kind: CollectionKind) -> impl Iterator<Item = &'static RefField> {
    REFERENCE_FIELDS.iter().filter(move |f| f.owner == kind)
}

pub fn reference_field(kind: CollectionKind, name: &str) -> Option<&'static RefField> {
    reference_fields(kind).find(|f| f.name == name)
}

/// Fields always resolved when a record of `kind` is reached through a reference.
pub fn default_selection(kind: CollectionKind) -> &'static [&'static str] {
    match kind {
        Trigger | Action => &["resourceTemplate"],
        Node | Response | ResourceTemplate => &[],
    }
}
