//! Record types for the five snapshot collections
//!
//! Field names follow the snapshot files on disk (`_id`, `createdAt`, ...).
//! Reference fields deserialize from their short snapshot names (`parents`,
//! `trigger`, ...) and serialize under their `...Ids` names, so a serialized
//! record already carries the raw ids the query layer exposes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// One of the five record collections.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Node,
    Trigger,
    Action,
    Response,
    ResourceTemplate,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 5] = [
        CollectionKind::Node,
        CollectionKind::Trigger,
        CollectionKind::Action,
        CollectionKind::Response,
        CollectionKind::ResourceTemplate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Node => "node",
            CollectionKind::Trigger => "trigger",
            CollectionKind::Action => "action",
            CollectionKind::Response => "response",
            CollectionKind::ResourceTemplate => "resourceTemplate",
        }
    }

    /// Snapshot file holding this collection.
    pub fn file_name(&self) -> &'static str {
        match self {
            CollectionKind::Node => "node.json",
            CollectionKind::Trigger => "trigger.json",
            CollectionKind::Action => "action.json",
            CollectionKind::Response => "response.json",
            CollectionKind::ResourceTemplate => "resourceTemplate.json",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(CollectionKind::Node),
            "trigger" => Ok(CollectionKind::Trigger),
            "action" => Ok(CollectionKind::Action),
            "response" => Ok(CollectionKind::Response),
            "resourceTemplate" | "resource_template" => Ok(CollectionKind::ResourceTemplate),
            _ => Err(format!("Unknown collection: {}", s)),
        }
    }
}

/// Which identifier of the target record a reference is matched against.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum MatchField {
    Id,
    CompositeId,
}

/// A tagged pointer into a collection.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Reference {
    pub kind: CollectionKind,
    pub matched_by: MatchField,
    pub id: String,
}

impl Reference {
    pub fn by_id(kind: CollectionKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            matched_by: MatchField::Id,
            id: id.into(),
        }
    }

    pub fn by_composite_id(kind: CollectionKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            matched_by: MatchField::CompositeId,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.matched_by {
            MatchField::Id => write!(f, "{}:{}", self.kind, self.id),
            MatchField::CompositeId => write!(f, "{}:~{}", self.kind, self.id),
        }
    }
}

/// Common surface of every snapshot record.
pub trait Record: Serialize {
    const KIND: CollectionKind;

    fn id(&self) -> &str;

    fn composite_id(&self) -> Option<&str> {
        None
    }
}

/// Snapshot lists may be `null` or missing; both mean "no ids".
fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Composite ids of parent nodes.
    #[serde(default, alias = "parents", deserialize_with = "nullable_list")]
    pub parent_ids: Vec<String>,
    #[serde(default, alias = "trigger")]
    pub trigger_id: Option<String>,
    #[serde(default, alias = "responses", deserialize_with = "nullable_list")]
    pub response_ids: Vec<String>,
    #[serde(default, alias = "actions", deserialize_with = "nullable_list")]
    pub action_ids: Vec<String>,
    #[serde(default, alias = "postActions", deserialize_with = "nullable_list")]
    pub post_action_ids: Vec<String>,
    #[serde(default)]
    pub priority: Option<f64>,
    #[serde(default, rename = "root", alias = "isRoot")]
    pub is_root: Option<bool>,
    #[serde(default, rename = "global", alias = "isGlobal")]
    pub is_global: Option<bool>,
    #[serde(default)]
    pub colour: Option<String>,
    #[serde(default)]
    pub composite_id: Option<String>,
}

impl Record for NodeRecord {
    const KIND: CollectionKind = CollectionKind::Node;

    fn id(&self) -> &str {
        &self.id
    }

    fn composite_id(&self) -> Option<&str> {
        self.composite_id.as_deref()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub function_string: Option<String>,
    #[serde(default)]
    pub resource_template_id: Option<String>,
}

impl Record for TriggerRecord {
    const KIND: CollectionKind = CollectionKind::Trigger;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub function_string: Option<String>,
    #[serde(default)]
    pub resource_template_id: Option<String>,
}

impl Record for ActionRecord {
    const KIND: CollectionKind = CollectionKind::Action;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub platforms: Vec<ResponsePlatform>,
}

impl Record for ResponseRecord {
    const KIND: CollectionKind = CollectionKind::Response;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Response variants for one integration platform.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePlatform {
    #[serde(default)]
    pub integration_id: Option<String>,
    #[serde(default)]
    pub build: Option<i64>,
    #[serde(default)]
    pub locale_groups: Vec<ResponseLocaleGroup>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseLocaleGroup {
    #[serde(default)]
    pub locale_group_id: Option<String>,
    #[serde(default)]
    pub variations: Vec<ResponseVariation>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseVariation {
    pub name: String,
    /// Opaque payload, passed through untouched.
    #[serde(default)]
    pub responses: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplateRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Validation schema, passed through untouched.
    #[serde(default)]
    pub schema: Value,
    #[serde(default)]
    pub integration_id: Option<String>,
    #[serde(default)]
    pub function_string: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl Record for ResourceTemplateRecord {
    const KIND: CollectionKind = CollectionKind::ResourceTemplate;

    fn id(&self) -> &str {
        &self.id
    }
}
