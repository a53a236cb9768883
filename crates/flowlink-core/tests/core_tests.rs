//! Tests for flowlink-core: record types, config, protocol envelopes, errors

use flowlink_core::*;
use serde_json::json;
use std::collections::HashMap;

// ===========================================================================
// CollectionKind
// ===========================================================================

#[test]
fn collection_kind_display_and_parse() {
    for kind in CollectionKind::ALL {
        let parsed: CollectionKind = kind.to_string().parse().unwrap();
        assert_eq!(parsed, kind);
    }
    assert!("widget".parse::<CollectionKind>().is_err());
}

#[test]
fn collection_kind_file_names() {
    assert_eq!(CollectionKind::Node.file_name(), "node.json");
    assert_eq!(
        CollectionKind::ResourceTemplate.file_name(),
        "resourceTemplate.json"
    );
}

// ===========================================================================
// Records
// ===========================================================================

#[test]
fn node_reads_snapshot_field_names() {
    let node: NodeRecord = serde_json::from_value(json!({
        "_id": "n1",
        "createdAt": 1700000000000i64,
        "name": "greeting",
        "parents": ["c0"],
        "trigger": "t1",
        "responses": ["r1"],
        "actions": ["a1", "a9"],
        "postActions": ["a2"],
        "root": true,
        "compositeId": "c1",
        "priority": 0.5
    }))
    .unwrap();
    assert_eq!(node.id, "n1");
    assert_eq!(node.parent_ids, vec!["c0"]);
    assert_eq!(node.trigger_id.as_deref(), Some("t1"));
    assert_eq!(node.action_ids, vec!["a1", "a9"]);
    assert_eq!(node.post_action_ids, vec!["a2"]);
    assert_eq!(node.is_root, Some(true));
    assert_eq!(node.is_global, None);
    assert_eq!(node.composite_id(), Some("c1"));
}

#[test]
fn node_accepts_output_field_names_as_aliases() {
    let node: NodeRecord = serde_json::from_value(json!({
        "_id": "n1",
        "createdAt": 1,
        "name": "x",
        "parentIds": ["c0"],
        "triggerId": "t1",
        "isGlobal": true
    }))
    .unwrap();
    assert_eq!(node.parent_ids, vec!["c0"]);
    assert_eq!(node.trigger_id.as_deref(), Some("t1"));
    assert_eq!(node.is_global, Some(true));
}

#[test]
fn node_null_lists_are_empty() {
    let node: NodeRecord = serde_json::from_value(json!({
        "_id": "n1",
        "createdAt": 1,
        "name": "x",
        "parents": null,
        "actions": null
    }))
    .unwrap();
    assert!(node.parent_ids.is_empty());
    assert!(node.action_ids.is_empty());
    assert!(node.response_ids.is_empty());
}

#[test]
fn node_serializes_raw_ids_under_ids_fields() {
    let node: NodeRecord = serde_json::from_value(json!({
        "_id": "n1", "createdAt": 1, "name": "x", "actions": ["a1"]
    }))
    .unwrap();
    let value = serde_json::to_value(&node).unwrap();
    assert_eq!(value["actionIds"], json!(["a1"]));
    assert_eq!(value["parentIds"], json!([]));
    assert_eq!(value["triggerId"], json!(null));
    assert_eq!(value["root"], json!(null));
    assert!(value.get("actions").is_none());
}

#[test]
fn node_requires_id_and_name() {
    let missing_name = serde_json::from_value::<NodeRecord>(json!({"_id": "n1", "createdAt": 1}));
    assert!(missing_name.is_err());
    let missing_id = serde_json::from_value::<NodeRecord>(json!({"name": "x", "createdAt": 1}));
    assert!(missing_id.is_err());
}

#[test]
fn response_platforms_nest_variants() {
    let response: ResponseRecord = serde_json::from_value(json!({
        "_id": "r1",
        "createdAt": 1,
        "name": "welcome",
        "platforms": [{
            "integrationId": "web",
            "build": 3,
            "localeGroups": [{
                "localeGroupId": "en",
                "variations": [{ "name": "short", "responses": [{"text": "hi"}] }]
            }]
        }]
    }))
    .unwrap();
    let variation = &response.platforms[0].locale_groups[0].variations[0];
    assert_eq!(variation.name, "short");
    assert_eq!(variation.responses, json!([{"text": "hi"}]));
    assert_eq!(response.platforms[0].build, Some(3));
}

#[test]
fn resource_template_passes_schema_through() {
    let template: ResourceTemplateRecord = serde_json::from_value(json!({
        "_id": "rt1",
        "createdAt": 1,
        "name": "webhook",
        "schema": {"type": "object", "required": ["url"]},
        "key": "webhook"
    }))
    .unwrap();
    assert_eq!(template.schema["required"], json!(["url"]));
    assert_eq!(template.key.as_deref(), Some("webhook"));
}

// ===========================================================================
// Reference schema
// ===========================================================================

#[test]
fn ref_field_tags_ids_with_target_and_match_field() {
    let parents = reference_field(CollectionKind::Node, "parents").unwrap();
    let reference = parents.reference("c1");
    assert_eq!(reference, Reference::by_composite_id(CollectionKind::Node, "c1"));

    let trigger = reference_field(CollectionKind::Node, "trigger").unwrap();
    assert_eq!(
        trigger.reference("t1"),
        Reference::by_id(CollectionKind::Trigger, "t1")
    );
}

#[test]
fn post_actions_are_declared_on_nodes() {
    let field = reference_field(CollectionKind::Node, "postActions").unwrap();
    assert_eq!(field.ids_field, "postActionIds");
    assert_eq!(field.target, CollectionKind::Action);
}

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn config_defaults() {
    let config = FlowlinkConfig::default();
    assert_eq!(config.gateway.port, 3000);
    assert_eq!(config.gateway.bind, BindMode::Lan);
    assert_eq!(config.auth.mode, AuthMode::Token);
    assert_eq!(config.auth.username, "alice");
    assert_eq!(config.auth.password, "admin");
    assert_eq!(config.auth.secret, "redit");
    assert_eq!(config.auth.token_ttl_secs, 3600);
}

#[test]
fn config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = FlowlinkConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.gateway.port, 3000);
}

#[test]
fn config_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flowlink.toml");
    std::fs::write(&path, "[gateway]\nport = 4100\n\n[auth]\nusername = \"bob\"\n").unwrap();
    let config = FlowlinkConfig::load(&path).unwrap();
    assert_eq!(config.gateway.port, 4100);
    assert_eq!(config.auth.username, "bob");
    assert_eq!(config.auth.password, "admin");
}

#[test]
fn config_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flowlink.toml");
    std::fs::write(&path, "[gateway\nport = ").unwrap();
    let err = FlowlinkConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
}

#[test]
fn config_toml_roundtrip() {
    let mut config = FlowlinkConfig::default();
    config.auth.mode = AuthMode::None;
    let back: FlowlinkConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
    assert_eq!(back.auth.mode, AuthMode::None);
}

#[test]
fn default_config_renders_every_section() {
    let rendered = FlowlinkConfig::default().to_toml().unwrap();
    for section in ["[gateway]", "[auth]", "[data]"] {
        assert!(rendered.contains(section), "missing {section}");
    }
    assert!(rendered.contains("port = 3000"));
    let back: FlowlinkConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(back.data.dir, std::path::PathBuf::from("info_doc"));
}

#[test]
fn config_vars_override() {
    let vars: HashMap<&str, &str> = [
        ("PORT", "8080"),
        ("JWT_SECRET", "s3cret"),
        ("USER_NAME", "carol"),
        ("PASSWORD", "hunter2"),
        ("FLOWLINK_DATA_DIR", "/srv/data"),
    ]
    .into_iter()
    .collect();
    let mut config = FlowlinkConfig::default();
    config
        .apply_vars(|k| vars.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.auth.secret, "s3cret");
    assert_eq!(config.auth.username, "carol");
    assert_eq!(config.auth.password, "hunter2");
    assert_eq!(config.data.dir, std::path::PathBuf::from("/srv/data"));
}

#[test]
fn config_bad_port_var_is_an_error() {
    let mut config = FlowlinkConfig::default();
    let result = config.apply_vars(|k| (k == "PORT").then(|| "eighty".to_string()));
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn bind_mode_parse() {
    assert_eq!("localhost".parse::<BindMode>().unwrap(), BindMode::Loopback);
    assert_eq!("lan".parse::<BindMode>().unwrap(), BindMode::Lan);
    assert!("moon".parse::<BindMode>().is_err());
    assert_eq!(BindMode::Loopback.to_addr(), "127.0.0.1");
}

// ===========================================================================
// Protocol
// ===========================================================================

#[test]
fn graph_response_ok_omits_errors() {
    let resp = GraphResponse::ok("node", json!({"_id": "n1"}));
    let value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["data"]["node"]["_id"], "n1");
    assert!(value.get("errors").is_none());
}

#[test]
fn graph_response_err_has_null_data() {
    let resp = GraphResponse::err("Unauthorized");
    let value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["data"], json!(null));
    assert_eq!(value["errors"][0]["message"], "Unauthorized");
}

#[test]
fn query_request_fields_are_optional() {
    let req: QueryRequest = serde_json::from_value(json!({})).unwrap();
    assert!(req.node_id.is_none());
    assert!(req.select.is_none());
    let req: QueryRequest =
        serde_json::from_value(json!({"nodeId": "n1", "select": "trigger"})).unwrap();
    assert_eq!(req.node_id.as_deref(), Some("n1"));
    assert_eq!(req.select, Some(json!("trigger")));
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_messages() {
    assert_eq!(Error::Unauthorized.to_string(), "Unauthorized");
    assert_eq!(Error::InvalidCredentials.to_string(), "Invalid credentials");
    assert_eq!(
        Error::snapshot_error("node.json", "missing").to_string(),
        "snapshot error: node.json - missing"
    );
}

#[test]
fn error_client_classification() {
    assert!(Error::Unauthorized.is_client_error());
    assert!(Error::invalid_shape("x").is_client_error());
    assert!(Error::InvalidRequest("bad body".into()).is_client_error());
    assert!(!Error::TokenError("bad key".into()).is_client_error());
    assert!(!Error::snapshot_error("node.json", "missing").is_client_error());
}
