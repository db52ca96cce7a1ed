//! Integration tests for serializer configuration.
//!
//! These tests verify that configuration loaded from TOML drives the
//! serializer the same way configuration built in code does.

use esdsl::dsl::{ErrorCode, FilterOnlyPolicy, StaticTransport};
use esdsl::prelude::*;
use serde_json::json;

/// Test that an empty document yields the defaults
#[test]
fn test_config_empty() {
    let config = DslConfig::from_toml_str("").expect("Failed to parse config");
    assert_eq!(config, DslConfig::default());
    assert_eq!(config.filter_only, FilterOnlyPolicy::Drop);
}

/// Test full configuration with all options
#[test]
fn test_config_full() {
    let config_str = r#"
        [serializer]
        filter_only = "reject"
        pretty = true
    "#;

    let config = DslConfig::from_toml_str(config_str).expect("Failed to parse config");
    assert_eq!(config.filter_only, FilterOnlyPolicy::Reject);
    assert!(config.pretty);
}

/// Test that unrelated tables are ignored
#[test]
fn test_config_other_tables_ignored() {
    let config_str = r#"
        [cluster]
        url = "http://localhost:9200"

        [serializer]
        pretty = true
    "#;

    let config = DslConfig::from_toml_str(config_str).expect("Failed to parse config");
    assert_eq!(config.filter_only, FilterOnlyPolicy::Drop);
    assert!(config.pretty);
}

/// Test that an invalid policy is a configuration error
#[test]
fn test_config_invalid_policy() {
    let err = DslConfig::from_toml_str("[serializer]\nfilter_only = \"ignore\"").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}

/// Test that the config serializes back to the same table
#[test]
fn test_config_toml_round_trip() {
    let config = DslConfig::builder()
        .filter_only(FilterOnlyPolicy::Reject)
        .build();
    let text = toml::to_string(&config).expect("Failed to write config");
    assert!(text.contains("filter_only = \"reject\""));

    let parsed: DslConfig = toml::from_str(&text).expect("Failed to parse config");
    assert_eq!(parsed, config);
}

/// Test that loaded configuration is applied to serialization
#[test]
fn test_loaded_config_drives_serializer() {
    let config = DslConfig::from_toml_str("[serializer]\nfilter_only = \"reject\"").unwrap();
    let q = query().filter(filter().exists("a"));

    assert_eq!(q.to_json_string().unwrap(), "{}");
    assert!(q.to_json_string_with(&config).is_err());
}

/// Test that a transport serializes with its own configuration
#[tokio::test]
async fn test_transport_uses_loaded_config() {
    let config = DslConfig::from_toml_str("[serializer]\npretty = true").unwrap();
    let transport = StaticTransport::new(json!({"hits": {"hits": []}})).with_config(config);

    let response = SearchRequest::new()
        .query(query().all())
        .execute(&transport, "events")
        .await
        .unwrap();

    assert_eq!(response["hits"]["hits"], json!([]));
    let requests = transport.requests().unwrap();
    assert_eq!(requests[0].1, json!({"query": {"match_all": {}}}));
}
