// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data-source record model.
//!
//! A [`DataSource`] carries its kind-specific settings as a [`SourceConfig`]
//! tagged union, so a record can never hold a static payload and a remote
//! endpoint at the same time. On the wire the record keeps the flat
//! `{kind, config}` shape that clients and stored rows use; conversion goes
//! through [`SourceConfig::from_parts`], which is also where create and update
//! input is validated.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::RegistryError;

/// Default refresh interval advertised to polling clients, in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

/// Kind of a data source.
///
/// `database` and `stream` are reserved: they can be stored but have no fetch
/// behavior. `api` and `websocket` are accepted as legacy spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Static,
    #[serde(alias = "api")]
    RemoteApi,
    Database,
    #[serde(alias = "websocket")]
    Stream,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Static => "static",
            SourceKind::RemoteApi => "remoteApi",
            SourceKind::Database => "database",
            SourceKind::Stream => "stream",
        }
    }

    /// Parse the canonical or legacy name of a kind.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "static" => Some(SourceKind::Static),
            "remoteApi" | "api" => Some(SourceKind::RemoteApi),
            "database" => Some(SourceKind::Database),
            "stream" | "websocket" => Some(SourceKind::Stream),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method used for a remote API source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Settings for a `static` source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticConfig {
    #[serde(alias = "staticData")]
    pub inline_payload: Value,
}

/// Settings for a `remoteApi` source.
///
/// # Example
/// ```json
/// {
///   "url": "https://api.example.com/metrics",
///   "method": "GET",
///   "headers": { "Accept": "application/json" },
///   "queryParams": { "range": "7d" },
///   "transform": "data => data.items.map(item => item.value)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteApiConfig {
    #[serde(alias = "endpoint")]
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query_params: BTreeMap<String, String>,
    /// JavaScript function (or function body) applied to the upstream body.
    #[serde(
        default,
        alias = "transformFunction",
        skip_serializing_if = "Option::is_none"
    )]
    pub transform: Option<String>,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

/// Kind-specific configuration of a data source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Static(StaticConfig),
    RemoteApi(RemoteApiConfig),
    /// Reserved; stored verbatim.
    Database(Map<String, Value>),
    /// Reserved; stored verbatim.
    Stream(Map<String, Value>),
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Static(_) => SourceKind::Static,
            SourceConfig::RemoteApi(_) => SourceKind::RemoteApi,
            SourceConfig::Database(_) => SourceKind::Database,
            SourceConfig::Stream(_) => SourceKind::Stream,
        }
    }

    /// Build a typed config from a kind and its untyped `config` object.
    ///
    /// A missing (`null`) config is treated as an empty object, which is only
    /// valid for the reserved kinds.
    pub fn from_parts(kind: SourceKind, config: Value) -> Result<Self, RegistryError> {
        let config = match config {
            Value::Null => Value::Object(Map::new()),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(RegistryError::Validation(format!(
                    "config must be an object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let invalid = |e: serde_json::Error| {
            RegistryError::Validation(format!("invalid {} config: {}", kind, e))
        };

        match kind {
            SourceKind::Static => serde_json::from_value(config)
                .map(SourceConfig::Static)
                .map_err(invalid),
            SourceKind::RemoteApi => {
                let api: RemoteApiConfig = serde_json::from_value(config).map_err(invalid)?;
                if api.url.trim().is_empty() {
                    return Err(RegistryError::Validation(
                        "remoteApi config requires a url".to_string(),
                    ));
                }
                if matches!(&api.transform, Some(expr) if expr.trim().is_empty()) {
                    return Err(RegistryError::Validation(
                        "transform must not be empty when present".to_string(),
                    ));
                }
                Ok(SourceConfig::RemoteApi(api))
            }
            SourceKind::Database => Ok(SourceConfig::Database(into_map(config))),
            SourceKind::Stream => Ok(SourceConfig::Stream(into_map(config))),
        }
    }

    /// Untyped `config` object as stored and sent over the wire.
    pub fn to_value(&self) -> Value {
        let encoded = match self {
            SourceConfig::Static(config) => serde_json::to_value(config),
            SourceConfig::RemoteApi(config) => serde_json::to_value(config),
            SourceConfig::Database(map) | SourceConfig::Stream(map) => {
                return Value::Object(map.clone())
            }
        };
        // Both structs only hold strings, maps and JSON values.
        encoded.unwrap_or(Value::Null)
    }

    /// Merge `patch` key-by-key into this config and re-validate it against
    /// the same kind. The kind itself never changes.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, RegistryError> {
        let mut current = into_map(self.to_value());
        for (key, value) in patch {
            current.insert(key.clone(), value.clone());
        }
        SourceConfig::from_parts(self.kind(), Value::Object(current))
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A stored data-source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "DataSourceRecord", try_from = "DataSourceRecord")]
pub struct DataSource {
    pub id: String,
    pub name: String,
    pub description: String,
    pub config: SourceConfig,
    /// Id of the owning user. Never changes after creation.
    pub owner: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataSource {
    pub fn kind(&self) -> SourceKind {
        self.config.kind()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner == user_id
    }

    /// Owners can read their records; everyone can read public ones.
    pub fn is_readable_by(&self, user_id: &str) -> bool {
        self.is_public || self.is_owned_by(user_id)
    }
}

/// Flat wire/storage shape of a [`DataSource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceRecord {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: Value,
    pub owner: String,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DataSource> for DataSourceRecord {
    fn from(source: DataSource) -> Self {
        DataSourceRecord {
            kind: source.kind(),
            config: source.config.to_value(),
            id: source.id,
            name: source.name,
            description: source.description,
            owner: source.owner,
            is_public: source.is_public,
            created_at: source.created_at,
            updated_at: source.updated_at,
        }
    }
}

impl TryFrom<DataSourceRecord> for DataSource {
    type Error = RegistryError;

    fn try_from(record: DataSourceRecord) -> Result<Self, Self::Error> {
        Ok(DataSource {
            config: SourceConfig::from_parts(record.kind, record.config)?,
            id: record.id,
            name: record.name,
            description: record.description,
            owner: record.owner,
            is_public: record.is_public,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Body of a create call. The owner is never part of it; the registry takes
/// the owner from the authenticated caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataSource {
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<SourceKind>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub is_public: bool,
}

/// Body of an update call. Only fields that are present are replaced.
///
/// `config` is merged key-by-key into the existing config. Kind and owner
/// cannot be patched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourcePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub config: Option<Map<String, Value>>,
    pub is_public: Option<bool>,
}

/// Trim and check a record name.
pub fn normalize_name(name: &str) -> Result<String, RegistryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::Validation("name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record(kind: &str, config: Value) -> Value {
        json!({
            "id": "ds1",
            "name": "Metrics",
            "kind": kind,
            "config": config,
            "owner": "alice",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_kind_parse_accepts_legacy_names() {
        let cases = vec![
            ("static", Some(SourceKind::Static)),
            ("remoteApi", Some(SourceKind::RemoteApi)),
            ("api", Some(SourceKind::RemoteApi)),
            ("database", Some(SourceKind::Database)),
            ("websocket", Some(SourceKind::Stream)),
            ("graphql", None),
        ];
        for (name, expected) in cases {
            assert_eq!(SourceKind::parse(name), expected, "kind name: {}", name);
        }
    }

    #[test]
    fn test_static_record_decodes_to_tagged_config() {
        let source: DataSource =
            serde_json::from_value(sample_record("static", json!({"inlinePayload": [1, 2, 3]})))
                .unwrap();

        assert_eq!(source.kind(), SourceKind::Static);
        assert!(!source.is_public);
        assert_eq!(
            source.config,
            SourceConfig::Static(StaticConfig {
                inline_payload: json!([1, 2, 3])
            })
        );
    }

    #[test]
    fn test_legacy_api_record_decodes_with_aliases() {
        let source: DataSource = serde_json::from_value(sample_record(
            "api",
            json!({
                "url": "https://example.com/data",
                "transformFunction": "return data.map(function (x) { return x.value; });"
            }),
        ))
        .unwrap();

        let SourceConfig::RemoteApi(api) = &source.config else {
            panic!("Expected remoteApi config");
        };
        assert_eq!(api.method, HttpMethod::Get);
        assert_eq!(api.transform.as_deref(), Some("return data.map(function (x) { return x.value; });"));
        assert_eq!(api.refresh_interval, DEFAULT_REFRESH_INTERVAL_SECS);
    }

    #[test]
    fn test_record_encodes_canonical_names() {
        let source: DataSource = serde_json::from_value(sample_record(
            "api",
            json!({"endpoint": "https://example.com", "method": "post"}),
        ))
        .unwrap();

        let encoded = serde_json::to_value(&source).unwrap();
        assert_eq!(encoded["kind"], "remoteApi");
        assert_eq!(encoded["isPublic"], false);
        assert_eq!(encoded["config"]["url"], "https://example.com");
        assert_eq!(encoded["config"]["method"], "POST");
        assert!(encoded["config"].get("transform").is_none());
    }

    #[test]
    fn test_from_parts_rejects_invalid_configs() {
        let cases = vec![
            ("static without payload", SourceKind::Static, json!({})),
            ("api without url", SourceKind::RemoteApi, json!({"method": "GET"})),
            ("api with blank url", SourceKind::RemoteApi, json!({"url": "  "})),
            (
                "api with blank transform",
                SourceKind::RemoteApi,
                json!({"url": "https://x", "transform": ""}),
            ),
            (
                "api with unknown method",
                SourceKind::RemoteApi,
                json!({"url": "https://x", "method": "PATCH"}),
            ),
            ("non-object config", SourceKind::Database, json!("dsn")),
        ];

        for (name, kind, config) in cases {
            let result = SourceConfig::from_parts(kind, config);
            assert!(
                matches!(result, Err(RegistryError::Validation(_))),
                "case '{}' should fail validation, got {:?}",
                name,
                result
            );
        }
    }

    #[test]
    fn test_reserved_kinds_accept_missing_config() {
        let config = SourceConfig::from_parts(SourceKind::Stream, Value::Null).unwrap();
        assert_eq!(config, SourceConfig::Stream(Map::new()));
    }

    #[test]
    fn test_merged_patches_only_given_keys() {
        let original = SourceConfig::from_parts(
            SourceKind::RemoteApi,
            json!({"url": "https://a", "headers": {"X-Key": "1"}}),
        )
        .unwrap();

        let mut patch = Map::new();
        patch.insert("transform".to_string(), json!("data => data.items"));

        let SourceConfig::RemoteApi(merged) = original.merged(&patch).unwrap() else {
            panic!("merge must keep the kind");
        };
        assert_eq!(merged.url, "https://a");
        assert_eq!(merged.headers.get("X-Key").map(String::as_str), Some("1"));
        assert_eq!(merged.transform.as_deref(), Some("data => data.items"));
    }

    #[test]
    fn test_merged_revalidates_result() {
        let original =
            SourceConfig::from_parts(SourceKind::Static, json!({"inlinePayload": 1})).unwrap();
        let mut patch = Map::new();
        patch.insert("inlinePayload".to_string(), Value::Null);

        // null is a valid JSON payload, so this is allowed
        assert!(original.merged(&patch).is_ok());

        let api = SourceConfig::from_parts(SourceKind::RemoteApi, json!({"url": "https://a"}))
            .unwrap();
        let mut bad = Map::new();
        bad.insert("url".to_string(), json!(""));
        assert!(matches!(api.merged(&bad), Err(RegistryError::Validation(_))));
    }

    #[test]
    fn test_readability() {
        let mut source: DataSource =
            serde_json::from_value(sample_record("static", json!({"inlinePayload": 1}))).unwrap();

        assert!(source.is_readable_by("alice"));
        assert!(!source.is_readable_by("bob"));

        source.is_public = true;
        assert!(source.is_readable_by("bob"));
        assert!(!source.is_owned_by("bob"));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Sales  ").unwrap(), "Sales");
        assert!(matches!(normalize_name("   "), Err(RegistryError::Validation(_))));
    }
}
