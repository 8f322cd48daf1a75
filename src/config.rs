//! TOML configuration.
//!
//! Every table is optional; a missing file section takes its default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfqConfig {
    #[serde(default)]
    pub http: HttpConfig,
    /// Extra SPARQL prefixes injected into queries and bound on graph results.
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    /// Extra prefixes bound on every graph before serialization.
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
    /// Rules applied in order by `Converter::convert`.
    #[serde(default)]
    pub transformations: Vec<TransformRule>,
}

/// Remote fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Headers sent on every request, on top of the negotiation headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            headers: BTreeMap::new(),
        }
    }
}

/// A graph transformation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformRule {
    /// Bind `prefix` to `uri` on the graph.
    AddNamespace { prefix: String, uri: String },
    /// Rewrite every triple using `old_predicate` to use `new_predicate`.
    ReplacePredicate {
        old_predicate: String,
        new_predicate: String,
    },
    /// Any other rule kind. Loaded, then ignored.
    #[serde(other)]
    Unknown,
}

impl RdfqConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse from TOML text.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = RdfqConfig::from_toml("").unwrap();
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.prefixes.is_empty());
        assert!(config.transformations.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let config = RdfqConfig::from_toml(
            r#"
            [http]
            timeout_secs = 5
            headers = { Authorization = "Bearer x" }

            [prefixes]
            schema = "http://schema.org/"

            [namespaces]
            ex = "http://example.org/"

            [[transformations]]
            type = "replace_predicate"
            old_predicate = "http://example.org/old"
            new_predicate = "http://example.org/new"

            [[transformations]]
            type = "add_namespace"
            prefix = "foaf"
            uri = "http://xmlns.com/foaf/0.1/"
            "#,
        )
        .unwrap();
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.headers["Authorization"], "Bearer x");
        assert_eq!(config.prefixes["schema"], "http://schema.org/");
        assert_eq!(config.namespaces["ex"], "http://example.org/");
        assert_eq!(config.transformations.len(), 2);
        assert!(matches!(
            config.transformations[0],
            TransformRule::ReplacePredicate { .. }
        ));
    }

    #[test]
    fn unknown_rule_kinds_load() {
        let config = RdfqConfig::from_toml(
            r#"
            [[transformations]]
            type = "reify_everything"
            "#,
        )
        .unwrap();
        assert_eq!(config.transformations, vec![TransformRule::Unknown]);
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rdfq.toml");
        std::fs::write(&path, "[http]\ntimeout_secs = \"soon\"\n").unwrap();
        let err = RdfqConfig::load(&path).unwrap_err();
        assert!(matches!(&err, ConfigError::Parse { path: p, .. } if p.ends_with("rdfq.toml")));

        let missing = RdfqConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
