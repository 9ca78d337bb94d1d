//! Typed view over one source config, plus the raw-map → typed binding
//! (`ConfigBinding`) that applies defaults and rejects malformed input.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::error::{Error, Result};

fn default_key_sep() -> String {
    ".".to_string()
}

fn default_min_backlog() -> f64 {
    50.0
}

fn default_max_backlog() -> f64 {
    200.0
}

fn default_max_consumers() -> u32 {
    32
}

/// Shape of a raw config map as read from the config store, before
/// cross-field validation. Unknown keys (including the historical
/// `split_char` typo) are ignored by `serde`'s default behavior.
#[derive(Debug, Deserialize, Validate)]
struct RawSourceConfig {
    #[validate(length(min = 1))]
    name: String,
    source: String,
    #[validate(length(min = 1))]
    servers: Vec<String>,
    #[validate(length(min = 1))]
    topics: Vec<String>,
    #[serde(default)]
    key_aliases: BTreeMap<String, String>,
    #[serde(default = "default_key_sep")]
    key_sep: String,
    #[serde(default = "default_min_backlog")]
    min_backlog: f64,
    #[serde(default = "default_max_backlog")]
    max_backlog: f64,
    #[serde(default = "default_max_consumers")]
    max_consumers: u32,
}

/// Immutable, validated view over a single source config. Once built,
/// never mutated; shared across a `GroupSupervisor` and its workers behind
/// an `Arc`.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub name: String,
    pub source: String,
    pub servers: Vec<String>,
    pub topics: Vec<String>,
    pub key_aliases: BTreeMap<String, String>,
    pub key_sep: String,
    pub min_backlog: f64,
    pub max_backlog: f64,
    pub max_consumers: u32,
}

/// Validates a raw config map into a [`SourceConfig`], applying defaults.
pub struct ConfigBinding;

impl ConfigBinding {
    /// Binds and validates a single raw config value.
    ///
    /// Rejects (with `Error::Config`) a config whose `source` isn't
    /// `"kafka"`, whose `servers`/`topics` are empty, whose
    /// `min_backlog > max_backlog`, whose `max_consumers < 1`, or that
    /// contains duplicate aliases in `key_aliases`.
    pub fn bind(raw: Value) -> Result<SourceConfig> {
        let raw: RawSourceConfig = serde_json::from_value(raw)
            .map_err(|e| Error::Config(format!("malformed source config: {e}")))?;

        if raw.source != "kafka" {
            return Err(Error::Config(format!(
                "unsupported source type: {}",
                raw.source
            )));
        }

        raw.validate()
            .map_err(|e| Error::Config(format!("source config validation failed: {e}")))?;

        if raw.min_backlog > raw.max_backlog {
            return Err(Error::Config(format!(
                "min_backlog ({}) must not exceed max_backlog ({})",
                raw.min_backlog, raw.max_backlog
            )));
        }
        if raw.max_consumers < 1 {
            return Err(Error::Config(
                "max_consumers must be at least 1".to_string(),
            ));
        }

        let mut seen_aliases = std::collections::BTreeSet::new();
        for alias in raw.key_aliases.values() {
            if !seen_aliases.insert(alias) {
                return Err(Error::Config(format!("duplicate alias: {alias}")));
            }
        }

        Ok(SourceConfig {
            name: raw.name,
            source: raw.source,
            servers: raw.servers,
            topics: raw.topics,
            key_aliases: raw.key_aliases,
            key_sep: raw.key_sep,
            min_backlog: raw.min_backlog,
            max_backlog: raw.max_backlog,
            max_consumers: raw.max_consumers,
        })
    }
}
