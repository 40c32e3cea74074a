//! Registry configuration.
//!
//! Defaults suit a single local service: a pretty-printed JSON snapshot at
//! `feeds.json`, with state toggles persisted like every other write.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

pub const ENV_STORE_PATH: &str = "FEED_REGISTRY_STORE_PATH";
pub const ENV_STORE_FORMAT: &str = "FEED_REGISTRY_STORE_FORMAT";
pub const ENV_PERSIST_STATE: &str = "FEED_REGISTRY_PERSIST_STATE";

/// Encoding of the feed snapshot file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Json,
    Bitcode,
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreFormat::Json => write!(f, "json"),
            StoreFormat::Bitcode => write!(f, "bitcode"),
        }
    }
}

impl FromStr for StoreFormat {
    type Err = RegistryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreFormat::Json),
            "bitcode" | "binary" => Ok(StoreFormat::Bitcode),
            other => Err(RegistryError::Config(format!(
                "unknown store format {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub store_path: PathBuf,
    pub store_format: StoreFormat,
    /// Write the snapshot after enable/disable, not only after saves.
    pub persist_state_changes: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("feeds.json"),
            store_format: StoreFormat::Json,
            persist_state_changes: true,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_store_format(mut self, format: StoreFormat) -> Self {
        self.store_format = format;
        self
    }

    pub fn with_persist_state_changes(mut self, persist: bool) -> Self {
        self.persist_state_changes = persist;
        self
    }

    /// Build from `FEED_REGISTRY_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, RegistryError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup over the defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RegistryError> {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_STORE_PATH) {
            config.store_path = PathBuf::from(path);
        }
        if let Some(format) = lookup(ENV_STORE_FORMAT) {
            config.store_format = format.parse()?;
        }
        if let Some(persist) = lookup(ENV_PERSIST_STATE) {
            config.persist_state_changes = parse_bool(ENV_PERSIST_STATE, &persist)?;
        }
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(json).map_err(|e| RegistryError::Config(e.to_string()))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, RegistryError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(RegistryError::Config(format!(
            "{} expects a boolean, got {:?}",
            key, other
        ))),
    }
}
