use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{RegistryConfig, StoreFormat};
use crate::error::RegistryError;
use crate::feed::FeedRecord;

use super::FeedStore;

/// Flat-file feed store.
///
/// The whole collection is encoded into one file. Writes land in a sibling
/// temp file first and are renamed over the target, so readers never see a
/// half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileFeedStore {
    path: PathBuf,
    format: StoreFormat,
}

impl FileFeedStore {
    pub fn new(path: impl Into<PathBuf>, format: StoreFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.store_path.clone(), config.store_format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn encode(&self, feeds: &[&FeedRecord]) -> Result<Vec<u8>, RegistryError> {
        match self.format {
            StoreFormat::Json => {
                serde_json::to_vec_pretty(&feeds).map_err(|e| RegistryError::Serde(e.to_string()))
            }
            StoreFormat::Bitcode => {
                bitcode::serialize(&feeds).map_err(|e| RegistryError::Serde(e.to_string()))
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<FeedRecord>, RegistryError> {
        match self.format {
            StoreFormat::Json => {
                serde_json::from_slice(bytes).map_err(|e| RegistryError::Serde(e.to_string()))
            }
            StoreFormat::Bitcode => {
                bitcode::deserialize(bytes).map_err(|e| RegistryError::Serde(e.to_string()))
            }
        }
    }
}

impl FeedStore for FileFeedStore {
    fn load_feeds(&self) -> Result<Vec<FeedRecord>, RegistryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RegistryError::Persistence(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let blank = match self.format {
            StoreFormat::Json => bytes.iter().all(u8::is_ascii_whitespace),
            StoreFormat::Bitcode => bytes.is_empty(),
        };
        if blank {
            return Ok(Vec::new());
        }
        let feeds = self.decode(&bytes)?;
        debug!(path = %self.path.display(), count = feeds.len(), "loaded feed snapshot");
        Ok(feeds)
    }

    fn save_feeds(&self, feeds: &[&FeedRecord]) -> Result<(), RegistryError> {
        let mut sorted = feeds.to_vec();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));
        let bytes = self.encode(&sorted)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                RegistryError::Persistence(format!("create {}: {}", parent.display(), e))
            })?;
        }

        let temp = self.temp_path();
        fs::write(&temp, &bytes)
            .map_err(|e| RegistryError::Persistence(format!("write {}: {}", temp.display(), e)))?;
        fs::rename(&temp, &self.path).map_err(|e| {
            RegistryError::Persistence(format!("replace {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), count = sorted.len(), "wrote feed snapshot");
        Ok(())
    }
}
