//! TOML-backed [`KeyValueStore`].

use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use echorya_core::error::Result;
use echorya_core::state::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// On-disk layout of `state.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Flat string table persisted to a single TOML file.
pub struct TomlKeyValueStore {
    file: AtomicTomlFile<StateFile>,
}

impl TomlKeyValueStore {
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }
}

#[async_trait]
impl KeyValueStore for TomlKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self.file.load()?.unwrap_or_default();
        Ok(state.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.file
            .update(StateFile::default(), |state| {
                state.values.insert(key.to_string(), value);
            })
            .map_err(Into::into)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.file.load()?.is_none() {
            return Ok(());
        }
        self.file
            .update(StateFile::default(), |state| {
                state.values.remove(key);
            })
            .map_err(Into::into)
    }
}
