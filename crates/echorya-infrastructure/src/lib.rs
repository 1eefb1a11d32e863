//! File-backed implementations of the Echorya core traits.

pub mod config_loader;
pub mod paths;
pub mod secret_service;
pub mod storage;
pub mod toml_state_repository;

pub use crate::paths::EchoryaPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::toml_state_repository::TomlKeyValueStore;
