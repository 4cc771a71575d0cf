//! Persistence adapters.
//!
//! Stats are persisted through the [`KeyValueStore`] contract: opaque string
//! values under string keys. [`Database`] backs it with SQLite on disk,
//! [`MemoryStore`] keeps everything in process.

mod config;
pub mod database;
mod memory;

pub use config::{Config, NotificationsConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Get/set-by-key persistence contract.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` when absent.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

/// Returns `~/.config/microfit[-dev]/` based on MICROFIT_ENV.
///
/// Set MICROFIT_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MICROFIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("microfit-dev")
    } else {
        base_dir.join("microfit")
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
