//! Key-value storage port.
//!
//! The cart and session token live in a small string key-value store, the
//! same shape as browser `localStorage`. Everything above this module talks to
//! [`KeyValueStore`] only, so it can be exercised without a real backend.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - process-local map, used by tests and embedders
//! - [`FileStore`] - one file per key in a directory, used by the CLI

mod file;
mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters the store cannot represent.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A previous writer panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String key-value storage.
///
/// `set` replaces the whole value in one step: a concurrent `get` sees either
/// the old value or the new one, never a mix.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Check that a key is non-empty and made of `[A-Za-z0-9_-]` only.
///
/// File-backed stores use the key as a file name, so path separators and
/// dots are rejected everywhere for consistent behaviour.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
