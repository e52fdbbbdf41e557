//! Durable storage backends for the cart.
//!
//! Storage is a string key-value store in the shape of browser local storage:
//! the cart writes one serialized document under one key and reads it back on
//! startup. Backends never interpret the document.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - Process-local map; shared between clones
//! - [`FileStorage`] - One `<key>.json` file per key in a directory

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors that can occur when reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed (disk full, permissions, missing directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key can't be mapped onto the backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend is disabled or unusable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string key-value store that survives restarts of the cart.
pub trait CartStorage {
    /// Read the document stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend can't be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend can't be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

impl<T: CartStorage + ?Sized> CartStorage for Box<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}
