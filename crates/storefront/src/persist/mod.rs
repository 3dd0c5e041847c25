//! Synchronous key/value persistence.
//!
//! The storefront treats durable storage as a plain string-keyed store
//! with whole-value writes and no transactions - the same contract the
//! original browser storage offered. Two implementations are provided:
//! [`MemoryStore`] for tests and non-durable sessions, [`FileStore`] for a
//! JSON file on disk.
//!
//! Consumers never see a persistence error: [`Storage`] applies the
//! recovery policy (log a warning, degrade to in-memory-only operation for
//! the rest of the session) so the cart stays usable when the disk is not.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Storage keys used by the cart/session core.
pub mod keys {
    /// Versioned cart envelope (JSON).
    pub const CART: &str = "cart";

    /// Bearer token string; absent when logged out.
    pub const TOKEN: &str = "token";

    /// Cached identity JSON (`{"username": ...}`) for the persisted token.
    pub const USER: &str = "user";

    /// Cached role strings (JSON array) for the persisted token.
    pub const ROLES: &str = "roles";
}

/// Errors from a key/value store implementation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file held something that is not a JSON string map.
    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// A synchronous, string-keyed store with whole-value writes.
///
/// Implementations are durable across process restarts (or deliberately
/// not, for [`MemoryStore`]) and make no transactional guarantees.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Remove a key; removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Shared storage handle with the failure recovery policy applied.
///
/// The first failed write logs a warning and flips the session to
/// in-memory-only operation: later writes are skipped instead of retried,
/// and reads fall back to "absent". State already in memory stays usable,
/// it just stops being durable.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<dyn KeyValueStore>,
    degraded: Arc<AtomicBool>,
}

impl Storage {
    /// Wrap a store in the recovery policy.
    #[must_use]
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner,
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Read a value; errors are logged and read as "absent".
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match self.inner.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// Write a value; a failure degrades the session to in-memory-only.
    pub fn set(&self, key: &str, value: &str) {
        if self.degraded.load(Ordering::Relaxed) {
            return;
        }
        if let Err(e) = self.inner.set(key, value) {
            tracing::warn!(key, error = %e, "storage write failed; continuing in-memory only");
            self.degraded.store(true, Ordering::Relaxed);
        }
    }

    /// Remove a key; a failure degrades the session to in-memory-only.
    pub fn remove(&self, key: &str) {
        if self.degraded.load(Ordering::Relaxed) {
            return;
        }
        if let Err(e) = self.inner.remove(key) {
            tracing::warn!(key, error = %e, "storage remove failed; continuing in-memory only");
            self.degraded.store(true, Ordering::Relaxed);
        }
    }

    /// True once a write has failed and durability was given up.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A store whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::other("disk full")))
        }

        fn remove(&self, _key: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_failed_write_degrades_storage() {
        let storage = Storage::new(Arc::new(BrokenStore));
        assert!(!storage.is_degraded());
        storage.set(keys::CART, "[]");
        assert!(storage.is_degraded());
        // Subsequent writes are skipped, not retried.
        storage.set(keys::TOKEN, "t");
        assert!(storage.get(keys::TOKEN).is_none());
    }

    #[test]
    fn test_memory_store_roundtrip_through_storage() {
        let storage = Storage::new(Arc::new(MemoryStore::new()));
        storage.set(keys::TOKEN, "abc");
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some("abc"));
        storage.remove(keys::TOKEN);
        assert!(storage.get(keys::TOKEN).is_none());
        assert!(!storage.is_degraded());
    }
}
