//! User record storage.
//!
//! The `UserStore` trait is the only way the account flows touch persisted
//! identities. It offers exactly two operations: an atomic insert that refuses
//! duplicates, and a point lookup by username.
//!
//! # Backends
//!
//! - `MemoryUserStore`: process-local map, used by tests and `AUTHD_STORAGE=memory`
//! - `FileUserStore`: append-only, checksummed log replayed into memory on open,
//!   owned by one process at a time through an exclusive file lock
//!
//! # Invariants
//!
//! - At most one record exists per username. Backends enforce this inside a
//!   single critical section; callers never check-then-insert.
//! - Records are never updated or removed.

mod file;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use file::FileUserStore;
pub use memory::MemoryUserStore;

/// A registered identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Unique identity key.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Output of a `CredentialHasher`. Never the plaintext.
    pub password_hash: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Result of `UserStore::insert_if_absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was stored.
    Created,
    /// A record with the same username already exists; nothing was written.
    Conflict,
}

/// Errors from a storage backend. All of them are server faults.
#[derive(Debug)]
pub enum StoreError {
    /// A lock guarding the store was poisoned by a panicking writer.
    LockPoisoned,
    /// I/O error.
    Io(std::io::Error),
    /// Another store already owns the log at `path`.
    Locked { path: std::path::PathBuf },
    /// Persisted data failed validation.
    Corrupt {
        /// 1-based line number in the log.
        line: usize,
        /// Description of what is invalid.
        reason: String,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockPoisoned => write!(f, "store lock poisoned"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Locked { path } => {
                write!(f, "user log {} is locked by another process", path.display())
            }
            Self::Corrupt { line, reason } => {
                write!(f, "corrupt user log at line {line}: {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::LockPoisoned | Self::Locked { .. } | Self::Corrupt { .. } => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Durable collection of user records keyed by unique username.
///
/// Implementations are shared between concurrent requests behind an `Arc`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Store `record` unless its username is taken.
    ///
    /// Must be atomic: among concurrent calls with the same username exactly
    /// one observes `Created`.
    async fn insert_if_absent(&self, record: UserRecord) -> Result<InsertOutcome, StoreError>;

    /// Look up a record by username. Absence is `Ok(None)`.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
}
