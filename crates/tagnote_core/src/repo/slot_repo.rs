//! Slot repository contract, error type and in-memory backend.
//!
//! # Responsibility
//! - Provide the read/write contract over one named storage slot.
//! - Offer a shared in-memory backend for tests and ephemeral sessions.
//!
//! # Invariants
//! - `write_slot` replaces the previous value atomically from the caller's view.
//! - Backends never interpret slot contents.

use crate::db::DbError;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for slot reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Slot key cannot be mapped onto the backend (e.g. unsafe file name).
    InvalidKey(String),
    /// Backend cannot serve requests (poisoned lock, missing table).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "slot io failed at `{}`: {source}", path.display()),
            Self::InvalidKey(key) => write!(f, "invalid slot key `{key}`"),
            Self::Unavailable(message) => write!(f, "slot storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::InvalidKey(_) => None,
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for one-value-per-key local storage.
pub trait SlotRepository {
    /// Reads the raw slot value, `None` when the slot was never written.
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>>;
    /// Replaces the raw slot value.
    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()>;
    /// Short backend label used in log events.
    fn backend_name(&self) -> &'static str;
}

impl<R: SlotRepository + ?Sized> SlotRepository for Box<R> {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()> {
        (**self).write_slot(key, value)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

/// Process-local slot storage.
///
/// Clones share the same underlying map, so a test can hand one clone to a
/// store and inspect or reload from another.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotRepository {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates one slot, bypassing any store.
    pub fn with_slot(key: &str, value: impl Into<String>) -> Self {
        let repo = Self::new();
        if let Ok(mut slots) = repo.slots.lock() {
            slots.insert(key.to_string(), value.into());
        }
        repo
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| RepoError::Unavailable("memory slot lock poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| RepoError::Unavailable("memory slot lock poisoned".to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
