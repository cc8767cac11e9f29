//! Storage configuration.
//!
//! # Responsibility
//! - Describe which slot backend to use and which slot holds the notes.
//! - Resolve configuration from JSON or environment variables.
//!
//! # Invariants
//! - Resolution never panics; invalid input surfaces as `ConfigError`.
//!
//! Environment variables:
//! - `TAGNOTE_STORAGE`: `memory|file|sqlite` (default `file`).
//! - `TAGNOTE_DATA_PATH`: slot directory (`file`) or database path (`sqlite`).
//! - `TAGNOTE_SLOT`: slot key (default `notes`).

use crate::clock::SystemClock;
use crate::db::open_db;
use crate::repo::file_slot_repo::FileSlotRepository;
use crate::repo::slot_repo::{MemorySlotRepository, RepoError, RepoResult, SlotRepository};
use crate::repo::sqlite_slot_repo::SqliteSlotRepository;
use crate::service::note_store::{NoteStore, DEFAULT_NOTES_SLOT};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const STORAGE_ENV: &str = "TAGNOTE_STORAGE";
pub const DATA_PATH_ENV: &str = "TAGNOTE_DATA_PATH";
pub const SLOT_ENV: &str = "TAGNOTE_SLOT";

const DEFAULT_DATA_DIR_NAME: &str = "tagnote";
const DEFAULT_DB_FILE_NAME: &str = "tagnote.sqlite3";

/// Slot repository handle usable from any thread.
pub type DynSlotRepository = Box<dyn SlotRepository + Send>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    /// Unknown `TAGNOTE_STORAGE` value.
    UnknownBackend(String),
    /// Slot key is empty after trimming.
    EmptySlotKey,
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unsupported storage backend `{value}`; expected memory|file|sqlite"
            ),
            Self::EmptySlotKey => write!(f, "slot key cannot be empty"),
            Self::Parse(err) => write!(f, "invalid storage configuration: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Where slots are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    File { dir: PathBuf },
    Sqlite { path: PathBuf },
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File { .. } => "file",
            Self::Sqlite { .. } => "sqlite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_slot_key")]
    pub slot_key: String,
    pub backend: StorageBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            slot_key: default_slot_key(),
            backend: StorageBackend::File {
                dir: default_data_dir(),
            },
        }
    }
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            slot_key: default_slot_key(),
            backend: StorageBackend::Memory,
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validated()
    }

    /// Resolves configuration from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let data_path = read(DATA_PATH_ENV).map(PathBuf::from);
        let backend_name = read(STORAGE_ENV).unwrap_or_else(|| "file".to_string());

        let backend = match backend_name.to_ascii_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "file" => StorageBackend::File {
                dir: data_path.unwrap_or_else(default_data_dir),
            },
            "sqlite" => StorageBackend::Sqlite {
                path: data_path
                    .unwrap_or_else(|| default_data_dir().join(DEFAULT_DB_FILE_NAME)),
            },
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Self {
            slot_key: read(SLOT_ENV).unwrap_or_else(default_slot_key),
            backend,
        }
        .validated()
    }

    /// Opens the configured slot repository.
    pub fn open_repository(&self) -> RepoResult<DynSlotRepository> {
        let repo: DynSlotRepository = match &self.backend {
            StorageBackend::Memory => Box::new(MemorySlotRepository::new()),
            StorageBackend::File { dir } => Box::new(FileSlotRepository::new(dir.clone())),
            StorageBackend::Sqlite { path } => {
                if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| RepoError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                Box::new(SqliteSlotRepository::try_new(open_db(path)?)?)
            }
        };
        Ok(repo)
    }

    /// Opens the repository and loads the note store from the configured slot.
    pub fn open_store(&self) -> RepoResult<NoteStore<DynSlotRepository>> {
        let repo = self.open_repository()?;
        Ok(NoteStore::load_with(repo, SystemClock, self.slot_key.clone()))
    }

    fn validated(self) -> ConfigResult<Self> {
        if self.slot_key.trim().is_empty() {
            return Err(ConfigError::EmptySlotKey);
        }
        Ok(self)
    }
}

fn default_slot_key() -> String {
    DEFAULT_NOTES_SLOT.to_string()
}

fn default_data_dir() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DATA_DIR_NAME)
}
