//! Core domain logic for TagNote.
//! This crate is the single source of truth for note-collection invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, DynSlotRepository, StorageBackend, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::collection::{decode_collection, encode_collection};
pub use model::note::{Note, NoteDraft, NoteId, BODY_MAX_CHARS, TAG_MAX_CHARS, TITLE_MAX_CHARS};
pub use repo::file_slot_repo::FileSlotRepository;
pub use repo::slot_repo::{MemorySlotRepository, RepoError, RepoResult, SlotRepository};
pub use repo::sqlite_slot_repo::SqliteSlotRepository;
pub use search::view::{distinct_tags, filtered_view, tag_suggestions, TagFilter, ALL_TAGS_LABEL};
pub use service::note_store::{NoteStore, PersistError, UpdateOutcome, DEFAULT_NOTES_SLOT};
pub use service::session::NotesSession;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
