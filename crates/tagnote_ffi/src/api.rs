//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the notes session (list, tags, save, delete, select) to Dart via FRB.
//! - Keep error semantics simple: string envelopes, no panics.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One session per process; `notes_open` replaces it.
//! - Functions called before `notes_open` lazily open the environment config.

use log::{info, warn};
use std::sync::{Mutex, MutexGuard, OnceLock};
use tagnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DynSlotRepository, Note, NoteDraft, NoteId, NotesSession, StorageBackend, StoreConfig,
    SystemClock, TagFilter,
};

type FfiSession = NotesSession<DynSlotRepository, SystemClock>;

static SESSION: OnceLock<Mutex<Option<FfiSession>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note row returned to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    /// Epoch milliseconds; `None` for legacy rows without a timestamp.
    pub updated_at: Option<i64>,
}

impl From<&Note> for NoteItem {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title.clone(),
            body: note.body.clone(),
            tags: note.tags.clone(),
            updated_at: note.updated_at,
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the action changed the collection.
    pub ok: bool,
    /// Affected note, when there is one.
    pub note: Option<NoteItem>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            note,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

/// Opens (or reopens) the notes session.
///
/// Input semantics:
/// - `backend`: `memory|file|sqlite`.
/// - `data_path`: slot directory for `file`, database path for `sqlite`;
///   ignored for `memory`.
///
/// Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open(backend: String, data_path: String) -> String {
    let config = match config_for(&backend, &data_path) {
        Ok(config) => config,
        Err(err) => return err,
    };
    match open_session(&config) {
        Ok(session) => {
            let mut guard = lock_session();
            *guard = Some(session);
            String::new()
        }
        Err(err) => err,
    }
}

/// Lists notes for the given tag label (`"All"` disables filtering) and
/// search term, most recently updated first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(tag: String, search: String) -> Vec<NoteItem> {
    with_session(|session| {
        let filter = TagFilter::from_label(&tag);
        // Re-listing under the same tag must not drop the selection.
        if session.tag_filter() != &filter {
            session.set_tag_filter(filter);
        }
        session.set_search(search);
        session
            .visible_notes()
            .into_iter()
            .map(NoteItem::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Returns `"All"` followed by every tag in use.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_tags() -> Vec<String> {
    with_session(|session| session.tags()).unwrap_or_else(|_| vec!["All".to_string()])
}

/// Saves an editor submit: creates when `id` is `None`, updates otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_save(
    id: Option<String>,
    title: String,
    body: String,
    tags: Vec<String>,
) -> NoteActionResponse {
    let mut draft = NoteDraft::new(title, body, Vec::new());
    for tag in &tags {
        draft.add_tag(tag);
    }
    let draft = draft.clamped();
    if !draft.is_submittable() {
        return NoteActionResponse::failure("Title or body is required.");
    }

    let editing = id.map(NoteId::from);
    let result = with_session(|session| session.save(draft, editing.as_ref()));
    match result {
        Ok(Some(note)) => {
            let message = if editing.is_some() {
                "Note updated."
            } else {
                "Note created."
            };
            NoteActionResponse::success(message, Some(NoteItem::from(&note)))
        }
        Ok(None) => NoteActionResponse::failure("Note not found."),
        Err(err) => NoteActionResponse::failure(format!("notes_save failed: {err}")),
    }
}

/// Deletes a note; deleting an unknown id reports `ok=false` without error.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(id: String) -> NoteActionResponse {
    match with_session(|session| session.delete(&NoteId::from(id))) {
        Ok(true) => NoteActionResponse::success("Note deleted.", None),
        Ok(false) => NoteActionResponse::failure("Note not found."),
        Err(err) => NoteActionResponse::failure(format!("notes_delete failed: {err}")),
    }
}

/// Selects a note, or clears the selection when `id` is `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_select(id: Option<String>) {
    let _ = with_session(|session| match id {
        Some(id) => session.select(NoteId::from(id)),
        None => session.clear_selection(),
    });
}

/// Returns the selected note, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_selected() -> Option<NoteItem> {
    with_session(|session| session.selected_note().map(NoteItem::from))
        .ok()
        .flatten()
}

/// Suggests up to three known tags for the editor's tag input.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_tag_suggestions(draft_tags: Vec<String>, input: String) -> Vec<String> {
    let draft = NoteDraft::new("", "", draft_tags);
    with_session(|session| session.tag_suggestions(&draft, &input)).unwrap_or_default()
}

fn config_for(backend: &str, data_path: &str) -> Result<StoreConfig, String> {
    let data_path = data_path.trim();
    let backend = match backend.trim().to_ascii_lowercase().as_str() {
        "memory" => StorageBackend::Memory,
        "file" if !data_path.is_empty() => StorageBackend::File {
            dir: data_path.into(),
        },
        "sqlite" if !data_path.is_empty() => StorageBackend::Sqlite {
            path: data_path.into(),
        },
        "file" | "sqlite" => return Err(format!("backend `{backend}` requires data_path")),
        other => return Err(format!("unsupported backend `{other}`")),
    };
    Ok(StoreConfig {
        backend,
        ..StoreConfig::memory()
    })
}

fn open_session(config: &StoreConfig) -> Result<FfiSession, String> {
    let store = config
        .open_store()
        .map_err(|err| format!("notes_open failed: {err}"))?;
    info!(
        "event=ffi_session_open module=ffi status=ok backend={} notes={}",
        config.backend.name(),
        store.len()
    );
    Ok(NotesSession::new(store))
}

fn lock_session() -> MutexGuard<'static, Option<FfiSession>> {
    let mutex = SESSION.get_or_init(|| Mutex::new(None));
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_session<T>(f: impl FnOnce(&mut FfiSession) -> T) -> Result<T, String> {
    let mut guard = lock_session();
    if guard.is_none() {
        let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
        warn!(
            "event=ffi_session_open module=ffi status=implicit backend={}",
            config.backend.name()
        );
        *guard = Some(open_session(&config)?);
    }
    match guard.as_mut() {
        Some(session) => Ok(f(session)),
        None => Err("notes session unavailable".to_string()),
    }
}
