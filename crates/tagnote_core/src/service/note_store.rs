//! Canonical note collection with mirrored slot persistence.
//!
//! # Responsibility
//! - Own the in-memory note collection and apply create/update/delete.
//! - Write the full collection to the notes slot after every mutation.
//! - Expose derived views computed from the current snapshot.
//!
//! # Invariants
//! - Note ids are unique across the collection.
//! - `updated_at` strictly increases on every update of a note.
//! - Persistence is best effort: a failed write never fails the mutation.

use crate::clock::{Clock, SystemClock};
use crate::model::collection::{decode_collection, encode_collection};
use crate::model::note::{dedupe_tags, Note, NoteDraft, NoteId};
use crate::repo::slot_repo::{RepoError, SlotRepository};
use crate::search::view::{distinct_tags, filtered_view, TagFilter};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default slot key holding the serialized collection.
pub const DEFAULT_NOTES_SLOT: &str = "notes";

/// Result of [`NoteStore::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Note),
    NotFound,
}

impl UpdateOutcome {
    pub fn into_note(self) -> Option<Note> {
        match self {
            Self::Updated(note) => Some(note),
            Self::NotFound => None,
        }
    }
}

/// Why the last persistence attempt failed.
#[derive(Debug)]
pub enum PersistError {
    Encode(serde_json::Error),
    Repo(RepoError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::Repo(err) => write!(f, "failed to write notes slot: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

/// Note collection bound to one storage slot.
pub struct NoteStore<R: SlotRepository, C: Clock = SystemClock> {
    notes: Vec<Note>,
    repo: R,
    clock: C,
    slot_key: String,
    last_persist_error: Option<PersistError>,
}

impl<R: SlotRepository> NoteStore<R, SystemClock> {
    /// Loads the collection from the default `notes` slot.
    pub fn load(repo: R) -> Self {
        Self::load_with(repo, SystemClock, DEFAULT_NOTES_SLOT)
    }
}

impl<R: SlotRepository, C: Clock> NoteStore<R, C> {
    /// Loads the collection stored under `slot_key`.
    ///
    /// Absent, unreadable or unparseable slot values yield an empty
    /// collection; this never fails.
    pub fn load_with(repo: R, clock: C, slot_key: impl Into<String>) -> Self {
        let slot_key = slot_key.into();
        let notes = read_collection(&repo, &slot_key);
        info!(
            "event=store_load module=service status=ok backend={} slot={} notes={}",
            repo.backend_name(),
            slot_key,
            notes.len()
        );
        Self {
            notes,
            repo,
            clock,
            slot_key,
            last_persist_error: None,
        }
    }

    /// Creates a note from `draft` with a fresh id and the current timestamp.
    ///
    /// The caller owns the "title or body non-empty" precondition. Blank and
    /// duplicate tags are dropped.
    pub fn create(&mut self, draft: NoteDraft) -> Note {
        let note = Note {
            id: self.fresh_id(),
            title: draft.title,
            body: draft.body,
            tags: dedupe_tags(&draft.tags),
            updated_at: Some(self.clock.now_ms()),
        };
        self.notes.insert(0, note.clone());
        debug!("event=note_create module=service status=ok id={}", note.id);
        self.persist();
        note
    }

    /// Replaces title, body and tags of note `id` and refreshes its timestamp.
    pub fn update(&mut self, id: &NoteId, draft: NoteDraft) -> UpdateOutcome {
        let now = self.clock.now_ms();
        let Some(note) = self.notes.iter_mut().find(|note| &note.id == id) else {
            debug!("event=note_update module=service status=not_found id={id}");
            return UpdateOutcome::NotFound;
        };

        note.title = draft.title;
        note.body = draft.body;
        note.tags = dedupe_tags(&draft.tags);
        note.updated_at = Some(next_timestamp(note.updated_at, now));
        let updated = note.clone();

        debug!("event=note_update module=service status=ok id={id}");
        self.persist();
        UpdateOutcome::Updated(updated)
    }

    /// Removes note `id` permanently. Returns `false` when it did not exist.
    pub fn delete(&mut self, id: &NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| &note.id != id);
        if self.notes.len() == before {
            debug!("event=note_delete module=service status=not_found id={id}");
            return false;
        }

        debug!("event=note_delete module=service status=ok id={id}");
        self.persist();
        true
    }

    /// Writes the full collection to the slot.
    ///
    /// Failures are logged and kept in [`Self::last_persist_error`]; a later
    /// successful write clears them.
    pub fn persist(&mut self) {
        let outcome = encode_collection(&self.notes)
            .map_err(PersistError::Encode)
            .and_then(|payload| {
                self.repo
                    .write_slot(&self.slot_key, &payload)
                    .map_err(PersistError::Repo)
            });

        match outcome {
            Ok(()) => {
                debug!(
                    "event=store_persist module=service status=ok backend={} notes={}",
                    self.repo.backend_name(),
                    self.notes.len()
                );
                self.last_persist_error = None;
            }
            Err(err) => {
                error!(
                    "event=store_persist module=service status=error backend={} error={}",
                    self.repo.backend_name(),
                    err
                );
                self.last_persist_error = Some(err);
            }
        }
    }

    /// Filtered and recency-sorted snapshot.
    pub fn filtered_view(&self, tag_filter: &TagFilter, search_term: &str) -> Vec<&Note> {
        filtered_view(&self.notes, tag_filter, search_term)
    }

    /// `"All"` plus every referenced tag once.
    pub fn distinct_tags(&self) -> Vec<String> {
        distinct_tags(&self.notes)
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    /// Raw collection in storage order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    pub fn last_persist_error(&self) -> Option<&PersistError> {
        self.last_persist_error.as_ref()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn fresh_id(&self) -> NoteId {
        loop {
            let candidate = NoteId::generate();
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

fn read_collection<R: SlotRepository>(repo: &R, slot_key: &str) -> Vec<Note> {
    let raw = match repo.read_slot(slot_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(
                "event=store_load module=service status=fallback reason=read_failed slot={slot_key} error={err}"
            );
            return Vec::new();
        }
    };

    match decode_collection(&raw) {
        Ok(notes) => notes,
        Err(err) => {
            warn!(
                "event=store_load module=service status=fallback reason=parse_failed slot={slot_key} error={err}"
            );
            Vec::new()
        }
    }
}

/// Next `updated_at` for an edited note: the current time, bumped past the
/// previous stamp when the clock has not moved forward.
fn next_timestamp(previous: Option<i64>, now: i64) -> i64 {
    match previous {
        Some(previous) if now <= previous => previous.saturating_add(1),
        _ => now,
    }
}
