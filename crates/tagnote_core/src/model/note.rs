//! Note domain model and editing draft.
//!
//! # Responsibility
//! - Define the canonical note record persisted in the notes slot.
//! - Define the draft shape collected by the editing surface.
//! - Own tag normalization shared by the draft and the store.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `tags` never contains blank or duplicate entries once normalized.
//! - Length caps apply to drafts only; the store accepts what it is given.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum title length accepted by the editing surface, in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum body length accepted by the editing surface, in characters.
pub const BODY_MAX_CHARS: usize = 4096;
/// Maximum tag length accepted by the editing surface, in characters.
pub const TAG_MAX_CHARS: usize = 16;

/// Opaque note identifier.
///
/// Freshly created notes get a UUID v4 string, but any string loaded from
/// storage is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Persisted note record.
///
/// Field names follow the stored JSON layout (`updatedAt` in camelCase).
/// Missing `title`/`body`/`tags` decode as empty; a missing `updatedAt` stays
/// `None` and sorts as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unix epoch milliseconds of the last create/update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Note {
    /// Sort key used by derived views; absent timestamps count as zero.
    pub fn sort_timestamp(&self) -> i64 {
        self.updated_at.unwrap_or(0)
    }

    /// Returns whether this note carries `tag` (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }

    /// Title shown in list rows.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "<Untitled>"
        } else {
            self.title.as_str()
        }
    }
}

/// In-progress field values for a note being created or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tags,
        }
    }

    /// Seeds an edit draft from an existing note.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            body: note.body.clone(),
            tags: note.tags.clone(),
        }
    }

    /// A draft can be saved once title or body carries any text.
    pub fn is_submittable(&self) -> bool {
        !self.title.is_empty() || !self.body.is_empty()
    }

    /// Adds one tag from raw input.
    ///
    /// Input is trimmed and capped to [`TAG_MAX_CHARS`]. Returns `false` for
    /// blank input or a tag already present on the draft.
    pub fn add_tag(&mut self, input: &str) -> bool {
        let Some(tag) = normalize_tag(input) else {
            return false;
        };
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Removes `tag` if present.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|value| value != tag);
    }

    /// Returns a copy with title and body truncated to the editor caps.
    pub fn clamped(&self) -> Self {
        Self {
            title: truncate_chars(&self.title, TITLE_MAX_CHARS),
            body: truncate_chars(&self.body, BODY_MAX_CHARS),
            tags: self.tags.clone(),
        }
    }
}

/// Normalizes one tag value: trimmed, capped, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(truncate_chars(trimmed, TAG_MAX_CHARS))
    }
}

/// Drops blank tags and duplicates, keeping first occurrences in order.
///
/// Unlike [`normalize_tag`] this does not trim or cap: stored tags are kept
/// verbatim apart from removing entries that break the per-note invariant.
pub fn dedupe_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter(|tag| !tag.trim().is_empty())
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
