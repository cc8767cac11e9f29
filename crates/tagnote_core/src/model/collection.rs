//! JSON codec for the persisted note collection.
//!
//! # Responsibility
//! - Encode the full collection as one JSON array.
//! - Decode stored payloads and repair per-note invariants.
//!
//! # Invariants
//! - Decoded collections never contain two notes with the same id.
//! - Decoded notes never carry duplicate or blank tags.

use crate::model::note::{dedupe_tags, Note, NoteId};
use log::warn;
use serde_json::Value;
use std::collections::HashSet;

/// Serializes the collection to its stored JSON array form.
pub fn encode_collection(notes: &[Note]) -> serde_json::Result<String> {
    serde_json::to_string(notes)
}

/// Parses a stored JSON array into notes.
///
/// Only a payload that is not a JSON array is an error; callers decide whether
/// to fall back to an empty collection. Inside the array each note is read
/// field by field: entries without a string `id` are dropped, wrongly typed
/// `title`/`body`/`tags` become empty and an unusable `updatedAt` becomes
/// absent.
pub fn decode_collection(raw: &str) -> serde_json::Result<Vec<Note>> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;
    let decoded = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let note = note_from_value(entry);
            if note.is_none() {
                warn!(
                    "event=collection_decode module=model status=dropped reason=missing_id index={index}"
                );
            }
            note
        })
        .collect();
    Ok(repair_collection(decoded))
}

fn note_from_value(entry: &Value) -> Option<Note> {
    let object = entry.as_object()?;
    let id = object.get("id")?.as_str()?;
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let tags: Vec<String> = object
        .get("tags")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Note {
        id: NoteId::from(id),
        title: text("title"),
        body: text("body"),
        tags,
        updated_at: object.get("updatedAt").and_then(timestamp_from_value),
    })
}

/// Integer milliseconds as-is; finite floats are truncated.
fn timestamp_from_value(value: &Value) -> Option<i64> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    value
        .as_f64()
        .filter(|ms| ms.is_finite() && *ms >= i64::MIN as f64 && *ms <= i64::MAX as f64)
        .map(|ms| ms.trunc() as i64)
}

fn repair_collection(notes: Vec<Note>) -> Vec<Note> {
    let mut seen_ids = HashSet::new();
    let mut repaired = Vec::with_capacity(notes.len());
    for mut note in notes {
        if !seen_ids.insert(note.id.clone()) {
            warn!(
                "event=collection_decode module=model status=repaired reason=duplicate_id id={}",
                note.id
            );
            continue;
        }
        let tags = dedupe_tags(&note.tags);
        if tags.len() != note.tags.len() {
            warn!(
                "event=collection_decode module=model status=repaired reason=duplicate_tags id={}",
                note.id
            );
            note.tags = tags;
        }
        repaired.push(note);
    }
    repaired
}
