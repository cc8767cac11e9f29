//! Note domain model.
//!
//! # Responsibility
//! - Define the note record, its identifier and the editing draft.
//! - Own the JSON codec for the persisted note collection.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is permanent; there are no tombstones.

pub mod collection;
pub mod note;
