//! Slot storage contracts and backend implementations.
//!
//! # Responsibility
//! - Define the single-slot key/value contract the note store persists to.
//! - Isolate file and SQLite details from store orchestration.
//!
//! # Invariants
//! - A write replaces the whole slot value; there are no partial updates.
//! - Reading a slot that was never written returns `Ok(None)`.

pub mod file_slot_repo;
pub mod slot_repo;
pub mod sqlite_slot_repo;
