//! Derived, read-only views over a note collection.
//!
//! # Responsibility
//! - Filter by tag and free text, then order by recency.
//! - Derive the tag list and editor tag suggestions.
//!
//! # Invariants
//! - Nothing here mutates or persists state.

pub mod view;
