//! Note use-case services.
//!
//! # Responsibility
//! - Orchestrate slot persistence into note store operations.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod note_store;
pub mod session;
