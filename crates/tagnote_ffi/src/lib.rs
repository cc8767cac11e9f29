//! Flutter bridge surface for TagNote core.

pub mod api;
