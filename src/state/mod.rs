//! State management module
//!
//! This module contains the countdown state, its snapshots and the shared
//! application state handed to HTTP handlers.

pub mod app_state;
pub mod countdown_state;

// Re-export main types
pub use app_state::AppState;
pub use countdown_state::{CountdownSnapshot, CountdownState};
