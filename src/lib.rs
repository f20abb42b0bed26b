//! Chat Countdown - A chat-driven countdown timer
//!
//! Moderators drive a single shared countdown with `#countdown` chat
//! commands, tips extend it while it runs, and every change is broadcast to
//! overlay subscribers.

pub mod api;
pub mod config;
pub mod countdown;
pub mod gateway;
pub mod overlay;
pub mod parsing;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use countdown::CountdownEngine;
pub use overlay::OverlayPublisher;
pub use state::{AppState, CountdownSnapshot};
pub use utils::signals::shutdown_signal;
