//! Overlay broadcast module
//!
//! Fans countdown snapshots out to display subscribers such as the SSE stream.

pub mod publisher;

pub use publisher::{OverlayPublisher, Subscription};
