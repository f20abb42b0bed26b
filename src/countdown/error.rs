//! Countdown command errors
//!
//! The display text of every variant is the exact reply sent back to chat.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountdownError {
    #[error("Usage: #countdown start duration | per_token | message")]
    StartUsage,

    #[error("Usage: #countdown add duration")]
    AddUsage,

    #[error("Usage: #countdown set duration")]
    SetUsage,

    #[error("Usage: #countdown start|add|set|stop|status")]
    UnknownVerb(String),

    #[error("No active countdown to add time to. Start one with #countdown start duration | per_token | message.")]
    NothingToExtend,

    #[error("No active countdown to stop.")]
    NothingToStop,
}

impl CountdownError {
    /// Usage problems are rejected before the engine state is consulted.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::StartUsage | Self::AddUsage | Self::SetUsage | Self::UnknownVerb(_)
        )
    }
}
