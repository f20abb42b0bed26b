//! Countdown state structure and snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::parsing::format_duration;

/// Text sent to chat when a countdown ends without a custom message
pub const DEFAULT_FINISH_MESSAGE: &str = "Countdown finished";

/// Handle on the task currently ticking the countdown
#[derive(Debug)]
pub struct Ticker {
    pub generation: u64,
    pub handle: JoinHandle<()>,
}

/// The single countdown owned by the engine
#[derive(Debug)]
pub struct CountdownState {
    pub remaining_seconds: u64,
    pub channel_id: Option<String>,
    pub finish_message: String,
    pub per_token_increment_seconds: u64,
    pub last_update: DateTime<Utc>,
    /// Present exactly while the countdown is running
    pub ticker: Option<Ticker>,
    /// Bumped for every ticker spawned; a tick from an older generation is stale
    pub generation: u64,
}

impl CountdownState {
    /// Create an idle countdown
    pub fn new() -> Self {
        Self {
            remaining_seconds: 0,
            channel_id: None,
            finish_message: DEFAULT_FINISH_MESSAGE.to_string(),
            per_token_increment_seconds: 1,
            last_update: Utc::now(),
            ticker: None,
            generation: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Whether a tick issued for `generation` may still mutate this state
    pub fn is_current(&self, generation: u64) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|ticker| ticker.generation == generation)
    }

    /// Abort the live ticker, if any. Returns true when one was running.
    pub fn cancel_ticker(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                ticker.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn touch(&mut self) {
        self.last_update = Utc::now();
    }

    /// Immutable view for subscribers
    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            running: self.is_running(),
            remaining_seconds: self.remaining_seconds,
            formatted_remaining: format_duration(self.remaining_seconds),
            per_token_increment_seconds: self.per_token_increment_seconds,
            finish_message: self.finish_message.clone(),
            channel_id: self.channel_id.clone(),
            timestamp: self.last_update,
        }
    }
}

impl Default for CountdownState {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the countdown delivered to overlay subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSnapshot {
    pub running: bool,
    pub remaining_seconds: u64,
    pub formatted_remaining: String,
    pub per_token_increment_seconds: u64,
    pub finish_message: String,
    pub channel_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}
