//! Outbound chat delivery
//!
//! Delivery is best-effort: a sender never reports failure to the caller and
//! never blocks the countdown on I/O.

use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::gateway::protocol::encode_send_message;

/// Sink for chat text produced by the countdown
pub trait ChatSender: Send + Sync {
    fn send_chat(&self, channel_id: &str, text: &str);
}

/// Posts `send_message` gateway commands to an HTTP webhook
///
/// Messages are queued to a single delivery task and posted one at a time,
/// so the webhook receives them in the order they were sent.
pub struct WebhookChatSender {
    identifier: String,
    sender: mpsc::UnboundedSender<Outbound>,
}

struct Outbound {
    channel_id: String,
    frame: Value,
}

impl WebhookChatSender {
    /// Create the sender and spawn its delivery task. Must be called from
    /// within a Tokio runtime.
    pub fn new(url: String, identifier: String) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::spawn(Self::deliver(reqwest::Client::new(), url, receiver));

        Self { identifier, sender }
    }

    async fn deliver(
        client: reqwest::Client,
        url: String,
        mut receiver: mpsc::UnboundedReceiver<Outbound>,
    ) {
        while let Some(Outbound { channel_id, frame }) = receiver.recv().await {
            match client
                .post(&url)
                .json(&frame)
                .send()
                .await
                .and_then(|r| r.error_for_status())
            {
                Ok(_) => debug!("Chat delivered to {}", channel_id),
                Err(e) => warn!("Failed to send chat to {}: {}", channel_id, e),
            }
        }
        debug!("Chat delivery task stopped");
    }
}

impl ChatSender for WebhookChatSender {
    fn send_chat(&self, channel_id: &str, text: &str) {
        let outbound = Outbound {
            channel_id: channel_id.to_string(),
            frame: encode_send_message(&self.identifier, channel_id, text),
        };

        if self.sender.send(outbound).is_err() {
            warn!("Chat delivery task is gone; dropping message for {}", channel_id);
        }
    }
}

/// Writes outbound chat to the log only
#[derive(Debug, Default)]
pub struct LogChatSender;

impl ChatSender for LogChatSender {
    fn send_chat(&self, channel_id: &str, text: &str) {
        info!("[chat -> {}] {}", channel_id, text);
    }
}

/// Records outbound chat in memory
#[derive(Debug, Default)]
pub struct MemoryChatSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemoryChatSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(channel_id, text)` pairs sent so far
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Text of all messages sent so far, ignoring channels
    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }
}

impl ChatSender for MemoryChatSender {
    fn send_chat(&self, channel_id: &str, text: &str) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel_id.to_string(), text.to_string()));
    }
}
