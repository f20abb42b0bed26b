//! External service integration module
//!
//! This module contains the outbound chat senders used by the countdown.

pub mod chat;

// Re-export main types
pub use chat::{ChatSender, LogChatSender, MemoryChatSender, WebhookChatSender};
