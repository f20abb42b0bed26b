//! Gateway frame decoding and encoding
//!
//! Inbound frames follow the ActionCable shape used by the streaming
//! platform: control frames carry a top-level `type`, channel traffic
//! carries a `message` object.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Identifier the gateway subscription uses unless configured otherwise
pub const DEFAULT_GATEWAY_IDENTIFIER: &str = r#"{"channel":"GatewayChannel"}"#;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway frame is not a JSON object")]
    NotAnObject,
}

/// Events the countdown reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    ChatMessage {
        channel_id: String,
        text: String,
        author_is_moderator: bool,
        author_is_owner: bool,
    },
    Tip {
        channel_id: String,
        amount: f64,
    },
}

/// A decoded gateway frame
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayFrame {
    Ping,
    SubscriptionConfirmed,
    SubscriptionRejected,
    Event(InboundEvent),
    Ignored,
}

impl GatewayFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::SubscriptionConfirmed => "confirm_subscription",
            Self::SubscriptionRejected => "reject_subscription",
            Self::Event(InboundEvent::ChatMessage { .. }) => "chat_message",
            Self::Event(InboundEvent::Tip { .. }) => "tip",
            Self::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    event: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    channel_id: Option<String>,
    text: Option<String>,
    author: Option<RawAuthor>,
    metadata: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawAuthor {
    is_moderator: bool,
    is_streamer: bool,
}

/// Decode an already-parsed frame.
///
/// Frames that are well-formed JSON objects but carry nothing the countdown
/// cares about, or carry malformed payloads, decode to [`GatewayFrame::Ignored`].
pub fn decode_frame(value: &Value) -> Result<GatewayFrame, GatewayError> {
    let frame = value.as_object().ok_or(GatewayError::NotAnObject)?;

    match frame.get("type").and_then(Value::as_str) {
        Some("ping") => return Ok(GatewayFrame::Ping),
        Some("confirm_subscription") => return Ok(GatewayFrame::SubscriptionConfirmed),
        Some("reject_subscription") => return Ok(GatewayFrame::SubscriptionRejected),
        _ => {}
    }

    let Some(message) = frame.get("message").filter(|m| m.is_object()) else {
        return Ok(GatewayFrame::Ignored);
    };

    let message: RawMessage = match serde_json::from_value(message.clone()) {
        Ok(message) => message,
        Err(e) => {
            debug!("Ignoring gateway message with unexpected shape: {}", e);
            return Ok(GatewayFrame::Ignored);
        }
    };

    Ok(decode_message(message).map_or(GatewayFrame::Ignored, GatewayFrame::Event))
}

fn decode_message(message: RawMessage) -> Option<InboundEvent> {
    let channel_id = message.channel_id?;

    if message.event.as_deref() == Some("StreamEvent") && message.kind.as_deref() == Some("Tipped")
    {
        let amount = message.metadata.as_ref().and_then(tip_amount);
        if amount.is_none() {
            debug!("Ignoring tip with malformed metadata on channel {}", channel_id);
        }
        return amount.map(|amount| InboundEvent::Tip { channel_id, amount });
    }

    if message.kind.as_deref() == Some("new_message") {
        let author = message.author.unwrap_or_default();
        return Some(InboundEvent::ChatMessage {
            channel_id,
            text: message.text.unwrap_or_default(),
            author_is_moderator: author.is_moderator,
            author_is_owner: author.is_streamer,
        });
    }

    None
}

// `metadata` arrives either as an object or as a JSON-encoded string.
fn tip_amount(metadata: &Value) -> Option<f64> {
    let decoded;
    let metadata = match metadata {
        Value::String(raw) => {
            decoded = serde_json::from_str::<Value>(raw).ok()?;
            &decoded
        }
        other => other,
    };

    match metadata.get("how_much")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Encode an outbound chat line as a gateway `send_message` command.
pub fn encode_send_message(identifier: &str, channel_id: &str, text: &str) -> Value {
    let data = json!({
        "action": "send_message",
        "text": text,
        "channelId": channel_id,
    });

    json!({
        "command": "message",
        "identifier": identifier,
        "data": data.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_frames() {
        assert_eq!(
            decode_frame(&json!({"type": "ping", "message": 1700000000})).unwrap(),
            GatewayFrame::Ping
        );
        assert_eq!(
            decode_frame(&json!({"type": "confirm_subscription", "identifier": "x"})).unwrap(),
            GatewayFrame::SubscriptionConfirmed
        );
        assert_eq!(
            decode_frame(&json!({"type": "reject_subscription"})).unwrap(),
            GatewayFrame::SubscriptionRejected
        );
    }

    #[test]
    fn test_chat_message() {
        let frame = decode_frame(&json!({
            "identifier": DEFAULT_GATEWAY_IDENTIFIER,
            "message": {
                "type": "new_message",
                "channelId": "chan-1",
                "text": "#countdown status",
                "author": { "isModerator": true }
            }
        }))
        .unwrap();

        assert_eq!(
            frame,
            GatewayFrame::Event(InboundEvent::ChatMessage {
                channel_id: "chan-1".to_string(),
                text: "#countdown status".to_string(),
                author_is_moderator: true,
                author_is_owner: false,
            })
        );
        assert_eq!(frame.kind(), "chat_message");
    }

    #[test]
    fn test_tip_with_string_metadata() {
        let frame = decode_frame(&json!({
            "message": {
                "event": "StreamEvent",
                "type": "Tipped",
                "channelId": "chan-1",
                "metadata": "{\"who\":\"viewer\",\"how_much\":25}"
            }
        }))
        .unwrap();

        assert_eq!(
            frame,
            GatewayFrame::Event(InboundEvent::Tip {
                channel_id: "chan-1".to_string(),
                amount: 25.0,
            })
        );
    }

    #[test]
    fn test_tip_with_object_metadata_and_string_amount() {
        let frame = decode_frame(&json!({
            "message": {
                "event": "StreamEvent",
                "type": "Tipped",
                "channelId": "chan-1",
                "metadata": { "how_much": "3" }
            }
        }))
        .unwrap();

        assert_eq!(frame.kind(), "tip");
    }

    #[test]
    fn test_malformed_tip_is_ignored() {
        for metadata in [json!("{not json"), json!({ "how_much": "lots" }), json!({})] {
            let frame = decode_frame(&json!({
                "message": {
                    "event": "StreamEvent",
                    "type": "Tipped",
                    "channelId": "chan-1",
                    "metadata": metadata
                }
            }))
            .unwrap();
            assert_eq!(frame, GatewayFrame::Ignored);
        }
    }

    #[test]
    fn test_unrelated_frames_are_ignored() {
        assert_eq!(
            decode_frame(&json!({ "message": { "type": "user_joined", "channelId": "c" } }))
                .unwrap(),
            GatewayFrame::Ignored
        );
        assert_eq!(decode_frame(&json!({})).unwrap(), GatewayFrame::Ignored);
        assert!(matches!(
            decode_frame(&json!([1, 2, 3])),
            Err(GatewayError::NotAnObject)
        ));
        assert!(matches!(
            decode_frame(&json!("nope")),
            Err(GatewayError::NotAnObject)
        ));
    }

    #[test]
    fn test_encode_send_message() {
        let frame = encode_send_message(DEFAULT_GATEWAY_IDENTIFIER, "chan-1", "Countdown stopped");
        assert_eq!(frame["command"], "message");
        assert_eq!(frame["identifier"], DEFAULT_GATEWAY_IDENTIFIER);

        let data: Value = serde_json::from_str(frame["data"].as_str().unwrap()).unwrap();
        assert_eq!(data["action"], "send_message");
        assert_eq!(data["text"], "Countdown stopped");
        assert_eq!(data["channelId"], "chan-1");
    }
}
