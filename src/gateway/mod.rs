//! Streaming platform gateway module
//!
//! Decoding of inbound gateway frames, encoding of outbound chat commands,
//! and routing of decoded events into the countdown engine.

pub mod dispatcher;
pub mod protocol;

pub use dispatcher::EventDispatcher;
pub use protocol::{
    decode_frame, encode_send_message, GatewayError, GatewayFrame,
    InboundEvent, DEFAULT_GATEWAY_IDENTIFIER,
};
