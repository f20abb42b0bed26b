//! Routes decoded gateway events into the countdown engine

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, info, warn};

use crate::{
    countdown::CountdownEngine,
    parsing::{is_command, parse_command},
};

use super::protocol::{GatewayFrame, InboundEvent};

pub struct EventDispatcher {
    engine: Arc<CountdownEngine>,
    subscribed: AtomicBool,
}

impl EventDispatcher {
    pub fn new(engine: Arc<CountdownEngine>) -> Self {
        Self {
            engine,
            subscribed: AtomicBool::new(false),
        }
    }

    /// Whether the gateway confirmed our channel subscription
    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Relaxed)
    }

    /// Route one gateway frame. Channel events are only acted on once the
    /// gateway has confirmed the subscription.
    pub fn dispatch_frame(&self, frame: GatewayFrame) {
        match frame {
            GatewayFrame::Ping | GatewayFrame::Ignored => {}
            GatewayFrame::SubscriptionConfirmed => {
                info!("Gateway subscription confirmed");
                self.subscribed.store(true, Ordering::Relaxed);
            }
            GatewayFrame::SubscriptionRejected => {
                warn!("Gateway subscription rejected");
                self.subscribed.store(false, Ordering::Relaxed);
            }
            GatewayFrame::Event(event) if self.is_subscribed() => self.dispatch(event),
            GatewayFrame::Event(_) => {
                debug!("Dropping gateway event received before subscription confirmation");
            }
        }
    }

    pub fn dispatch(&self, event: InboundEvent) {
        match event {
            InboundEvent::ChatMessage {
                channel_id,
                text,
                author_is_moderator,
                author_is_owner,
            } => {
                // Unprivileged authors get no reply at all, not even usage text.
                if is_command(&text) && !(author_is_moderator || author_is_owner) {
                    debug!(
                        "Dropping countdown command from unprivileged author on {}",
                        channel_id
                    );
                    return;
                }

                if let Some(raw) = parse_command(&text) {
                    self.engine.handle_command(&channel_id, &raw);
                }
            }
            InboundEvent::Tip { channel_id, amount } => {
                self.engine.apply_tip(&channel_id, amount);
            }
        }
    }
}
