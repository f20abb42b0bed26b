//! Main application state management

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};
use chrono::{DateTime, Utc};

use crate::{
    countdown::CountdownEngine,
    gateway::{EventDispatcher, GatewayFrame},
    overlay::OverlayPublisher,
    parsing::format_duration,
    services::ChatSender,
};

/// Shared state handed to every HTTP handler
pub struct AppState {
    /// The countdown and its broadcast hub
    pub engine: Arc<CountdownEngine>,
    pub publisher: Arc<OverlayPublisher>,
    /// Routes gateway frames into the engine
    pub dispatcher: EventDispatcher,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last gateway frame tracking
    last_event: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    /// Wire up a fresh engine that replies through `chat`
    pub fn new(port: u16, host: String, chat: Arc<dyn ChatSender>) -> Self {
        let publisher = Arc::new(OverlayPublisher::new());
        let engine = CountdownEngine::new(chat, Arc::clone(&publisher));

        Self {
            dispatcher: EventDispatcher::new(Arc::clone(&engine)),
            engine,
            publisher,
            start_time: Instant::now(),
            port,
            host,
            last_event: Mutex::new(None),
        }
    }

    /// Record and dispatch one decoded gateway frame
    pub fn ingest(&self, frame: GatewayFrame) {
        *self.last_event.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((frame.kind().to_string(), Utc::now()));
        self.dispatcher.dispatch_frame(frame);
    }

    /// Kind and time of the last gateway frame received
    pub fn get_last_event(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self
            .last_event
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some((kind, at)) => (Some(kind), Some(at)),
            None => (None, None),
        }
    }

    /// Server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_duration(self.start_time.elapsed().as_secs())
    }
}
