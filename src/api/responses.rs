//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::CountdownSnapshot;

/// Status response with countdown and gateway information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub countdown: CountdownSnapshot,
    pub gateway_subscribed: bool,
    pub overlay_subscribers: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_event: Option<String>,
    pub last_event_time: Option<DateTime<Utc>>,
}

/// Acknowledgement for an ingested gateway frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub accepted: bool,
    pub kind: String,
    pub timestamp: DateTime<Utc>,
}

impl IngestResponse {
    pub fn accepted(kind: &str) -> Self {
        Self {
            accepted: true,
            kind: kind.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Error body for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self {
            error,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
