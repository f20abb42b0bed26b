//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    gateway::decode_frame,
    state::{AppState, CountdownSnapshot},
};
use super::responses::{ErrorResponse, HealthResponse, IngestResponse, StatusResponse};

/// Handle GET /overlay/state - Current countdown snapshot
pub async fn overlay_state_handler(State(state): State<Arc<AppState>>) -> Json<CountdownSnapshot> {
    Json(state.engine.snapshot())
}

/// Handle GET /overlay/stream - Server-Sent Events of countdown snapshots
///
/// The current snapshot is sent first, then every published update. The
/// overlay subscription lives as long as the response stream.
pub async fn overlay_stream_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel::<CountdownSnapshot>();

    // Subscribe before reading the initial snapshot so no update slips between.
    let subscription = state.publisher.subscribe(move |snapshot| {
        let _ = tx.send(snapshot.clone());
    });
    let initial = state.engine.snapshot();
    info!(
        "Overlay stream connected ({} subscribers)",
        state.publisher.subscriber_count()
    );

    let updates = stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        let snapshot = rx.recv().await?;
        Some((snapshot, (rx, subscription)))
    });

    let events = stream::once(async move { initial })
        .chain(updates)
        .filter_map(|snapshot| async move { snapshot_event(&snapshot) })
        .map(Ok::<_, Infallible>);

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn snapshot_event(snapshot: &CountdownSnapshot) -> Option<Event> {
    match Event::default().json_data(snapshot) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to encode overlay snapshot: {}", e);
            None
        }
    }
}

/// Handle POST /gateway/events - Ingest one gateway frame
pub async fn gateway_event_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<IngestResponse>), (StatusCode, Json<ErrorResponse>)> {
    let frame = match decode_frame(&body) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("Rejected gateway frame: {}", e);
            return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))));
        }
    };

    let kind = frame.kind();
    state.ingest(frame);
    Ok((StatusCode::ACCEPTED, Json(IngestResponse::accepted(kind))))
}

/// Handle GET /status - Return countdown and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_event, last_event_time) = state.get_last_event();

    Json(StatusResponse {
        countdown: state.engine.snapshot(),
        gateway_subscribed: state.dispatcher.is_subscribed(),
        overlay_subscribers: state.publisher.subscriber_count(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_event,
        last_event_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
