// Real-time streaming HTTP routes (SSE)
//
// Two scopes mirror the fanout model: /v1/stream/admin carries every
// transition to admin consoles, /v1/sos/{id}/stream carries accepted/ended
// for one event (how the station learns its call was picked up or hung up).
// Delivery is best-effort; a client that missed a transition reconciles via
// GET /v1/sos.

use axum::{
    extract::{Path, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::{Stream, StreamExt};
use std::{convert::Infallible, sync::Arc};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

use mayday_core::{Notifier, SosCoordinator, SosNotification};

use crate::common::{ApiError, ErrorResponse};

/// App state for streaming routes
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SosCoordinator>,
    pub notifier: Arc<Notifier>,
}

/// Create streaming routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/stream/admin", get(stream_admin))
        .route("/v1/sos/:id/stream", get(stream_event))
        .with_state(state)
}

fn into_sse(
    stream: BroadcastStream<SosNotification>,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    stream.filter_map(|item| async move {
        match item {
            Ok(notification) => match serde_json::to_string(&notification) {
                Ok(data) => Some(Ok(SseEvent::default()
                    .event(notification.event_name())
                    .data(data))),
                Err(e) => {
                    tracing::error!("failed to serialize notification: {e}");
                    None
                }
            },
            // This consumer fell behind and dropped messages; it catches up
            // from the board snapshot, not from us
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "subscriber lagged behind fanout");
                None
            }
        }
    })
}

/// GET /v1/stream/admin - Admin-broadcast scope
///
/// Every connected admin console receives `sos.new`, `sos.accepted` and
/// `sos.ended` for every station.
#[utoipa::path(
    get,
    path = "/v1/stream/admin",
    responses(
        (status = 200, description = "Notification stream", content_type = "text/event-stream")
    ),
    tag = "stream"
)]
pub async fn stream_admin(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    tracing::info!("admin console subscribed");
    let rx = state.notifier.subscribe_admins();
    Sse::new(into_sse(BroadcastStream::new(rx))).keep_alive(KeepAlive::default())
}

/// GET /v1/sos/{id}/stream - Event scope
///
/// Carries `sos.accepted` / `sos.ended` for exactly this event; closes after
/// the call ends.
#[utoipa::path(
    get,
    path = "/v1/sos/{id}/stream",
    params(
        ("id" = Uuid, Path, description = "SOS event ID")
    ),
    responses(
        (status = 200, description = "Notification stream", content_type = "text/event-stream"),
        (status = 404, description = "Unknown SOS id", body = ErrorResponse)
    ),
    tag = "stream"
)]
pub async fn stream_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    // Verify the event exists before opening a scope on it
    state
        .coordinator
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("sos {id} not found")))?;

    tracing::info!(%id, "event-scope subscriber attached");
    let rx = state.notifier.subscribe_event(id);
    Ok(Sse::new(into_sse(BroadcastStream::new(rx))).keep_alive(KeepAlive::default()))
}
