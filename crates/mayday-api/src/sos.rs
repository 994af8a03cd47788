// SOS lifecycle HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use mayday_core::{CreateSos, SosCoordinator, SosEvent};

use crate::common::{ApiError, ErrorResponse};

/// Request to raise an SOS
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSosRequest {
    /// Identifier of the originating station.
    #[schema(example = "ST001")]
    pub station_id: String,
    /// Display name of the originating station.
    #[schema(example = "Station A")]
    pub station_name: String,
}

/// Response to a successful create
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSosResponse {
    pub id: Uuid,
    /// Media room for this call, derived from the id.
    #[schema(example = "sos-room-0193a1b2-...")]
    pub room_name: String,
}

/// Request to claim a pending SOS
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AcceptSosRequest {
    /// Identity of the admin claiming the call.
    #[schema(example = "admin1")]
    pub accepted_by: String,
}

/// Response to a successful accept
#[derive(Debug, Serialize, ToSchema)]
pub struct AcceptSosResponse {
    pub room_name: String,
}

/// Board snapshot: what is waiting and what already happened
#[derive(Debug, Serialize, ToSchema)]
pub struct SosBoardResponse {
    /// Pending events, oldest first.
    pub pending: Vec<SosEvent>,
    /// Accepted/ended events, newest first, capped.
    pub history: Vec<SosEvent>,
}

/// App state for SOS routes
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SosCoordinator>,
}

/// Create SOS routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/sos", post(create_sos).get(list_sos))
        .route("/v1/sos/:id/accept", post(accept_sos))
        .route("/v1/sos/:id/end", post(end_sos))
        .with_state(state)
}

/// POST /v1/sos - Raise a new SOS
#[utoipa::path(
    post,
    path = "/v1/sos",
    request_body = CreateSosRequest,
    responses(
        (status = 201, description = "SOS created and broadcast to admins", body = CreateSosResponse),
        (status = 400, description = "Missing or blank fields", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "sos"
)]
pub async fn create_sos(
    State(state): State<AppState>,
    Json(req): Json<CreateSosRequest>,
) -> Result<(StatusCode, Json<CreateSosResponse>), ApiError> {
    let created = state
        .coordinator
        .create(CreateSos {
            station_id: req.station_id,
            station_name: req.station_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSosResponse {
            id: created.id,
            room_name: created.room_name,
        }),
    ))
}

/// GET /v1/sos - Board snapshot
#[utoipa::path(
    get,
    path = "/v1/sos",
    responses(
        (status = 200, description = "Pending and recent events", body = SosBoardResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "sos"
)]
pub async fn list_sos(
    State(state): State<AppState>,
) -> Result<Json<SosBoardResponse>, ApiError> {
    let board = state.coordinator.list().await?;
    Ok(Json(SosBoardResponse {
        pending: board.pending,
        history: board.history,
    }))
}

/// POST /v1/sos/{id}/accept - Claim a pending SOS
#[utoipa::path(
    post,
    path = "/v1/sos/{id}/accept",
    params(
        ("id" = Uuid, Path, description = "SOS event ID")
    ),
    request_body = AcceptSosRequest,
    responses(
        (status = 200, description = "Claimed; caller owns the call", body = AcceptSosResponse),
        (status = 400, description = "Missing admin identity", body = ErrorResponse),
        (status = 409, description = "Already claimed, already over, or unknown", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "sos"
)]
pub async fn accept_sos(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AcceptSosRequest>,
) -> Result<Json<AcceptSosResponse>, ApiError> {
    let accepted = state.coordinator.accept(id, &req.accepted_by).await?;
    Ok(Json(AcceptSosResponse {
        room_name: accepted.room_name,
    }))
}

/// POST /v1/sos/{id}/end - End a call (idempotent)
#[utoipa::path(
    post,
    path = "/v1/sos/{id}/end",
    params(
        ("id" = Uuid, Path, description = "SOS event ID")
    ),
    responses(
        (status = 204, description = "Ended (or already ended)"),
        (status = 409, description = "Unknown SOS id", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "sos"
)]
pub async fn end_sos(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.coordinator.end(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sos_request_shape() {
        let json = r#"{"station_id": "ST001", "station_name": "Station A"}"#;
        let req: CreateSosRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.station_id, "ST001");
        assert_eq!(req.station_name, "Station A");
    }

    #[test]
    fn test_create_sos_request_requires_both_fields() {
        let json = r#"{"station_id": "ST001"}"#;
        assert!(serde_json::from_str::<CreateSosRequest>(json).is_err());
    }

    #[test]
    fn test_accept_sos_request_shape() {
        let json = r#"{"accepted_by": "admin1"}"#;
        let req: AcceptSosRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.accepted_by, "admin1");
    }
}
