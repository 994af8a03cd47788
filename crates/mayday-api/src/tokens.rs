// Media session token HTTP route

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::broker::{ParticipantRole, SessionBroker};
use crate::common::{ApiError, ErrorResponse};

/// App state for token routes
#[derive(Clone)]
pub struct AppState {
    /// None when LIVEKIT_API_KEY / LIVEKIT_API_SECRET are not configured.
    pub broker: Option<Arc<SessionBroker>>,
}

/// Create token routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/rooms/:room_name/token", get(issue_token))
        .with_state(state)
}

/// Query parameters for token issuance
#[derive(Debug, Deserialize, IntoParams)]
pub struct TokenQuery {
    /// Participant identity, without the role prefix.
    #[param(example = "admin1")]
    pub identity: String,
    /// Participant role: `admin` or `station`.
    #[param(value_type = String, example = "admin")]
    pub role: ParticipantRole,
}

/// Issued media session credential
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// GET /v1/rooms/{room_name}/token - Issue a media session credential
#[utoipa::path(
    get,
    path = "/v1/rooms/{room_name}/token",
    params(
        ("room_name" = String, Path, description = "Media room name (sos-room-<id>)"),
        TokenQuery
    ),
    responses(
        (status = 200, description = "Credential issued", body = TokenResponse),
        (status = 400, description = "Missing identity", body = ErrorResponse),
        (status = 503, description = "Broker not configured", body = ErrorResponse)
    ),
    tag = "tokens"
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Path(room_name): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>, ApiError> {
    let broker = state.broker.as_ref().ok_or_else(|| {
        ApiError::service_unavailable("media session broker is not configured")
    })?;

    let identity = query.identity.trim();
    if identity.is_empty() {
        return Err(ApiError::bad_request("identity is required"));
    }

    let token = broker.issue(&room_name, identity, query.role).map_err(|e| {
        tracing::error!("failed to issue session token: {e}");
        ApiError::internal("failed to issue session token")
    })?;

    Ok(Json(TokenResponse { token }))
}
