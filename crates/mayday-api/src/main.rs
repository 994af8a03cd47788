// Mayday API server
// SOS call coordination: stations raise, admins claim, everyone watches live
//
// The coordinator, fanout service and storage backend are constructed here
// and injected; nothing reaches for ambient global state.

mod broker;
mod common;
mod sos;
mod stream;
mod tokens;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use mayday_core::{Notifier, SosCoordinator, SosEvent, SosStatus, DEFAULT_HISTORY_LIMIT};
use mayday_storage::StorageBackend;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage_mode: String,
    broker_configured: bool,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    storage_mode: String,
    broker_configured: bool,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage_mode: state.storage_mode.clone(),
        broker_configured: state.broker_configured,
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        sos::create_sos,
        sos::list_sos,
        sos::accept_sos,
        sos::end_sos,
        stream::stream_admin,
        stream::stream_event,
        tokens::issue_token,
    ),
    components(
        schemas(
            SosEvent, SosStatus,
            sos::CreateSosRequest, sos::CreateSosResponse,
            sos::AcceptSosRequest, sos::AcceptSosResponse,
            sos::SosBoardResponse,
            tokens::TokenResponse,
            common::ErrorResponse,
        )
    ),
    tags(
        (name = "sos", description = "SOS lifecycle endpoints"),
        (name = "stream", description = "Real-time notification streams (SSE)"),
        (name = "tokens", description = "Media session credentials")
    ),
    info(
        title = "Mayday API",
        version = "0.1.0",
        description = "Coordinates SOS calls between field stations and on-duty admins",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mayday_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("mayday-api starting...");

    // Storage: Postgres when DATABASE_URL is set, in-memory dev mode otherwise
    let storage = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let backend = StorageBackend::postgres(&url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            backend
        }
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set, using in-memory storage (events are lost on restart)"
            );
            StorageBackend::in_memory()
        }
    };
    let storage_mode = if storage.is_dev_mode() {
        "in-memory"
    } else {
        "postgres"
    }
    .to_string();

    // Fanout service: constructed here, shared by the coordinator and the
    // streaming handlers, dropped (closing every channel) on shutdown
    let notifier = Arc::new(Notifier::default());

    let history_limit = std::env::var("SOS_HISTORY_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_HISTORY_LIMIT);
    let coordinator = Arc::new(
        SosCoordinator::new(Arc::new(storage), notifier.clone()).with_history_limit(history_limit),
    );

    // Media session broker (optional - the token route answers 503 when absent)
    let session_broker = match broker::SessionBroker::from_env() {
        Some(b) => {
            tracing::info!("Media session broker configured");
            Some(Arc::new(b))
        }
        None => {
            tracing::warn!(
                "LIVEKIT_API_KEY / LIVEKIT_API_SECRET not set, media session tokens disabled"
            );
            None
        }
    };
    let broker_configured = session_broker.is_some();

    // Create module-specific states
    let sos_state = sos::AppState {
        coordinator: coordinator.clone(),
    };
    let stream_state = stream::AppState {
        coordinator: coordinator.clone(),
        notifier: notifier.clone(),
    };
    let tokens_state = tokens::AppState {
        broker: session_broker,
    };
    let health_state = HealthState {
        storage_mode,
        broker_configured,
    };

    // Load CORS allowed origins from environment (optional)
    // Only needed when consoles are served from a different origin than the API
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    // Build API routes
    let api_routes = Router::new()
        .merge(sos::routes(sos_state))
        .merge(stream::routes(stream_state))
        .merge(tokens::routes(tokens_state));

    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(api_routes);

    // Add Swagger UI
    let app =
        app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::CACHE_CONTROL,
                ]),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
