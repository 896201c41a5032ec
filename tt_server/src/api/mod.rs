//! HTTP/WebSocket API for the session server.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP/WebSocket
//! - **Tower-HTTP**: CORS middleware
//! - **Broadcast events**: Game-state snapshots pushed to every live channel
//!
//! # Modules
//!
//! - [`players`]: GM-side player management (list, create, delete)
//! - [`websocket`]: Real-time channels for the GM and the players
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                - Health check
//! GET    /ws/gm                 - GM WebSocket channel
//! GET    /ws/player             - Player WebSocket channel (name + secret)
//! GET    /api/players           - List players
//! POST   /api/players           - Create player
//! DELETE /api/players/{id}      - Delete player
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod players;
pub mod websocket;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use serde_json::json;
use sqlx::PgPool;
use tabletop::{
    ConnectionRegistry, EventBus, GameHandler, HandshakeManager, PgPlayerRepository,
};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket
/// connections.
///
/// Cloned per request; every field is an Arc or otherwise cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<GameHandler>,
    pub players: Arc<PgPlayerRepository>,
    pub registry: Arc<ConnectionRegistry>,
    pub handshakes: Arc<HandshakeManager>,
    pub events: EventBus,
    pub pool: Arc<PgPool>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // WebSocket routes handle their own handshake in-band
        .route("/ws/gm", get(websocket::gm_websocket_handler))
        .route("/ws/player", get(websocket::player_websocket_handler))
        .route("/api/players", get(players::list_players))
        .route("/api/players", post(players::create_player))
        .route("/api/players/{player_id}", delete(players::delete_player))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers a trivial query, or
/// `503 Service Unavailable` when it does not.
///
/// # Example
///
/// ```bash
/// curl http://localhost:5050/health
/// # {"status":"healthy","database":true,"gmConnected":false,"connectedPlayers":0,"timestamp":"2026-08-30T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "database": db_healthy,
        "gmConnected": state.registry.is_gm_connected(),
        "connectedPlayers": state.registry.connected_player_count(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(body))
}
