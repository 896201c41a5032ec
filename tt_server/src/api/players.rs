//! GM-side player management endpoints.
//!
//! These sit outside the live channel: the GM's admin screen manages the
//! roster over plain HTTP, and a deletion is followed by a turn-order
//! membership sync so a running session never keeps pointing at a player
//! that no longer exists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tabletop::{GameError, Player, PlayerDirectory, PlayerId, players::PlayerError};

use super::AppState;

/// Error response for failed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Request body for creating a player
#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
}

/// List every player with their stats.
///
/// The response includes each player's secret; this endpoint serves the
/// GM's admin screen, which hands the secrets out to the players.
///
/// # Response
///
/// - `200 OK`: JSON array of players
/// - `500 Internal Server Error`: Database error
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<Player>>, (StatusCode, Json<ErrorResponse>)> {
    match state.players.list_players().await {
        Ok(players) => Ok(Json(players)),
        Err(e) => Err(error_response(e)),
    }
}

/// Create a player with a freshly generated secret.
///
/// # Request Body
///
/// ```json
/// { "name": "Mira" }
/// ```
///
/// # Response
///
/// - `201 Created`: The new player, secret included
/// - `409 Conflict`: The name is already taken
/// - `422 Unprocessable Entity`: Blank name
pub async fn create_player(
    State(state): State<AppState>,
    Json(request): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<Player>), (StatusCode, Json<ErrorResponse>)> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "Player name must not be blank".to_string(),
            }),
        ));
    }

    match state.players.create_player(name).await {
        Ok(player) => {
            info!("Player created: id={}, name={}", player.id, player.name);
            Ok((StatusCode::CREATED, Json(player)))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Delete a player, then drop them from the turn order of any running
/// session.
///
/// The sync failing does not fail the request; the deletion already
/// happened, and the order heals on the next sync.
///
/// # Response
///
/// - `204 No Content`: Player deleted
/// - `404 Not Found`: No such player
pub async fn delete_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = state.players.delete_player(player_id).await {
        return Err(error_response(e));
    }
    info!("Player deleted: id={player_id}");

    match state.players.all_ids().await {
        Ok(existing) => {
            if let Err(e) = state.game.sync_membership(&existing).await {
                // Tolerated; NotFound cannot happen here and anything else
                // resolves on the next membership sync.
                match e {
                    GameError::NotFound(_) => {}
                    other => error!("Turn-order sync after deletion failed: {other}"),
                }
            }
        }
        Err(e) => error!("Failed to load player ids for turn-order sync: {e}"),
    }

    Ok(StatusCode::NO_CONTENT)
}

fn error_response(e: PlayerError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        PlayerError::NotFound => StatusCode::NOT_FOUND,
        PlayerError::NameTaken => StatusCode::CONFLICT,
        PlayerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Player request failed: {e}");
    }
    (
        status,
        Json(ErrorResponse {
            error: e.client_message(),
        }),
    )
}
