//! WebSocket channels for the GM and the players.
//!
//! Both channel kinds follow the same lifecycle:
//!
//! 1. Client connects (`GET /ws/gm` or `GET /ws/player?name=..&secret=..`)
//! 2. Server upgrades, then runs the handshake in-band; a refused channel
//!    receives one structured rejection message and is closed
//! 3. An accepted channel immediately receives the current game state
//!    (or `null` when no session is initialized)
//! 4. Every successful mutation pushes a fresh snapshot to every channel
//! 5. On disconnect the channel's registry slot is released, unless a
//!    reconnect already claimed it
//!
//! GM commands are fire-and-forget: a command that fails is logged and
//! dropped, no error travels back over the channel. The GM's view self-heals
//! on the next successful mutation.
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:5050/ws/player?name=Mira&secret=ab12..');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'game_state') {
//!     renderTurnOrder(msg.game_state);
//!   } else if (msg.type === 'rejected') {
//!     showError(msg.code);
//!   }
//! };
//! ```

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tabletop::{
    ConnectionId, GameEvent, GameSnapshot, PlayerId,
    registry::ConnectionRegistry,
};
use tokio::sync::broadcast::error::RecvError;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct PlayerWsQuery {
    name: String,
    secret: String,
}

/// Commands the GM sends over the channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum GmCommand {
    /// Initialize the session with an ordered list of player ids
    InitGame { player_ids: Vec<PlayerId> },
    /// Move to the next player's turn
    NextTurn,
    /// Undo the most recent turn advancement
    RevertTurn,
    /// Replace the turn order wholesale
    UpdatePlayerOrder { player_ids: Vec<PlayerId> },
    /// Append a player to the end of the order
    AddPlayerToOrder { player_id: PlayerId },
    /// Remove a player from the order
    RemovePlayerFromOrder { player_id: PlayerId },
    /// Replace the shared notes
    UpdateNotes { notes: String },
    /// Replace the GM-only notes
    UpdateHiddenNotes { hidden_notes: String },
    /// End the session
    EndGame,
}

/// Messages pushed to connected channels.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    /// Current game state; `null` when no session is initialized
    GameState { game_state: Option<GameSnapshot> },
    /// Handshake refusal, sent once before the channel is closed
    Rejected { code: String, message: String },
}

/// Upgrade the GM channel.
///
/// The single-GM-slot check happens after the upgrade so the refusal can be
/// delivered as a structured message instead of a bare HTTP status.
pub async fn gm_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_gm_socket(socket, state))
}

/// Upgrade a player channel, authenticated by display name and secret.
pub async fn player_websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<PlayerWsQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_player_socket(socket, query, state))
}

async fn handle_gm_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let conn = match state.handshakes.accept_gm() {
        Ok(conn) => conn,
        Err(e) => {
            warn!("GM handshake refused: {}", e.code());
            reject_and_close(sender, e.rejection()).await;
            return;
        }
    };

    info!("GM connected: conn={conn}");

    let mut events = state.events.subscribe();
    if !send_current_state(&mut sender, &state).await {
        cleanup_gm(&state.registry, conn);
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                if !forward_event(&mut sender, event, &state).await {
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_gm_command(&text, &state).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("GM channel error: {e}");
                        break;
                    }
                }
            }
        }
    }

    info!("GM disconnected: conn={conn}");
    cleanup_gm(&state.registry, conn);
}

async fn handle_player_socket(socket: WebSocket, query: PlayerWsQuery, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (player_id, conn) = match state.handshakes.accept_player(&query.name, &query.secret).await
    {
        Ok(accepted) => accepted,
        Err(e) => {
            warn!("Player handshake refused for '{}': {}", query.name, e.code());
            reject_and_close(sender, e.rejection()).await;
            return;
        }
    };

    info!("Player connected: player={player_id}, conn={conn}");

    let mut events = state.events.subscribe();
    if !send_current_state(&mut sender, &state).await {
        cleanup_player(&state.registry, player_id, conn);
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                if !forward_event(&mut sender, event, &state).await {
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    // Players only listen; anything they send is dropped.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Player {player_id} channel error: {e}");
                        break;
                    }
                }
            }
        }
    }

    info!("Player disconnected: player={player_id}, conn={conn}");
    cleanup_player(&state.registry, player_id, conn);
}

/// Send one rejection message, then close the channel.
async fn reject_and_close(
    mut sender: SplitSink<WebSocket, Message>,
    rejection: tabletop::Rejection,
) {
    let message = ServerMessage::Rejected {
        code: rejection.code,
        message: rejection.message,
    };
    if let Ok(json) = serde_json::to_string(&message) {
        let _ = sender.send(Message::Text(json.into())).await;
    }
    let _ = sender.close().await;
}

/// Push the current game state to a freshly accepted channel. Returns
/// `false` when the channel is already gone.
async fn send_current_state(sender: &mut SplitSink<WebSocket, Message>, state: &AppState) -> bool {
    let snapshot = match state.game.get().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Failed to load game state for new channel: {e}");
            None
        }
    };
    send_snapshot(sender, snapshot).await
}

/// Forward a broadcast event to the channel. A lagged receiver resyncs with
/// a full read instead of trying to replay the missed events.
async fn forward_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: Result<GameEvent, RecvError>,
    state: &AppState,
) -> bool {
    match event {
        Ok(GameEvent::GameStateChanged(snapshot)) => send_snapshot(sender, snapshot).await,
        Err(RecvError::Lagged(missed)) => {
            warn!("Channel lagged {missed} events; resyncing");
            send_current_state(sender, state).await
        }
        Err(RecvError::Closed) => false,
    }
}

async fn send_snapshot(
    sender: &mut SplitSink<WebSocket, Message>,
    snapshot: Option<GameSnapshot>,
) -> bool {
    let message = ServerMessage::GameState {
        game_state: snapshot,
    };
    let json = match serde_json::to_string(&message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize game state: {e}");
            return true;
        }
    };
    sender.send(Message::Text(json.into())).await.is_ok()
}

/// Parse and run one GM command. Errors are logged and dropped; the channel
/// never sees a per-command response.
async fn dispatch_gm_command(text: &str, state: &AppState) {
    let command = match serde_json::from_str::<GmCommand>(text) {
        Ok(command) => command,
        Err(e) => {
            warn!("Ignoring malformed GM command: {e}");
            return;
        }
    };

    let result = match command {
        GmCommand::InitGame { player_ids } => state.game.init(player_ids).await.map(drop),
        GmCommand::NextTurn => state.game.advance_turn().await.map(drop),
        GmCommand::RevertTurn => state.game.revert_turn().await.map(drop),
        GmCommand::UpdatePlayerOrder { player_ids } => {
            state.game.update_player_order(player_ids).await.map(drop)
        }
        GmCommand::AddPlayerToOrder { player_id } => {
            state.game.add_player_to_order(player_id).await.map(drop)
        }
        GmCommand::RemovePlayerFromOrder { player_id } => state
            .game
            .remove_player_from_order(player_id)
            .await
            .map(drop),
        GmCommand::UpdateNotes { notes } => state.game.update_notes(notes).await.map(drop),
        GmCommand::UpdateHiddenNotes { hidden_notes } => {
            state.game.update_hidden_notes(hidden_notes).await.map(drop)
        }
        GmCommand::EndGame => state.game.delete().await,
    };

    if let Err(e) = result {
        error!("GM command failed: {e}");
    }
}

/// Release the GM slot, unless a reconnect already claimed it with a newer
/// channel.
fn cleanup_gm(registry: &ConnectionRegistry, conn: ConnectionId) {
    registry.unregister_gm_if(conn);
}

fn cleanup_player(registry: &ConnectionRegistry, player_id: PlayerId, conn: ConnectionId) {
    registry.unregister_player_if(player_id, conn);
}
