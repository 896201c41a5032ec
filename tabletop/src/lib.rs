//! # Tabletop
//!
//! Coordination core for a single live tabletop-game session: one game
//! master (GM), any number of players, and a shared turn order that both
//! sides observe in real time.
//!
//! The library owns the two pieces with real invariants:
//!
//! - The **connection registry**: at most one active GM channel, at most one
//!   active channel per player, and disconnect handling that tolerates the
//!   reconnect-before-stale-disconnect race.
//! - The **turn order state machine**: the single persisted game state,
//!   mutated only through atomic, invariant-preserving operations
//!   (initialization, turn advancement and reversal, reordering, membership
//!   edits, note edits).
//!
//! Everything else — the GM and player dashboards, chat, stat editing — sits
//! outside and talks to this core through the handshake boundary and the
//! snapshot push.
//!
//! ## Core Modules
//!
//! - [`game`]: Game state, turn arithmetic, and the transactional handler
//! - [`registry`]: Active-connection bookkeeping for the GM and players
//! - [`auth`]: Handshake validation and secret generation
//! - [`events`]: Broadcast bus carrying game-state snapshots to observers
//! - [`players`]: Player directory models and repository
//! - [`db`]: PostgreSQL pool, schema bootstrap, and the game-state store
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabletop::db::{Database, DatabaseConfig, PgGameStateStore};
//! use tabletop::events::EventBus;
//! use tabletop::game::GameHandler;
//! use tabletop::players::PgPlayerRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::default()).await?;
//!     let store = Arc::new(PgGameStateStore::new(db.pool().clone()));
//!     let players = Arc::new(PgPlayerRepository::new(db.pool().clone()));
//!     let game = GameHandler::new(store, players, EventBus::new(32));
//!
//!     let snapshot = game.init(vec![]).await?;
//!     println!("round {}", snapshot.round_number);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod db;
pub mod events;
pub mod game;
pub mod players;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{HandshakeError, HandshakeManager, Rejection};
pub use db::{Database, DatabaseConfig, GameStateStore, PgGameStateStore};
pub use events::{EventBus, GameEvent};
pub use game::{GameError, GameHandler, GameResult, GameSnapshot, GameState, PlayerOrderEntry};
pub use players::{PgPlayerRepository, Player, PlayerDirectory, PlayerId, PlayerStat, StatValue};
pub use registry::{ConnectionId, ConnectionRegistry, RegistryError};
