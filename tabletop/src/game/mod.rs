//! Turn-order session core.
//!
//! The singleton [`GameState`] models whose turn it is and what round the
//! table is in. [`GameHandler`] wraps it with persistence, validation, and
//! change broadcasting; the pure arithmetic lives on the state itself.

pub mod errors;
pub mod handler;
pub mod state;

pub use errors::{GameError, GameResult};
pub use handler::GameHandler;
pub use state::{GameSnapshot, GameState, PlayerOrderEntry, GAME_STATE_ID};
