//! Game-state error types.

use thiserror::Error;

use crate::players::PlayerError;

/// Errors raised by turn-order operations.
///
/// All variants are recoverable at the call site; none of them should take
/// the process down. Commands arriving over fire-and-forget channels log
/// these and leave the state untouched.
#[derive(Debug, Error)]
pub enum GameError {
    /// Unexpected storage failure, not attributable to caller input
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The operation targets a game state or order entry that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate initialization or duplicate order entry
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed input: duplicate ids or ids unknown to the player directory
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl GameError {
    /// Get a client-safe error message that doesn't leak storage details.
    pub fn client_message(&self) -> String {
        match self {
            GameError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Shorthand for a "no game state exists" error.
    pub(crate) fn not_started() -> Self {
        GameError::NotFound("no game state exists".to_string())
    }
}

impl From<PlayerError> for GameError {
    fn from(err: PlayerError) -> Self {
        match err {
            PlayerError::Database(e) => GameError::Database(e),
            PlayerError::NotFound => GameError::NotFound("player not found".to_string()),
            PlayerError::NameTaken => GameError::Conflict("player name already exists".to_string()),
        }
    }
}

/// Result type for turn-order operations
pub type GameResult<T> = Result<T, GameError>;
