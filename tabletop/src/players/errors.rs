//! Player repository error types.

use thiserror::Error;

/// Errors raised by player-management operations
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Player not found
    #[error("Player not found")]
    NotFound,

    /// Player name already exists
    #[error("Player name already exists")]
    NameTaken,
}

impl PlayerError {
    /// Get a client-safe error message that doesn't leak storage details.
    pub fn client_message(&self) -> String {
        match self {
            PlayerError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for player-management operations
pub type PlayerResult<T> = Result<T, PlayerError>;
