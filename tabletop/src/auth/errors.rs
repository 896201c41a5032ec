//! Handshake error types.

use thiserror::Error;

use super::models::Rejection;
use crate::players::PlayerError;

/// Reasons a connection handshake is refused
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// A GM channel is already registered
    #[error("Game master already connected")]
    GmAlreadyConnected,

    /// The presented name does not resolve to any player
    #[error("Credentials do not match any player")]
    InvalidCredentials,

    /// The presented secret does not match the stored one
    #[error("Invalid player secret")]
    InvalidSecret,

    /// The player already holds an active channel
    #[error("Player already connected")]
    PlayerAlreadyConnected,

    /// The directory lookup itself failed
    #[error(transparent)]
    Directory(#[from] PlayerError),
}

impl HandshakeError {
    /// Machine-readable rejection code delivered to the refused channel.
    pub fn code(&self) -> &'static str {
        match self {
            HandshakeError::GmAlreadyConnected => "GM_ALREADY_CONNECTED",
            HandshakeError::InvalidCredentials => "INVALID_CREDENTIALS",
            HandshakeError::InvalidSecret => "INVALID_SECRET",
            HandshakeError::PlayerAlreadyConnected => "PLAYER_ALREADY_CONNECTED",
            HandshakeError::Directory(_) => "INTERNAL_ERROR",
        }
    }

    /// Get a client-safe error message that doesn't leak storage details.
    pub fn client_message(&self) -> String {
        match self {
            HandshakeError::Directory(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Structured rejection payload for the refused channel.
    pub fn rejection(&self) -> Rejection {
        Rejection {
            code: self.code().to_string(),
            message: format!("Connection refused: {}", self.client_message()),
        }
    }
}

/// Result type for handshake validation
pub type HandshakeResult<T> = Result<T, HandshakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_wire_contract() {
        assert_eq!(HandshakeError::GmAlreadyConnected.code(), "GM_ALREADY_CONNECTED");
        assert_eq!(HandshakeError::InvalidCredentials.code(), "INVALID_CREDENTIALS");
        assert_eq!(HandshakeError::InvalidSecret.code(), "INVALID_SECRET");
        assert_eq!(
            HandshakeError::PlayerAlreadyConnected.code(),
            "PLAYER_ALREADY_CONNECTED"
        );
    }

    #[test]
    fn test_rejection_payload_carries_code_and_message() {
        let rejection = HandshakeError::InvalidSecret.rejection();
        assert_eq!(rejection.code, "INVALID_SECRET");
        assert!(rejection.message.contains("Connection refused"));
    }
}
