//! Connection handshake validation.
//!
//! Every channel is validated here before it enters the registry:
//!
//! - A GM handshake succeeds iff no GM channel is currently registered.
//! - A player handshake needs a name that resolves to an existing player, a
//!   secret that string-equals the stored one, and no channel already
//!   registered for that player id.
//!
//! Any failure yields a structured [`Rejection`]; the caller is responsible
//! for delivering it and closing the offered channel — the core never closes
//! channels itself.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{HandshakeError, HandshakeResult};
pub use manager::HandshakeManager;
pub use models::Rejection;

/// Generate a player secret: a random 32-character hex string.
///
/// Handed to a player once at creation and presented on every handshake.
/// It deters accidental impersonation between players at the same table; it
/// is not meant to withstand a determined attacker.
pub fn make_player_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_player_secret_is_32_hex_chars() {
        let secret = make_player_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_make_player_secret_varies() {
        assert_ne!(make_player_secret(), make_player_secret());
    }
}
