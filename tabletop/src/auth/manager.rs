//! Handshake manager implementation.

use std::sync::Arc;

use super::errors::{HandshakeError, HandshakeResult};
use crate::players::{PlayerDirectory, PlayerId};
use crate::registry::{ConnectionId, ConnectionRegistry, RegistryError};

/// Validates handshakes and claims registry slots for accepted channels.
///
/// Acceptance and registration are a single step: the registry insert is the
/// authoritative gate, so two racing handshakes for the same identity cannot
/// both win. The manager only decides accept/reject — closing a refused
/// channel is the caller's job.
pub struct HandshakeManager {
    directory: Arc<dyn PlayerDirectory>,
    registry: Arc<ConnectionRegistry>,
}

impl HandshakeManager {
    pub fn new(directory: Arc<dyn PlayerDirectory>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            directory,
            registry,
        }
    }

    /// Accept a GM handshake.
    ///
    /// # Errors
    ///
    /// * `HandshakeError::GmAlreadyConnected` - a GM channel is registered
    pub fn accept_gm(&self) -> HandshakeResult<ConnectionId> {
        let conn = ConnectionId::new();
        match self.registry.register_gm(conn) {
            Ok(()) => Ok(conn),
            Err(RegistryError::GmAlreadyConnected) => Err(HandshakeError::GmAlreadyConnected),
            Err(RegistryError::PlayerAlreadyConnected(_)) => {
                unreachable!("register_gm never reports a player conflict")
            }
        }
    }

    /// Accept a player handshake for the presented name and secret.
    ///
    /// # Errors
    ///
    /// * `HandshakeError::InvalidCredentials` - name matches no player
    /// * `HandshakeError::InvalidSecret` - secret mismatch
    /// * `HandshakeError::PlayerAlreadyConnected` - player holds a channel
    pub async fn accept_player(
        &self,
        name: &str,
        secret: &str,
    ) -> HandshakeResult<(PlayerId, ConnectionId)> {
        let Some(player_id) = self.directory.id_by_name(name).await? else {
            return Err(HandshakeError::InvalidCredentials);
        };

        let player = self
            .directory
            .get_by_id(player_id)
            .await?
            .ok_or(HandshakeError::InvalidCredentials)?;

        if player.secret != secret {
            return Err(HandshakeError::InvalidSecret);
        }

        let conn = ConnectionId::new();
        match self.registry.register_player(player_id, conn) {
            Ok(()) => Ok((player_id, conn)),
            Err(_) => Err(HandshakeError::PlayerAlreadyConnected),
        }
    }
}
