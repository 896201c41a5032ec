//! Active-connection registry.
//!
//! Tracks who currently holds a live channel: at most one GM and at most one
//! channel per player id. The registry is an owned object injected into the
//! handshake and disconnect paths — it is the only writer of its slots, it
//! never closes channels itself, and its state is process-local (a restart
//! simply requires every participant to re-handshake).
//!
//! Each registration carries a [`ConnectionId`] so a disconnect for a channel
//! that has already been superseded by a newer registration (page-refresh
//! race) can be recognized and ignored.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use thiserror::Error;
use uuid::Uuid;

use crate::players::PlayerId;

/// Opaque identity of one accepted channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors raised by registration attempts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A GM channel is already registered
    #[error("GM already connected")]
    GmAlreadyConnected,

    /// The player already holds a registered channel
    #[error("player {0} already connected")]
    PlayerAlreadyConnected(PlayerId),
}

#[derive(Debug, Default)]
struct RegistryInner {
    gm: Option<ConnectionId>,
    players: HashMap<PlayerId, ConnectionId>,
}

/// Registry of active GM and player channels.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: Mutex<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the GM channel. Rejects rather than silently replacing an
    /// existing registration, so a still-live prior channel is never
    /// orphaned.
    pub fn register_gm(&self, conn: ConnectionId) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        if inner.gm.is_some() {
            return Err(RegistryError::GmAlreadyConnected);
        }
        inner.gm = Some(conn);
        log::info!("GM channel {conn} registered");
        Ok(())
    }

    /// Clear the GM slot unconditionally. Idempotent.
    pub fn unregister_gm(&self) {
        self.lock().gm = None;
    }

    /// Clear the GM slot only if it still holds `conn`. A disconnect for a
    /// superseded channel is a no-op.
    pub fn unregister_gm_if(&self, conn: ConnectionId) {
        let mut inner = self.lock();
        if inner.gm == Some(conn) {
            inner.gm = None;
            log::info!("GM channel {conn} unregistered");
        }
    }

    pub fn is_gm_connected(&self) -> bool {
        self.lock().gm.is_some()
    }

    /// The currently registered GM channel, if any.
    pub fn gm_connection(&self) -> Option<ConnectionId> {
        self.lock().gm
    }

    /// Register a channel for `player_id`. Fails if the player already holds
    /// one.
    pub fn register_player(
        &self,
        player_id: PlayerId,
        conn: ConnectionId,
    ) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        if inner.players.contains_key(&player_id) {
            return Err(RegistryError::PlayerAlreadyConnected(player_id));
        }
        inner.players.insert(player_id, conn);
        log::info!("player {player_id} channel {conn} registered");
        Ok(())
    }

    /// Remove the player's registration unconditionally. Idempotent.
    pub fn unregister_player(&self, player_id: PlayerId) {
        self.lock().players.remove(&player_id);
    }

    /// Remove the player's registration only if it still holds `conn`.
    pub fn unregister_player_if(&self, player_id: PlayerId, conn: ConnectionId) {
        let mut inner = self.lock();
        if inner.players.get(&player_id) == Some(&conn) {
            inner.players.remove(&player_id);
            log::info!("player {player_id} channel {conn} unregistered");
        }
    }

    pub fn is_player_connected(&self, player_id: PlayerId) -> bool {
        self.lock().players.contains_key(&player_id)
    }

    /// The channel currently registered for `player_id`, if any.
    pub fn player_connection(&self, player_id: PlayerId) -> Option<ConnectionId> {
        self.lock().players.get(&player_id).copied()
    }

    /// Number of connected players.
    pub fn connected_player_count(&self) -> usize {
        self.lock().players.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        // The mutex only guards plain map/option updates; a poisoned lock
        // means a panic mid-update, which cannot happen here.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
