//! Turn-order session handler.
//!
//! `GameHandler` owns the read-modify-write cycle of every game-state
//! mutation: load the persisted state, apply the pure state-machine method,
//! persist the result, then broadcast a snapshot. A tokio mutex serializes
//! the writers; the process is the single writer of the state row, so the
//! lock is sufficient for atomicity of each cycle.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::Mutex;

use super::errors::{GameError, GameResult};
use super::state::{GameSnapshot, GameState, PlayerOrderEntry};
use crate::db::GameStateStore;
use crate::events::{EventBus, GameEvent};
use crate::players::{PlayerDirectory, PlayerId};

/// Coordinates game-state mutations, persistence, and change broadcasts.
pub struct GameHandler {
    store: Arc<dyn GameStateStore>,
    directory: Arc<dyn PlayerDirectory>,
    events: EventBus,
    /// Serializes every read-modify-write cycle.
    write_lock: Mutex<()>,
}

impl GameHandler {
    pub fn new(
        store: Arc<dyn GameStateStore>,
        directory: Arc<dyn PlayerDirectory>,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            directory,
            events,
            write_lock: Mutex::new(()),
        }
    }

    /// The bus this handler publishes change events on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Initialize the session with the given turn order.
    ///
    /// # Errors
    ///
    /// * `GameError::Conflict` - a game state already exists
    /// * `GameError::Validation` - `player_order` has duplicates or unknown ids
    pub async fn init(&self, player_order: Vec<PlayerId>) -> GameResult<GameSnapshot> {
        let _guard = self.write_lock.lock().await;

        if self.store.load().await?.is_some() {
            return Err(GameError::Conflict("game state already exists".to_string()));
        }
        self.validate_order(&player_order).await?;

        let state = GameState::new(player_order);
        self.store.create(&state).await?;
        info!("Game initialized with {} players", state.player_order.len());

        Ok(self.publish(&state).await?)
    }

    /// Current snapshot, or `None` when no session is initialized.
    pub async fn get(&self) -> GameResult<Option<GameSnapshot>> {
        match self.store.load().await? {
            Some(state) => Ok(Some(self.snapshot(&state).await?)),
            None => Ok(None),
        }
    }

    /// Move to the next player's turn.
    pub async fn advance_turn(&self) -> GameResult<GameSnapshot> {
        self.mutate(|state| {
            state.advance_turn();
            Ok(())
        })
        .await
    }

    /// Undo the most recent turn advancement.
    pub async fn revert_turn(&self) -> GameResult<GameSnapshot> {
        self.mutate(|state| {
            state.revert_turn();
            Ok(())
        })
        .await
    }

    /// Replace the turn order wholesale.
    ///
    /// # Errors
    ///
    /// * `GameError::Validation` - `player_order` has duplicates or unknown ids
    pub async fn update_player_order(
        &self,
        player_order: Vec<PlayerId>,
    ) -> GameResult<GameSnapshot> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.store.load().await?.ok_or_else(GameError::not_started)?;
        self.validate_order(&player_order).await?;

        state.set_player_order(player_order);
        self.store.update(&state).await?;
        Ok(self.publish(&state).await?)
    }

    /// Append a player to the end of the turn order.
    ///
    /// # Errors
    ///
    /// * `GameError::Conflict` - the player is already in the order
    /// * `GameError::Validation` - the id matches no player
    pub async fn add_player_to_order(&self, player_id: PlayerId) -> GameResult<GameSnapshot> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.store.load().await?.ok_or_else(GameError::not_started)?;
        if state.player_order.contains(&player_id) {
            return Err(GameError::Conflict(format!(
                "player {player_id} is already in the turn order"
            )));
        }
        if self.directory.name_by_id(player_id).await?.is_none() {
            return Err(GameError::Validation(format!(
                "player {player_id} does not exist"
            )));
        }

        state.player_order.push(player_id);
        self.store.update(&state).await?;
        Ok(self.publish(&state).await?)
    }

    /// Remove a player from the turn order.
    ///
    /// # Errors
    ///
    /// * `GameError::NotFound` - the player is not in the order
    pub async fn remove_player_from_order(&self, player_id: PlayerId) -> GameResult<GameSnapshot> {
        self.mutate(|state| {
            if !state.remove_from_order(player_id) {
                return Err(GameError::NotFound(format!(
                    "player {player_id} is not in the turn order"
                )));
            }
            Ok(())
        })
        .await
    }

    /// Replace the shared session notes.
    pub async fn update_notes(&self, notes: String) -> GameResult<GameSnapshot> {
        self.mutate(|state| {
            state.notes = notes;
            Ok(())
        })
        .await
    }

    /// Replace the GM-only session notes.
    pub async fn update_hidden_notes(&self, hidden_notes: String) -> GameResult<GameSnapshot> {
        self.mutate(|state| {
            state.hidden_notes = hidden_notes;
            Ok(())
        })
        .await
    }

    /// End the session, returning the system to uninitialized.
    pub async fn delete(&self) -> GameResult<()> {
        let _guard = self.write_lock.lock().await;

        if self.store.load().await?.is_none() {
            return Err(GameError::not_started());
        }
        self.store.delete().await?;
        info!("Game deleted");

        self.events.publish(GameEvent::GameStateChanged(None));
        Ok(())
    }

    /// Drop order entries whose players no longer exist in `existing`.
    ///
    /// A no-op when no session is initialized or nothing was removed; no
    /// write and no event happen in those cases.
    pub async fn sync_membership(&self, existing: &HashSet<PlayerId>) -> GameResult<()> {
        let _guard = self.write_lock.lock().await;

        let Some(mut state) = self.store.load().await? else {
            return Ok(());
        };

        let removed = state.retain_members(existing);
        if removed.is_empty() {
            return Ok(());
        }

        debug!("Turn order dropped departed players: {removed:?}");
        self.store.update(&state).await?;
        self.publish(&state).await?;
        Ok(())
    }

    /// Shared load-mutate-persist-publish cycle for order-preserving ops.
    async fn mutate<F>(&self, apply: F) -> GameResult<GameSnapshot>
    where
        F: FnOnce(&mut GameState) -> GameResult<()>,
    {
        let _guard = self.write_lock.lock().await;

        let mut state = self.store.load().await?.ok_or_else(GameError::not_started)?;
        apply(&mut state)?;
        self.store.update(&state).await?;
        self.publish(&state).await
    }

    /// Reject orders with duplicate ids or ids unknown to the directory.
    async fn validate_order(&self, player_order: &[PlayerId]) -> GameResult<()> {
        let mut seen = HashSet::with_capacity(player_order.len());
        for &id in player_order {
            if !seen.insert(id) {
                return Err(GameError::Validation(format!(
                    "duplicate player {id} in turn order"
                )));
            }
            if self.directory.name_by_id(id).await?.is_none() {
                return Err(GameError::Validation(format!("player {id} does not exist")));
            }
        }
        Ok(())
    }

    /// Build the client-facing snapshot, resolving names through the
    /// directory. A missing name (a deletion racing this read) falls back to
    /// a positional label instead of failing the whole mutation.
    async fn snapshot(&self, state: &GameState) -> GameResult<GameSnapshot> {
        let mut player_order = Vec::with_capacity(state.player_order.len());
        for (index, &id) in state.player_order.iter().enumerate() {
            let name = self
                .directory
                .name_by_id(id)
                .await?
                .unwrap_or_else(|| format!("Player {}", index + 1));
            player_order.push(PlayerOrderEntry { id, name });
        }

        Ok(GameSnapshot {
            id: state.id,
            current_player_index: state.current_player_index,
            round_number: state.round_number,
            player_order,
            notes: state.notes.clone(),
            hidden_notes: state.hidden_notes.clone(),
        })
    }

    async fn publish(&self, state: &GameState) -> GameResult<GameSnapshot> {
        let snapshot = self.snapshot(state).await?;
        self.events
            .publish(GameEvent::GameStateChanged(Some(snapshot.clone())));
        Ok(snapshot)
    }
}
