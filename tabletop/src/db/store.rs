//! Persistent store for the singleton game-state row.
//!
//! The trait keeps the state machine testable without a live database; the
//! Postgres implementation wraps every multi-statement write (the state row
//! plus its ordered player-association rows) in one transaction so a
//! mutation is applied all-or-nothing.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::game::{GameResult, GameState, GAME_STATE_ID};
use crate::players::PlayerId;

/// Transactional storage for the singleton [`GameState`].
#[async_trait]
pub trait GameStateStore: Send + Sync {
    /// Load the current state, or `None` if the session is uninitialized.
    async fn load(&self) -> GameResult<Option<GameState>>;

    /// Insert the freshly initialized state.
    async fn create(&self, state: &GameState) -> GameResult<()>;

    /// Replace the persisted state with `state`, atomically.
    async fn update(&self, state: &GameState) -> GameResult<()>;

    /// Remove the state row and its order rows.
    async fn delete(&self) -> GameResult<()>;
}

/// Default PostgreSQL implementation of [`GameStateStore`]
pub struct PgGameStateStore {
    pool: PgPool,
}

impl PgGameStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_order_rows(
        tx: &mut sqlx::PgTransaction<'_>,
        order: &[PlayerId],
    ) -> Result<(), sqlx::Error> {
        for (position, player_id) in order.iter().enumerate() {
            sqlx::query(
                "INSERT INTO game_state_order (game_state_id, position, player_id) \
                 VALUES ($1, $2, $3)",
            )
            .bind(GAME_STATE_ID)
            .bind(position as i64)
            .bind(player_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl GameStateStore for PgGameStateStore {
    async fn load(&self) -> GameResult<Option<GameState>> {
        let row = sqlx::query(
            "SELECT id, round_number, current_player_index, notes, hidden_notes \
             FROM game_state WHERE id = $1",
        )
        .bind(GAME_STATE_ID)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order_rows = sqlx::query(
            "SELECT player_id FROM game_state_order WHERE game_state_id = $1 ORDER BY position",
        )
        .bind(GAME_STATE_ID)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(GameState {
            id: row.get("id"),
            player_order: order_rows.iter().map(|r| r.get("player_id")).collect(),
            current_player_index: row.get::<i64, _>("current_player_index") as usize,
            round_number: row.get("round_number"),
            notes: row.get("notes"),
            hidden_notes: row.get("hidden_notes"),
        }))
    }

    async fn create(&self, state: &GameState) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO game_state (id, round_number, current_player_index, notes, hidden_notes) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(state.id)
        .bind(state.round_number)
        .bind(state.current_player_index as i64)
        .bind(&state.notes)
        .bind(&state.hidden_notes)
        .execute(&mut *tx)
        .await?;

        Self::insert_order_rows(&mut tx, &state.player_order).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, state: &GameState) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE game_state \
             SET round_number = $2, current_player_index = $3, notes = $4, hidden_notes = $5 \
             WHERE id = $1",
        )
        .bind(state.id)
        .bind(state.round_number)
        .bind(state.current_player_index as i64)
        .bind(&state.notes)
        .bind(&state.hidden_notes)
        .execute(&mut *tx)
        .await?;

        // Rewrite the order wholesale; positions are dense and explicit.
        sqlx::query("DELETE FROM game_state_order WHERE game_state_id = $1")
            .bind(GAME_STATE_ID)
            .execute(&mut *tx)
            .await?;
        Self::insert_order_rows(&mut tx, &state.player_order).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM game_state_order WHERE game_state_id = $1")
            .bind(GAME_STATE_ID)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM game_state WHERE id = $1")
            .bind(GAME_STATE_ID)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
