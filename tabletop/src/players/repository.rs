//! Player directory trait and its PostgreSQL implementation.
//!
//! The trait carries only the read operations the session core consumes;
//! mock implementations stand in for the database in unit tests. The
//! Postgres repository additionally exposes the write operations used by
//! player management outside the core.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::errors::{PlayerError, PlayerResult};
use super::models::{Player, PlayerId, PlayerStat, StatValue};
use crate::auth::make_player_secret;

/// Read-only view of the player directory.
///
/// The core never writes through this interface.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Find a player by id
    async fn get_by_id(&self, id: PlayerId) -> PlayerResult<Option<Player>>;

    /// Resolve a display name to a player id
    async fn id_by_name(&self, name: &str) -> PlayerResult<Option<PlayerId>>;

    /// Resolve a player id to its display name
    async fn name_by_id(&self, id: PlayerId) -> PlayerResult<Option<String>>;

    /// All player ids currently in the directory
    async fn all_ids(&self) -> PlayerResult<HashSet<PlayerId>>;
}

/// Default PostgreSQL implementation of [`PlayerDirectory`], plus the
/// player-management writes.
pub struct PgPlayerRepository {
    pool: PgPool,
}

impl PgPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every player with their stats, ordered by name.
    pub async fn list_players(&self) -> PlayerResult<Vec<Player>> {
        let rows = sqlx::query(
            "SELECT id, name, secret, notes, hidden_notes, created_at FROM players ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut players = Vec::with_capacity(rows.len());
        for row in rows {
            players.push(self.player_from_row(&row).await?);
        }
        Ok(players)
    }

    /// Create a player with a freshly generated secret.
    pub async fn create_player(&self, name: &str) -> PlayerResult<Player> {
        let existing = sqlx::query("SELECT id FROM players WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(PlayerError::NameTaken);
        }

        let secret = make_player_secret();
        let row = sqlx::query(
            "INSERT INTO players (name, secret) VALUES ($1, $2) \
             RETURNING id, name, secret, notes, hidden_notes, created_at",
        )
        .bind(name)
        .bind(&secret)
        .fetch_one(&self.pool)
        .await?;

        self.player_from_row(&row).await
    }

    /// Delete a player and their stats.
    ///
    /// The caller is responsible for syncing the turn order afterwards; the
    /// directory knows nothing about the game state.
    pub async fn delete_player(&self, id: PlayerId) -> PlayerResult<()> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlayerError::NotFound);
        }
        Ok(())
    }

    async fn player_from_row(&self, row: &sqlx::postgres::PgRow) -> PlayerResult<Player> {
        let id: PlayerId = row.get("id");
        Ok(Player {
            id,
            name: row.get("name"),
            secret: row.get("secret"),
            notes: row.get("notes"),
            hidden_notes: row.get("hidden_notes"),
            stats: self.load_stats(id).await?,
            created_at: row
                .get::<chrono::NaiveDateTime, _>("created_at")
                .and_utc(),
        })
    }

    async fn load_stats(&self, player_id: PlayerId) -> PlayerResult<Vec<PlayerStat>> {
        let rows = sqlx::query(
            "SELECT id, name, value_type, value FROM player_stats \
             WHERE player_id = $1 ORDER BY id",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| PlayerStat {
                id: row.get("id"),
                name: row.get("name"),
                value: StatValue::decode(row.get("value_type"), row.get("value")),
            })
            .collect())
    }
}

#[async_trait]
impl PlayerDirectory for PgPlayerRepository {
    async fn get_by_id(&self, id: PlayerId) -> PlayerResult<Option<Player>> {
        let row = sqlx::query(
            "SELECT id, name, secret, notes, hidden_notes, created_at FROM players WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.player_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn id_by_name(&self, name: &str) -> PlayerResult<Option<PlayerId>> {
        let row = sqlx::query("SELECT id FROM players WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("id")))
    }

    async fn name_by_id(&self, id: PlayerId) -> PlayerResult<Option<String>> {
        let row = sqlx::query("SELECT name FROM players WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("name")))
    }

    async fn all_ids(&self) -> PlayerResult<HashSet<PlayerId>> {
        let rows = sqlx::query("SELECT id FROM players")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|r| r.get("id")).collect())
    }
}
