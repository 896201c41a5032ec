//! Database module providing PostgreSQL connection pooling and the
//! persistent game-state store.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod store;

pub use config::DatabaseConfig;
pub use store::{GameStateStore, PgGameStateStore};

/// Schema bootstrap, applied idempotently at startup.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS players (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        secret TEXT NOT NULL,
        notes TEXT NOT NULL DEFAULT '',
        hidden_notes TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMP NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS player_stats (
        id BIGSERIAL PRIMARY KEY,
        player_id BIGINT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        value_type TEXT NOT NULL,
        value TEXT NOT NULL,
        UNIQUE (player_id, name)
    )",
    "CREATE TABLE IF NOT EXISTS game_state (
        id BIGINT PRIMARY KEY,
        round_number BIGINT NOT NULL,
        current_player_index BIGINT NOT NULL,
        notes TEXT NOT NULL DEFAULT '',
        hidden_notes TEXT NOT NULL DEFAULT ''
    )",
    // No foreign key on player_id: membership consistency is enforced by the
    // state machine at mutation time, and player deletion is compensated by
    // a membership sync rather than a cascade that would bypass the
    // index-shift rule.
    "CREATE TABLE IF NOT EXISTS game_state_order (
        game_state_id BIGINT NOT NULL REFERENCES game_state(id) ON DELETE CASCADE,
        position BIGINT NOT NULL,
        player_id BIGINT NOT NULL,
        PRIMARY KEY (game_state_id, position)
    )",
];

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the schema. Safe to run on every startup.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
