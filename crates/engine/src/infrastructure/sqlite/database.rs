//! Connection pool handle and schema.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::parse_timestamp;
use crate::infrastructure::config::DatabaseConfig;
use crate::infrastructure::ports::RepoError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT,
        password_hash TEXT,
        created_at TEXT NOT NULL,
        last_login TEXT,
        is_active INTEGER NOT NULL DEFAULT 1
    )
    "#,
    // Usernames only need to be unique among active players.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_players_active_username
        ON players (username) WHERE is_active = 1
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_players_created_at ON players (created_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        event_code TEXT NOT NULL UNIQUE,
        event_type TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        min_age INTEGER NOT NULL,
        max_age INTEGER NOT NULL,
        prerequisites TEXT,
        choices TEXT NOT NULL,
        tags TEXT NOT NULL,
        branch_weight REAL NOT NULL,
        rarity_factor REAL NOT NULL,
        source TEXT NOT NULL,
        ai_signature_hash TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    "#,
];

/// Pool occupancy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

/// Shared SQLite pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepoError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| RepoError::database("connect", e))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        tracing::info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Connected to database"
        );

        Ok(Self { pool })
    }

    /// A private in-memory database with the schema applied.
    ///
    /// Pinned to one connection that never idles out; each SQLite in-memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self, RepoError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepoError> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::database("ensure_schema", e))?;
        }
        tracing::debug!("Database schema ensured");
        Ok(())
    }

    /// Round-trip to the database, returning its clock.
    pub async fn ping(&self) -> Result<DateTime<Utc>, RepoError> {
        let raw: String = sqlx::query_scalar("SELECT strftime('%Y-%m-%dT%H:%M:%fZ', 'now')")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("ping", e))?;
        parse_timestamp(&raw)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    /// Wait for checked-out connections and close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_database_answers_ping() {
        let db = Database::in_memory().await.unwrap();
        let now = db.ping().await.unwrap();
        assert!((Utc::now() - now).num_seconds().abs() < 60);
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.ensure_schema().await.unwrap();
        db.ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn pool_stats_reflect_single_connection() {
        let db = Database::in_memory().await.unwrap();
        let stats = db.pool_stats();
        assert_eq!(stats.size, 1);
        assert!(stats.idle <= 1);
    }

    #[tokio::test]
    async fn connect_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whatif.db");
        let config = DatabaseConfig {
            url: format!("sqlite:{}", path.display()),
            ..DatabaseConfig::default()
        };

        let db = Database::connect(&config).await.unwrap();
        db.ensure_schema().await.unwrap();
        db.ping().await.unwrap();
        db.close().await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn ping_fails_after_close() {
        let db = Database::in_memory().await.unwrap();
        db.close().await;
        assert!(db.ping().await.is_err());
    }
}
