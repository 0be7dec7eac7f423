//! SQLite-backed player storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use whatif_domain::{Player, PlayerId, PlayerRecord};

use super::{parse_timestamp, timestamp, write_error, Database};
use crate::infrastructure::ports::{PlayerRepo, RepoError};

const PLAYER_COLUMNS: &str = "id, username, email, created_at, last_login, is_active";

pub struct SqlitePlayerRepo {
    db: Database,
}

impl SqlitePlayerRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn fetch_one_where(
        &self,
        operation: &'static str,
        condition: &str,
        value: &str,
    ) -> Result<Option<Player>, RepoError> {
        let query = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE {condition}");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| RepoError::database(operation, e))?;

        row.as_ref().map(row_to_player).transpose()
    }
}

fn row_to_player(row: &SqliteRow) -> Result<Player, RepoError> {
    let read = |e: sqlx::Error| RepoError::serialization(format!("players row: {e}"));

    let id: String = row.try_get("id").map_err(read)?;
    let created_at: String = row.try_get("created_at").map_err(read)?;
    let last_login: Option<String> = row.try_get("last_login").map_err(read)?;

    let record = PlayerRecord {
        id: PlayerId::from_string(id.clone()),
        username: row.try_get("username").map_err(read)?,
        email: row.try_get("email").map_err(read)?,
        created_at: parse_timestamp(&created_at)?,
        last_login: last_login.as_deref().map(parse_timestamp).transpose()?,
        is_active: row.try_get("is_active").map_err(read)?,
    };

    Player::from_data(record)
        .map_err(|e| RepoError::serialization(format!("player {id} failed validation: {e}")))
}

/// Escape LIKE wildcards so the pattern matches literally.
fn like_pattern(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() + 2);
    escaped.push('%');
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PlayerRepo for SqlitePlayerRepo {
    async fn create(
        &self,
        player: &Player,
        password_hash: Option<String>,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO players (id, username, email, password_hash, created_at, last_login, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(player.id().as_str())
        .bind(player.username())
        .bind(player.email())
        .bind(password_hash)
        .bind(timestamp(player.created_at()))
        .bind(player.last_login().map(timestamp))
        .bind(player.is_active())
        .execute(self.db.pool())
        .await
        .map_err(|e| write_error("players.create", e))?;

        Ok(())
    }

    async fn get(&self, id: &PlayerId) -> Result<Option<Player>, RepoError> {
        self.fetch_one_where("players.get", "id = ?", id.as_str())
            .await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Player>, RepoError> {
        self.fetch_one_where(
            "players.get_by_username",
            "username = ? AND is_active = 1",
            username,
        )
        .await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Player>, RepoError> {
        self.fetch_one_where(
            "players.get_by_email",
            "email = ? AND is_active = 1",
            email,
        )
        .await
    }

    async fn update(&self, player: &Player) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE players
            SET username = ?, email = ?, last_login = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(player.username())
        .bind(player.email())
        .bind(player.last_login().map(timestamp))
        .bind(player.is_active())
        .bind(player.id().as_str())
        .execute(self.db.pool())
        .await
        .map_err(|e| write_error("players.update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Player", player.id()));
        }
        Ok(())
    }

    async fn set_active(&self, id: &PlayerId, is_active: bool) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE players SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id.as_str())
            .execute(self.db.pool())
            .await
            .map_err(|e| write_error("players.set_active", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_login(
        &self,
        id: &PlayerId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE players SET last_login = ? WHERE id = ?")
            .bind(timestamp(at))
            .bind(id.as_str())
            .execute(self.db.pool())
            .await
            .map_err(|e| RepoError::database("players.touch_last_login", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_username_available(&self, username: &str) -> Result<bool, RepoError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM players WHERE username = ? AND is_active = 1",
        )
        .bind(username)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| RepoError::database("players.is_username_available", e))?;
        Ok(count == 0)
    }

    async fn list_active(&self, limit: u32, offset: u32) -> Result<Vec<Player>, RepoError> {
        let query = format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE is_active = 1 \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&query)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| RepoError::database("players.list_active", e))?;

        rows.iter().map(row_to_player).collect()
    }

    async fn search_by_username(
        &self,
        pattern: &str,
        limit: u32,
    ) -> Result<Vec<Player>, RepoError> {
        let query = format!(
            "SELECT {PLAYER_COLUMNS} FROM players \
             WHERE username LIKE ? ESCAPE '\\' AND is_active = 1 \
             ORDER BY username LIMIT ?"
        );
        let rows = sqlx::query(&query)
            .bind(like_pattern(pattern))
            .bind(i64::from(limit))
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| RepoError::database("players.search_by_username", e))?;

        rows.iter().map(row_to_player).collect()
    }

    async fn count_active(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players WHERE is_active = 1")
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| RepoError::database("players.count_active", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn credentials_for(
        &self,
        username: &str,
    ) -> Result<Option<(Player, String)>, RepoError> {
        let query = format!(
            "SELECT {PLAYER_COLUMNS}, password_hash FROM players \
             WHERE username = ? AND is_active = 1 AND password_hash IS NOT NULL"
        );
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| RepoError::database("players.credentials_for", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let hash: String = row
            .try_get("password_hash")
            .map_err(|e| RepoError::serialization(format!("players row: {e}")))?;
        Ok(Some((row_to_player(&row)?, hash)))
    }
}
