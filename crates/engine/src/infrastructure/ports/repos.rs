//! Repository port traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use whatif_domain::{Event, EventCode, Player, PlayerId};

use super::RepoError;

/// Player storage.
///
/// `get` sees every player. The other lookups and listings only see active
/// players, so a deactivated account disappears from search and login but
/// can still be reactivated by ID.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepo: Send + Sync {
    /// Insert a new player. A taken username yields `ConstraintViolation`.
    async fn create(
        &self,
        player: &Player,
        password_hash: Option<String>,
    ) -> Result<(), RepoError>;
    async fn get(&self, id: &PlayerId) -> Result<Option<Player>, RepoError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<Player>, RepoError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<Player>, RepoError>;
    /// Persist username, email, last login and active flag of an existing player.
    async fn update(&self, player: &Player) -> Result<(), RepoError>;
    /// Returns `false` when no player has this ID.
    async fn set_active(&self, id: &PlayerId, is_active: bool) -> Result<bool, RepoError>;
    /// Returns `false` when no player has this ID.
    async fn touch_last_login(
        &self,
        id: &PlayerId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError>;
    async fn is_username_available(&self, username: &str) -> Result<bool, RepoError>;
    /// Newest first.
    async fn list_active(&self, limit: u32, offset: u32) -> Result<Vec<Player>, RepoError>;
    /// Case-insensitive substring match, ordered by username.
    async fn search_by_username(
        &self,
        pattern: &str,
        limit: u32,
    ) -> Result<Vec<Player>, RepoError>;
    async fn count_active(&self) -> Result<u64, RepoError>;
    /// Active player and stored password hash, if both exist.
    async fn credentials_for(
        &self,
        username: &str,
    ) -> Result<Option<(Player, String)>, RepoError>;
}

/// Event storage, keyed by the business code (`evt_...`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepo: Send + Sync {
    /// Insert or replace by event code.
    async fn save(&self, event: &Event) -> Result<(), RepoError>;
    async fn get_by_code(&self, code: &EventCode) -> Result<Option<Event>, RepoError>;
    async fn list_active(&self) -> Result<Vec<Event>, RepoError>;
}
