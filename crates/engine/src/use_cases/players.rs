//! Player account management.

use std::sync::Arc;

use whatif_domain::{DomainError, Player, PlayerId, PlayerUpdate};

use crate::infrastructure::ports::{ClockPort, PlayerRepo, RepoError};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Player not found: {0}")]
    NotFound(PlayerId),
    #[error("Username already exists")]
    UsernameTaken,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Player operations.
///
/// Reads through this type see only active players, matching what the rest
/// of the game is allowed to see; deactivate/reactivate address any player
/// by ID.
pub struct PlayerOps {
    repo: Arc<dyn PlayerRepo>,
    clock: Arc<dyn ClockPort>,
}

impl PlayerOps {
    pub fn new(repo: Arc<dyn PlayerRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { repo, clock }
    }

    /// Create a player without a password.
    pub async fn create_player(
        &self,
        username: String,
        email: Option<String>,
    ) -> Result<Player, PlayerError> {
        let player = Player::create(username, email, self.clock.now())?;

        if !self.repo.is_username_available(player.username()).await? {
            return Err(PlayerError::UsernameTaken);
        }
        self.repo
            .create(&player, None)
            .await
            .map_err(conflict_as_taken)?;

        tracing::info!(player_id = %player.id(), username = %player.username(), "Player created");
        Ok(player)
    }

    pub async fn get_player_by_id(&self, id: &PlayerId) -> Result<Option<Player>, PlayerError> {
        Ok(self.repo.get(id).await?.filter(Player::is_active))
    }

    pub async fn get_player_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Player>, PlayerError> {
        Ok(self.repo.get_by_username(username).await?)
    }

    /// Apply `update` to an active player. The merged player is validated as
    /// a whole before anything is written.
    pub async fn update_player(
        &self,
        id: &PlayerId,
        update: PlayerUpdate,
    ) -> Result<Player, PlayerError> {
        let current = self
            .get_player_by_id(id)
            .await?
            .ok_or_else(|| PlayerError::NotFound(id.clone()))?;

        let updated = current.clone_with(update)?;

        if updated.username() != current.username()
            && updated.is_active()
            && !self.repo.is_username_available(updated.username()).await?
        {
            return Err(PlayerError::UsernameTaken);
        }

        self.repo
            .update(&updated)
            .await
            .map_err(conflict_as_taken)?;

        tracing::info!(player_id = %id, "Player updated");
        Ok(updated)
    }

    /// Returns `false` when no player has this ID.
    pub async fn deactivate_player(&self, id: &PlayerId) -> Result<bool, PlayerError> {
        let changed = self.repo.set_active(id, false).await?;
        if changed {
            tracing::info!(player_id = %id, "Player deactivated");
        }
        Ok(changed)
    }

    /// Returns `false` when no player has this ID. Fails with
    /// `UsernameTaken` if another active player took the name meanwhile.
    pub async fn reactivate_player(&self, id: &PlayerId) -> Result<bool, PlayerError> {
        let changed = self
            .repo
            .set_active(id, true)
            .await
            .map_err(conflict_as_taken)?;
        if changed {
            tracing::info!(player_id = %id, "Player reactivated");
        }
        Ok(changed)
    }

    /// Stamp the last login with the current time. Inactive or unknown
    /// players are left alone and yield `false`.
    pub async fn update_last_login(&self, id: &PlayerId) -> Result<bool, PlayerError> {
        if self.get_player_by_id(id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.repo.touch_last_login(id, self.clock.now()).await?)
    }

    pub async fn is_username_available(&self, username: &str) -> Result<bool, PlayerError> {
        Ok(self.repo.is_username_available(username).await?)
    }

    /// Newest first. `limit` is capped at [`MAX_PAGE_SIZE`].
    pub async fn get_active_players(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Player>, PlayerError> {
        Ok(self
            .repo
            .list_active(limit.min(MAX_PAGE_SIZE), offset)
            .await?)
    }

    /// Case-insensitive substring search. `limit` is capped at [`MAX_PAGE_SIZE`].
    pub async fn search_players_by_username(
        &self,
        pattern: &str,
        limit: u32,
    ) -> Result<Vec<Player>, PlayerError> {
        Ok(self
            .repo
            .search_by_username(pattern, limit.min(MAX_PAGE_SIZE))
            .await?)
    }

    pub async fn active_player_count(&self) -> Result<u64, PlayerError> {
        Ok(self.repo.count_active().await?)
    }
}

fn conflict_as_taken(error: RepoError) -> PlayerError {
    if error.is_constraint() {
        PlayerError::UsernameTaken
    } else {
        PlayerError::Repo(error)
    }
}
