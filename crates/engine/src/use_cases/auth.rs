//! Account registration, login and profile lookup.

use std::sync::Arc;

use serde::Deserialize;
use whatif_domain::{DomainError, Player, PlayerId};

use crate::infrastructure::ports::{
    ClockPort, CredentialError, PasswordHasherPort, PlayerRepo, RepoError, TokenIssuer,
};

const MIN_USERNAME_LENGTH: usize = 3;
const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("User not found")]
    NotFound,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

/// Container for auth use cases.
pub struct AuthUseCases {
    pub register: Register,
    pub login: Login,
    pub profile: Profile,
}

impl AuthUseCases {
    pub fn new(register: Register, login: Login, profile: Profile) -> Self {
        Self {
            register,
            login,
            profile,
        }
    }
}

// =============================================================================
// Register
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterInput {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

pub struct Register {
    players: Arc<dyn PlayerRepo>,
    hasher: Arc<dyn PasswordHasherPort>,
    clock: Arc<dyn ClockPort>,
}

impl Register {
    pub fn new(
        players: Arc<dyn PlayerRepo>,
        hasher: Arc<dyn PasswordHasherPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            players,
            hasher,
            clock,
        }
    }

    /// Create an account with a password.
    ///
    /// Form checks run first (required fields, lengths, confirmation), then
    /// the player's own validation, then the uniqueness check.
    pub async fn execute(&self, input: RegisterInput) -> Result<Player, AuthError> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Username and password are required".into(),
            ));
        }
        if input.username.chars().count() < MIN_USERNAME_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "Username must be at least {MIN_USERNAME_LENGTH} characters"
            )));
        }
        if input.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if input.password != input.confirm_password {
            return Err(AuthError::InvalidInput("Passwords do not match".into()));
        }

        let player = Player::create(input.username, input.email, self.clock.now())?;

        if !self.players.is_username_available(player.username()).await? {
            return Err(AuthError::UsernameTaken);
        }

        let hash = self.hasher.hash(&input.password)?;
        match self.players.create(&player, Some(hash)).await {
            Ok(()) => {}
            Err(e) if e.is_constraint() => return Err(AuthError::UsernameTaken),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(player_id = %player.id(), username = %player.username(), "Player registered");
        Ok(player)
    }
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub player: Player,
    pub token: String,
}

pub struct Login {
    players: Arc<dyn PlayerRepo>,
    hasher: Arc<dyn PasswordHasherPort>,
    tokens: Arc<dyn TokenIssuer>,
    clock: Arc<dyn ClockPort>,
}

impl Login {
    pub fn new(
        players: Arc<dyn PlayerRepo>,
        hasher: Arc<dyn PasswordHasherPort>,
        tokens: Arc<dyn TokenIssuer>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            players,
            hasher,
            tokens,
            clock,
        }
    }

    /// Verify credentials of an active player and issue a session token.
    ///
    /// Unknown user and wrong password produce the same error.
    pub async fn execute(&self, input: LoginInput) -> Result<LoginResult, AuthError> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Username and password are required".into(),
            ));
        }

        let Some((mut player, hash)) = self.players.credentials_for(&input.username).await? else {
            tracing::debug!(username = %input.username, "Login for unknown or inactive player");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&input.password, &hash)? {
            tracing::debug!(player_id = %player.id(), "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let token = self.tokens.issue(&player, now)?;
        player.update_last_login(now);
        self.players.touch_last_login(player.id(), now).await?;

        tracing::info!(player_id = %player.id(), "Player logged in");
        Ok(LoginResult { player, token })
    }
}

// =============================================================================
// Profile
// =============================================================================

pub struct Profile {
    players: Arc<dyn PlayerRepo>,
    tokens: Arc<dyn TokenIssuer>,
}

impl Profile {
    pub fn new(players: Arc<dyn PlayerRepo>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { players, tokens }
    }

    /// Active player by ID.
    pub async fn execute(&self, id: &PlayerId) -> Result<Player, AuthError> {
        match self.players.get(id).await? {
            Some(player) if player.is_active() => Ok(player),
            _ => Err(AuthError::NotFound),
        }
    }

    /// Active player named by a session token.
    pub async fn for_token(&self, token: &str) -> Result<Player, AuthError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AuthError::InvalidCredentials
        })?;
        self.execute(&PlayerId::from_string(claims.sub)).await
    }
}
