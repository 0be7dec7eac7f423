//! Credential ports: password hashing and session tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use whatif_domain::Player;

use super::CredentialError;

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasherPort: Send + Sync {
    /// Hash `password` into a self-describing string (algorithm, salt, digest).
    fn hash(&self, password: &str) -> Result<String, CredentialError>;
    /// Check `password` against a hash produced by [`PasswordHasherPort::hash`].
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError>;
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Player ID.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, player: &Player, now: DateTime<Utc>) -> Result<String, CredentialError>;
    fn verify(&self, token: &str) -> Result<TokenClaims, CredentialError>;
}
