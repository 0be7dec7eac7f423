use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use whatif_domain::Player;

use crate::infrastructure::ports::{CredentialError, TokenClaims, TokenIssuer};

/// HS256 session tokens: `sub` is the player ID.
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, player: &Player, now: DateTime<Utc>) -> Result<String, CredentialError> {
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|e| CredentialError::Issue(e.to_string()))?;
        let claims = TokenClaims {
            sub: player.id().to_string(),
            username: player.username().to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + ttl,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Issue(e.to_string()))
    }

    /// Checks signature and expiry against the wall clock.
    fn verify(&self, token: &str) -> Result<TokenClaims, CredentialError> {
        decode::<TokenClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| CredentialError::InvalidToken(e.to_string()))
    }
}
