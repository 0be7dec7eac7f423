//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Database access (SQLite today)
//! - Credentials (password hashing, session tokens)
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{CredentialError, RepoError};
pub use external::{PasswordHasherPort, TokenClaims, TokenIssuer};
pub use repos::{EventRepo, PlayerRepo};
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use external::{MockPasswordHasherPort, MockTokenIssuer};
#[cfg(test)]
pub use repos::{MockEventRepo, MockPlayerRepo};
#[cfg(test)]
pub use testing::MockClockPort;
