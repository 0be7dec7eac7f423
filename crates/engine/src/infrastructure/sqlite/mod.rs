//! SQLite persistence.
//!
//! One [`Database`] handle is built at startup and shared by the repositories.
//! Timestamps are stored as fixed-width RFC 3339 text so `ORDER BY` on them is
//! chronological; nested event data (choices, tags, prerequisites) is JSON text.

mod database;
mod events;
mod players;

pub use database::{Database, PoolStats};
pub use events::SqliteEventRepo;
pub use players::SqlitePlayerRepo;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::infrastructure::ports::RepoError;

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    whatif_domain::common::parse_datetime(raw).map_err(RepoError::serialization)
}

/// Map a write error, surfacing unique-index hits as constraint violations.
fn write_error(operation: &'static str, error: sqlx::Error) -> RepoError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::constraint(db.message())
        }
        _ => RepoError::database(operation, error),
    }
}
