//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    auth::{Argon2PasswordHasher, JwtTokenIssuer},
    clock::{SystemClock, SystemRandom},
    config::EngineConfig,
    ports::{ClockPort, EventRepo, PasswordHasherPort, PlayerRepo, RandomPort, TokenIssuer},
    sqlite::{Database, SqliteEventRepo, SqlitePlayerRepo},
};
use crate::use_cases;

/// Main application state.
///
/// Holds the database handle and every use case.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub db: Database,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub auth: use_cases::AuthUseCases,
    pub players: use_cases::PlayerOps,
    pub events: use_cases::EventOps,
}

impl App {
    /// Create a new App backed by `db`, with all dependencies wired up.
    pub fn new(db: Database, config: &EngineConfig) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
        let random: Arc<dyn RandomPort> = Arc::new(SystemRandom);
        let hasher: Arc<dyn PasswordHasherPort> = Arc::new(Argon2PasswordHasher::new());
        let tokens: Arc<dyn TokenIssuer> =
            Arc::new(JwtTokenIssuer::new(&config.jwt_secret, config.jwt_ttl));

        let player_repo: Arc<dyn PlayerRepo> = Arc::new(SqlitePlayerRepo::new(db.clone()));
        let event_repo: Arc<dyn EventRepo> = Arc::new(SqliteEventRepo::new(db.clone()));

        let auth = use_cases::AuthUseCases::new(
            use_cases::Register::new(player_repo.clone(), hasher.clone(), clock.clone()),
            use_cases::Login::new(
                player_repo.clone(),
                hasher,
                tokens.clone(),
                clock.clone(),
            ),
            use_cases::Profile::new(player_repo.clone(), tokens),
        );
        let players = use_cases::PlayerOps::new(player_repo, clock.clone());
        let events = use_cases::EventOps::new(event_repo, clock, random);

        Self {
            db,
            use_cases: UseCases {
                auth,
                players,
                events,
            },
        }
    }
}
