//! Use cases - User story orchestration.
//!
//! Each module owns one area of the game and talks to the outside world
//! only through the port traits in `infrastructure::ports`.

pub mod auth;
pub mod events;
pub mod players;

pub use auth::{AuthError, AuthUseCases, Login, Profile, Register};
pub use events::{ChoiceOutcome, CreateEventInput, EventError, EventOps};
pub use players::{PlayerError, PlayerOps};
