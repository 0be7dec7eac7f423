//! What If Engine library.
//!
//! Server-side code for the What If life-simulation game.
//!
//! ## Structure
//!
//! - `use_cases/` - Account, player and event flows
//! - `infrastructure/` - Ports plus their SQLite, auth, clock and config adapters
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
