//! Domain model for the What If life-simulation game.
//!
//! Pure types and rules: no I/O, no clock, no randomness. Callers pass `now`
//! and random rolls in explicitly, which keeps every rule deterministic under
//! test.

pub mod common;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    Choice, Event, EventDraft, EventRecord, EventSource, EventType, EventUpdate, Player,
    PlayerDraft, PlayerRecord, PlayerUpdate, Prerequisites, StatEffect,
};
pub use error::DomainError;
pub use ids::{EventId, PlayerId};
pub use value_objects::{
    AgeRange, BranchWeight, Email, EventCode, EventDescription, EventTitle, RarityFactor,
    RunStats, Username,
};
