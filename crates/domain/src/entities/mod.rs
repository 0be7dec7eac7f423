//! Domain entities - Core business objects with identity

mod event;
mod player;

pub use event::{
    Choice, Event, EventDraft, EventRecord, EventSource, EventType, EventUpdate, Prerequisites,
    StatEffect,
};
pub use player::{Player, PlayerDraft, PlayerRecord, PlayerUpdate};
