//! Value objects - Immutable objects defined by their attributes

mod names;
mod run_stats;
mod weights;

pub use names::{Email, EventCode, EventDescription, EventTitle, Username};
pub use run_stats::RunStats;
pub use weights::{
    AgeRange, BranchWeight, RarityFactor, COMMON_THRESHOLD, MAX_AGE, MIN_AGE, RARE_THRESHOLD,
};
