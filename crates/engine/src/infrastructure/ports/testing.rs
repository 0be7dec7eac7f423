//! Time and randomness, behind ports so tests can pin them.

use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Integer in the inclusive range `[min, max]`.
    fn gen_range(&self, min: i32, max: i32) -> i32;
    /// Float in `[0.0, 1.0)`.
    fn gen_unit(&self) -> f64;
}
