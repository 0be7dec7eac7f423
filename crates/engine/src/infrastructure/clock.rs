//! Clock and random implementations.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// System clock - uses real time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fixed random for testing: `gen_range` returns the integer clamped into
/// range, `gen_unit` returns the float.
#[cfg(test)]
pub struct FixedRandom {
    pub int: i32,
    pub unit: f64,
}

#[cfg(test)]
impl FixedRandom {
    pub fn unit(unit: f64) -> Self {
        Self { int: 0, unit }
    }
}

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.int.clamp(min, max)
    }

    fn gen_unit(&self) -> f64 {
        self.unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_random_respects_bounds() {
        let random = SystemRandom;
        for _ in 0..100 {
            let n = random.gen_range(2, 4);
            assert!((2..=4).contains(&n));
            let u = random.gen_unit();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn system_random_single_value_range() {
        assert_eq!(SystemRandom.gen_range(7, 7), 7);
    }
}
