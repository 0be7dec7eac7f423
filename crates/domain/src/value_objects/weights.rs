//! Numeric value objects: age gating and selection weights

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

pub const MIN_AGE: i32 = 0;
pub const MAX_AGE: i32 = 120;

const BRANCH_WEIGHT_MIN: f64 = 0.0;
const BRANCH_WEIGHT_MAX: f64 = 10.0;
const RARITY_FACTOR_MIN: f64 = 0.1;
const RARITY_FACTOR_MAX: f64 = 10.0;

/// Rarity above this marks an event as rare.
pub const RARE_THRESHOLD: f64 = 2.0;
/// Rarity below this marks an event as common.
pub const COMMON_THRESHOLD: f64 = 0.5;

// ============================================================================
// AgeRange
// ============================================================================

/// Inclusive age window in which an event may trigger.
///
/// # Invariants
///
/// - `0 <= min <= max <= 120`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgeRange {
    min: i32,
    max: i32,
}

impl AgeRange {
    /// # Errors
    ///
    /// The bounds rule is checked before the ordering rule, so `(-1, -5)`
    /// reports the bounds message.
    pub fn new(min: i32, max: i32) -> Result<Self, DomainError> {
        if min < MIN_AGE || max > MAX_AGE {
            return Err(DomainError::validation(format!(
                "Age range must be between {} and {}",
                MIN_AGE, MAX_AGE
            )));
        }
        if min > max {
            return Err(DomainError::validation(
                "Min age cannot be greater than max age",
            ));
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> i32 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn contains(&self, age: i32) -> bool {
        age >= self.min && age <= self.max
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

// ============================================================================
// BranchWeight / RarityFactor
// ============================================================================

macro_rules! bounded_f64 {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr, $msg:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            /// # Errors
            ///
            /// Returns `DomainError::Validation` when the value is outside the
            /// inclusive range or is NaN.
            pub fn new(value: f64) -> Result<Self, DomainError> {
                if !($min..=$max).contains(&value) {
                    return Err(DomainError::validation($msg));
                }
                Ok(Self(value))
            }

            #[inline]
            pub fn value(&self) -> f64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(1.0)
            }
        }

        impl TryFrom<f64> for $name {
            type Error = DomainError;

            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> f64 {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

bounded_f64!(
    /// Relative likelihood multiplier of an event's narrative branch, in [0.0, 10.0].
    BranchWeight,
    BRANCH_WEIGHT_MIN,
    BRANCH_WEIGHT_MAX,
    "Branch weight must be between 0.0 and 10.0"
);

bounded_f64!(
    /// Relative scarcity multiplier of an event, in [0.1, 10.0].
    RarityFactor,
    RARITY_FACTOR_MIN,
    RARITY_FACTOR_MAX,
    "Rarity factor must be between 0.1 and 10.0"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_range_accepts_full_span_and_single_age() {
        let range = AgeRange::new(0, 120).unwrap();
        assert!(range.contains(0));
        assert!(range.contains(120));

        let single = AgeRange::new(18, 18).unwrap();
        assert_eq!((single.min(), single.max()), (18, 18));
        assert!(!single.contains(17));
    }

    #[test]
    fn age_range_rejects_inverted_window() {
        let err = AgeRange::new(20, 10).unwrap_err();
        assert_eq!(
            err.validation_message(),
            Some("Min age cannot be greater than max age")
        );
    }

    #[test]
    fn age_range_rejects_out_of_bounds_first() {
        for (min, max) in [(-1, 10), (0, 121), (-1, -5)] {
            assert_eq!(
                AgeRange::new(min, max).unwrap_err().validation_message(),
                Some("Age range must be between 0 and 120")
            );
        }
    }

    #[test]
    fn branch_weight_bounds_are_inclusive() {
        assert!(BranchWeight::new(0.0).is_ok());
        assert!(BranchWeight::new(10.0).is_ok());
        assert!(BranchWeight::new(-0.01).is_err());
        assert!(BranchWeight::new(10.01).is_err());
        assert!(BranchWeight::new(f64::NAN).is_err());
    }

    #[test]
    fn rarity_factor_bounds_are_inclusive() {
        assert!(RarityFactor::new(0.1).is_ok());
        assert!(RarityFactor::new(10.0).is_ok());
        assert_eq!(
            RarityFactor::new(0.0).unwrap_err().validation_message(),
            Some("Rarity factor must be between 0.1 and 10.0")
        );
    }

    #[test]
    fn weights_deserialize_through_validation() {
        assert_eq!(
            serde_json::from_str::<BranchWeight>("0.8").unwrap().value(),
            0.8
        );
        assert!(serde_json::from_str::<RarityFactor>("11.0").is_err());
    }
}
