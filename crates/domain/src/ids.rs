use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the random alphanumeric suffix appended to generated IDs.
const ID_SUFFIX_LEN: usize = 9;

/// Builds `<prefix>_<unix millis>_<suffix>`.
///
/// The suffix is taken from a v4 UUID, so IDs are collision resistant in
/// practice without any uniqueness guarantee. Not for cryptographic use.
fn generate(prefix: &str, now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        prefix,
        now.timestamp_millis(),
        &random[..ID_SUFFIX_LEN]
    )
}

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh ID stamped with `now`.
            pub fn generate(now: DateTime<Utc>) -> Self {
                Self(generate($prefix, now))
            }

            /// Wraps an existing ID (used when loading from storage).
            pub fn from_string(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(EventId, "event");
define_id!(PlayerId, "player");

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_id_has_prefix_timestamp_and_suffix() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = EventId::generate(now);
        let parts: Vec<&str> = id.as_str().split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "event");
        assert_eq!(parts[1], "1700000000123");
        assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_ids_differ_within_same_millisecond() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let a = PlayerId::generate(now);
        let b = PlayerId::generate(now);
        assert!(a.as_str().starts_with("player_"));
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = PlayerId::from_string("player_1_abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"player_1_abc\"");
        let back: PlayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
