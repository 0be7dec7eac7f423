//! Validated string newtypes for events and players
//!
//! These newtypes ensure that text fields are valid by construction. Lengths
//! are measured in characters, not bytes. Unlike free-form names elsewhere,
//! values are stored exactly as given (no trimming) so a persisted value
//! round-trips unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::DomainError;

const EVENT_CODE_MIN_LENGTH: usize = 5;
const EVENT_CODE_MAX_LENGTH: usize = 20;
const EVENT_TITLE_MIN_LENGTH: usize = 3;
const EVENT_TITLE_MAX_LENGTH: usize = 255;
const EVENT_DESCRIPTION_MIN_LENGTH: usize = 10;
const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 50;

static EVENT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^evt_\d+$").expect("valid regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Implements the shared string-newtype plumbing: accessors, `Display`,
/// and the serde `try_from`/`into` conversions.
macro_rules! string_newtype {
    ($name:ident) => {
        impl $name {
            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// ============================================================================
// EventCode
// ============================================================================

/// The business key of an event, e.g. `evt_00123`.
///
/// Length is checked before the pattern, so an over-long code reports the
/// length rule even if it also breaks the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventCode(String);

impl EventCode {
    /// Create a new validated event code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The code is shorter than 5 or longer than 20 characters
    /// - The code does not match `evt_<digits>`
    pub fn new(code: impl Into<String>) -> Result<Self, DomainError> {
        let code = code.into();
        let len = char_len(&code);
        if !(EVENT_CODE_MIN_LENGTH..=EVENT_CODE_MAX_LENGTH).contains(&len) {
            return Err(DomainError::validation(format!(
                "Event ID must be between {} and {} characters",
                EVENT_CODE_MIN_LENGTH, EVENT_CODE_MAX_LENGTH
            )));
        }
        if !EVENT_CODE_RE.is_match(&code) {
            return Err(DomainError::validation(
                "Event ID must follow pattern: evt_XXXXX",
            ));
        }
        Ok(Self(code))
    }
}

string_newtype!(EventCode);

// ============================================================================
// EventTitle
// ============================================================================

/// A validated event title (3..=255 characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventTitle(String);

impl EventTitle {
    pub fn new(title: impl Into<String>) -> Result<Self, DomainError> {
        let title = title.into();
        let len = char_len(&title);
        if !(EVENT_TITLE_MIN_LENGTH..=EVENT_TITLE_MAX_LENGTH).contains(&len) {
            return Err(DomainError::validation(format!(
                "Event title must be between {} and {} characters",
                EVENT_TITLE_MIN_LENGTH, EVENT_TITLE_MAX_LENGTH
            )));
        }
        Ok(Self(title))
    }
}

string_newtype!(EventTitle);

// ============================================================================
// EventDescription
// ============================================================================

/// A validated event description (at least 10 characters, no upper bound)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventDescription(String);

impl EventDescription {
    pub fn new(description: impl Into<String>) -> Result<Self, DomainError> {
        let description = description.into();
        if char_len(&description) < EVENT_DESCRIPTION_MIN_LENGTH {
            return Err(DomainError::validation(format!(
                "Event description must be at least {} characters",
                EVENT_DESCRIPTION_MIN_LENGTH
            )));
        }
        Ok(Self(description))
    }
}

string_newtype!(EventDescription);

// ============================================================================
// Username
// ============================================================================

/// A validated username (3..=50 characters of `[a-zA-Z0-9_]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Create a new validated username.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The username is shorter than 3 or longer than 50 characters
    /// - The username contains anything other than ASCII letters, digits, or `_`
    pub fn new(username: impl Into<String>) -> Result<Self, DomainError> {
        let username = username.into();
        let len = char_len(&username);
        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
            return Err(DomainError::validation(format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
            )));
        }
        if !USERNAME_RE.is_match(&username) {
            return Err(DomainError::validation(
                "Username can only contain letters, numbers, and underscores",
            ));
        }
        Ok(Self(username))
    }
}

string_newtype!(Username);

// ============================================================================
// Email
// ============================================================================

/// A loosely validated email address (`local@domain.tld`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> Result<Self, DomainError> {
        let email = email.into();
        if !EMAIL_RE.is_match(&email) {
            return Err(DomainError::validation("Invalid email format"));
        }
        Ok(Self(email))
    }
}

string_newtype!(Email);
