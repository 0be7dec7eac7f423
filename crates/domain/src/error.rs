//! Unified error types for the domain layer
//!
//! Every invariant violation surfaces as [`DomainError::Validation`] carrying
//! the message of the specific rule that failed. Construction is all-or-nothing:
//! a constructor either returns a fully valid object or this error.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if title.chars().count() < 3 {
    ///     return Err(DomainError::validation("Event title must be between 3 and 255 characters"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Returns the rule message if this is a validation error.
    pub fn validation_message(&self) -> Option<&str> {
        match self {
            Self::Validation(msg) => Some(msg),
            _ => None,
        }
    }
}
