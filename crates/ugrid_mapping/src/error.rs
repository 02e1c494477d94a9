//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! rejected layer configurations, vertical positions outside the layer stack, points that do not
//! resolve to a grid cell, array-length mismatches, unsupported coverage shapes, and failures
//! reported by an interpolation engine.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Layer (or other) configuration rejected when it was set.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A queried value lies outside its valid range.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// A point did not resolve to a single grid cell.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Two arrays that must be aligned have different lengths.
    #[error("data consistency error: expected {expected} values, got {actual} ({context})")]
    DataConsistency {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// The receiver is not in a state that allows the call.
    #[error("{0}")]
    InvalidOperation(String),

    #[error("interpolation engine failed: {0}")]
    Interpolation(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn data_consistency(
        context: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Error::DataConsistency {
            context: context.into(),
            expected,
            actual,
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn data_consistency_message_names_both_lengths() {
        let err = Error::data_consistency("coordinates vs values", 4, 3);
        let msg = err.to_string();
        assert!(msg.contains("expected 4"));
        assert!(msg.contains("got 3"));
        assert!(msg.contains("coordinates vs values"));
    }

    #[test]
    fn invalid_operation_displays_message_verbatim() {
        let err = Error::InvalidOperation("no grid".into());
        assert_eq!(err.to_string(), "no grid");
    }
}
