//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Result alias for synthesis operations.
pub type SkResult<T> = Result<T, SkError>;

/// Everything that can go wrong between receiving a target and returning a
/// gate word.
#[derive(Debug, Error)]
pub enum SkError {
    /// The two Bloch points are parallel or antiparallel, so the rotation
    /// carrying one onto the other is not unique.
    #[error("points are parallel or antiparallel (dot product {0}); rotation between them is not unique")]
    DegeneratePoints(f64),

    /// A Bloch point is zero-length or has non-finite components.
    #[error("point ({0}, {1}, {2}) cannot be normalized")]
    InvalidPoint(f64, f64, f64),

    /// The U(2) target has (numerically) zero determinant.
    #[error("target matrix is singular (|det| = {0:e})")]
    SingularTarget(f64),

    /// The U(2) target is too far from unitary.
    #[error("target matrix is not unitary (max deviation {0:e})")]
    NotUnitary(f64),

    /// The SO(3) target is too far from a proper rotation.
    #[error("target matrix is not a proper rotation (max deviation {0:e})")]
    NotSo3(f64),

    /// Recursion depth is negative, fractional, non-finite, or unparseable.
    #[error("recursion depth must be a non-negative integer; got {0}")]
    InvalidDepth(String),

    /// Recursion depth exceeds the configured cap.
    #[error("recursion depth {depth} exceeds the configured maximum of {max}")]
    DepthTooLarge { depth: usize, max: usize },

    /// A gate symbol outside the known alphabet.
    #[error("unknown gate symbol {0:?}")]
    UnknownGate(String),

    /// A basic approximation table with no records.
    #[error("basic approximation table is empty")]
    EmptyTable,

    /// A basic approximation record that is malformed or inconsistent with
    /// its own gate word.
    #[error("malformed basic approximation record {index}: {reason}")]
    BadRecord { index: usize, reason: String },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_messages() {
        let err = SkError::DepthTooLarge { depth: 10, max: 8 };
        assert_eq!(
            err.to_string(),
            "recursion depth 10 exceeds the configured maximum of 8",
        );

        let err = SkError::UnknownGate("cx".to_string());
        assert_eq!(err.to_string(), "unknown gate symbol \"cx\"");

        let err = SkError::BadRecord { index: 3, reason: "nan".to_string() };
        assert!(err.to_string().contains("record 3"));
    }

    #[test]
    fn from_json_error() {
        let json_err
            = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err: SkError = json_err.into();
        assert!(matches!(err, SkError::Json(_)));
        assert!(err.to_string().starts_with("json error"));
    }

    #[test]
    fn from_io_error() {
        let io_err
            = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SkError = io_err.into();
        assert!(matches!(err, SkError::Io(_)));
    }
}
