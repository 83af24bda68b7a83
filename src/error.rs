//! Error types for image transforms.

use thiserror::Error;

use crate::image::DType;

/// Errors produced by the transform layer.
///
/// Dtype checks run before any computation, so a `TypeContract` error never
/// leaves a partial result behind.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{operation} expects {expected} input, got {found}")]
    TypeContract {
        operation: &'static str,
        expected: &'static str,
        found: DType,
    },

    #[error("shape mismatch: expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("stack has no planes")]
    EmptyStack,

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl TransformError {
    pub(crate) fn type_contract(
        operation: &'static str,
        expected: &'static str,
        found: DType,
    ) -> Self {
        TransformError::TypeContract {
            operation,
            expected,
            found,
        }
    }
}

/// Result type alias for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(feature = "python")]
impl From<TransformError> for pyo3::PyErr {
    fn from(err: TransformError) -> Self {
        use pyo3::exceptions::{PyTypeError, PyValueError};
        match err {
            TransformError::TypeContract { .. } => PyTypeError::new_err(err.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}
