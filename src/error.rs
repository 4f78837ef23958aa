//! # Error
//!
//! Errors raised while constructing, mutating, fitting or selecting a copula.
//!
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BicopError {
  /// Malformed sample matrix: wrong column count, empty, or entries outside the unit square.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Parameter vector of the wrong length or with a value outside the family bounds.
  #[error("invalid parameters: {0}")]
  InvalidParameters(String),

  #[error("invalid rotation {0}: must be one of 0, 90, 180, 270")]
  InvalidRotation(i32),

  #[error("unsupported family: {0}")]
  UnsupportedFamily(String),

  #[error("the family set for selection is empty")]
  EmptyCandidateSet,

  #[error("fitting failed: {0}")]
  FittingFailed(String),

  #[error("method '{method}' is not available for the {family} family")]
  MethodNotSupported { family: String, method: String },

  /// A special-function constructor rejected its arguments.
  #[error("numerical error: {0}")]
  Numerical(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BicopError>;
