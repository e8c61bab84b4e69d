//! Error types for `cohort-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A candidate group failed the structural check before persistence. The
  /// whole batch is rejected.
  #[error("malformed group at index {index}: {reason}")]
  MalformedGroup { index: usize, reason: String },

  #[error("invalid grouping options: {0}")]
  InvalidOptions(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
