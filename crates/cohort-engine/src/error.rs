//! Error type for the grouping service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error(transparent)]
  Core(#[from] cohort_core::Error),

  #[error("failed to load contacts: {0}")]
  Contacts(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The transactional merge failed; nothing was written.
  #[error("failed to persist groups: {0}")]
  Persist(#[source] Box<dyn std::error::Error + Send + Sync>),
}
