//! [`GroupingService`]: fetch, generate, persist.
//!
//! The only I/O around the engine: the contact fetch before it and one
//! atomic merge after it. No lock is held while groupers run.

use std::sync::Arc;

use cohort_core::{
  merge::{MergePolicy, MergeReport},
  options::GroupingOptions,
  store::{ContactSource, GroupStore},
};
use serde::Serialize;

use crate::{
  engine::{GroupingOutcome, generate_groups},
  error::ServiceError,
};

/// Result of one end-to-end grouping run.
#[derive(Debug, Clone, Serialize)]
pub struct GroupingRun {
  #[serde(flatten)]
  pub outcome: GroupingOutcome,
  /// `None` when there was nothing to persist.
  pub persisted: Option<MergeReport>,
}

/// Runs the grouping engine against explicitly injected stores.
pub struct GroupingService<C, G> {
  contacts: Arc<C>,
  groups:   Arc<G>,
}

impl<C, G> Clone for GroupingService<C, G> {
  fn clone(&self) -> Self {
    Self {
      contacts: Arc::clone(&self.contacts),
      groups:   Arc::clone(&self.groups),
    }
  }
}

impl<C, G> GroupingService<C, G>
where
  C: ContactSource,
  G: GroupStore,
{
  pub fn new(contacts: Arc<C>, groups: Arc<G>) -> Self { Self { contacts, groups } }

  /// Generate groups for `user_id` and merge them into the stored collection.
  ///
  /// A failed merge fails the whole call; there is no partial success.
  pub async fn run(
    &self,
    user_id: &str,
    options: &GroupingOptions,
    policy: &MergePolicy,
  ) -> Result<GroupingRun, ServiceError> {
    options.validate()?;

    let contacts = self
      .contacts
      .list_contacts(user_id)
      .await
      .map_err(|e| ServiceError::Contacts(Box::new(e)))?;

    let outcome = generate_groups(&contacts, options)?;
    if outcome.groups.is_empty() {
      tracing::info!(user_id, message = ?outcome.message, "no groups to persist");
      return Ok(GroupingRun { outcome, persisted: None });
    }

    let report = self
      .groups
      .merge_groups(user_id, outcome.groups.clone(), policy)
      .await
      .map_err(|e| {
        tracing::warn!(user_id, error = %e, "group merge failed");
        ServiceError::Persist(Box::new(e))
      })?;

    tracing::info!(
      user_id,
      saved = report.saved,
      skipped = report.duplicates_skipped,
      replaced = report.replaced,
      total = report.total_groups,
      "persisted generated groups"
    );

    Ok(GroupingRun { outcome, persisted: Some(report) })
  }
}
