//! The `ContactSource` and `GroupStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `cohort-store-sqlite`). The grouping service and the HTTP layer depend on
//! these abstractions, not on any concrete backend. Handles are constructed
//! explicitly by the caller and passed in; nothing here is global.

use std::future::Future;

use crate::{
  contact::Contact,
  group::Group,
  merge::{MergePolicy, MergeReport},
};

/// Read access to a user's contacts.
pub trait ContactSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch every contact belonging to `user_id`, in a stable order.
  fn list_contacts<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;
}

/// A per-user collection of groups that can be replaced atomically.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GroupStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the user's persisted groups. An unknown user has none.
  fn list_groups<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + 'a;

  /// Merge `groups` into the user's collection in a single atomic
  /// read-modify-write.
  ///
  /// The whole batch is rejected if any group is structurally broken.
  /// Candidates colliding with a stored group by id or case-insensitive name
  /// are skipped, never overwritten. See [`crate::merge::merge_groups`].
  fn merge_groups<'a>(
    &'a self,
    user_id: &'a str,
    groups: Vec<Group>,
    policy: &'a MergePolicy,
  ) -> impl Future<Output = Result<MergeReport, Self::Error>> + Send + 'a;
}
