//! Merging a batch of generated groups into a stored collection.
//!
//! This is the pure half of persistence: backends load the existing
//! collection inside a transaction, call [`merge_groups`], and write the
//! result back in the same transaction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  group::{Group, GroupType},
};

/// How a merge treats groups already in the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePolicy {
  /// Auto-generated groups of these types are dropped before the merge so a
  /// regeneration refreshes them. Empty means nothing is ever removed.
  #[serde(default)]
  pub replace_types: Vec<GroupType>,
}

impl MergePolicy {
  pub fn replacing(types: impl IntoIterator<Item = GroupType>) -> Self {
    Self { replace_types: types.into_iter().collect() }
  }

  fn replaces(&self, group: &Group) -> bool {
    group.metadata.auto_generated && self.replace_types.contains(&group.kind)
  }
}

/// Counts returned to the caller after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
  pub saved:              usize,
  pub duplicates_skipped: usize,
  /// Stale auto-generated groups removed under [`MergePolicy::replace_types`].
  pub replaced:           usize,
  pub total_groups:       usize,
}

/// Merge `candidates` into `existing`, returning the new collection.
///
/// Fails without touching anything when any candidate is structurally
/// broken. Candidates whose id matches a group already in the collection,
/// or whose name matches one case-insensitively, are skipped and counted.
pub fn merge_groups(
  existing: Vec<Group>,
  candidates: Vec<Group>,
  policy: &MergePolicy,
) -> Result<(Vec<Group>, MergeReport)> {
  if let Some((index, reason)) = candidates
    .iter()
    .enumerate()
    .find_map(|(i, g)| g.structural_problem().map(|r| (i, r)))
  {
    return Err(Error::MalformedGroup { index, reason: reason.to_owned() });
  }

  let before = existing.len();
  let mut merged: Vec<Group> =
    existing.into_iter().filter(|g| !policy.replaces(g)).collect();
  let replaced = before - merged.len();

  let mut ids: HashSet<String> = merged.iter().map(|g| g.id.clone()).collect();
  let mut names: HashSet<String> =
    merged.iter().map(|g| g.name.to_lowercase()).collect();

  let mut saved = 0;
  let mut duplicates_skipped = 0;
  for group in candidates {
    let name_key = group.name.to_lowercase();
    if ids.contains(&group.id) || names.contains(&name_key) {
      duplicates_skipped += 1;
      continue;
    }
    ids.insert(group.id.clone());
    names.insert(name_key);
    merged.push(group);
    saved += 1;
  }

  let report = MergeReport {
    saved,
    duplicates_skipped,
    replaced,
    total_groups: merged.len(),
  };
  Ok((merged, report))
}
