//! Near-duplicate removal across the output of every grouper.

use std::collections::HashSet;

use cohort_core::group::Group;

/// Overlap ratio above which a candidate counts as a duplicate.
pub const DUPLICATE_OVERLAP: f64 = 0.8;

/// `|a ∩ b| / min(|a|, |b|)`; zero when either side is empty. `candidate`
/// holds unique ids.
pub fn overlap_ratio(candidate: &[String], accepted: &HashSet<String>) -> f64 {
  let smaller = candidate.len().min(accepted.len());
  if smaller == 0 {
    return 0.0;
  }
  let shared = candidate.iter().filter(|id| accepted.contains(*id)).count();
  shared as f64 / smaller as f64
}

/// Greedy, order-preserving deduplication: a candidate is dropped when it
/// overlaps any already-accepted group by more than [`DUPLICATE_OVERLAP`].
/// First-seen groups win.
pub fn deduplicate(candidates: Vec<Group>) -> Vec<Group> {
  let mut accepted_sets: Vec<HashSet<String>> = Vec::new();
  let mut accepted = Vec::new();

  for group in candidates {
    let duplicate = accepted_sets
      .iter()
      .any(|set| overlap_ratio(&group.contact_ids, set) > DUPLICATE_OVERLAP);

    if duplicate {
      tracing::trace!(group = %group.name, "dropping near-duplicate group");
      continue;
    }
    accepted_sets.push(group.contact_ids.iter().cloned().collect());
    accepted.push(group);
  }

  accepted
}

#[cfg(test)]
mod tests {
  use cohort_core::group::{Confidence, GroupMetadata, GroupSource, GroupType};

  use super::*;

  fn group(name: &str, ids: &[&str]) -> Group {
    Group::generated(
      GroupType::Time,
      name,
      ids.iter().map(|s| s.to_string()),
      "",
      GroupMetadata {
        confidence:     Confidence::Medium,
        sources:        vec![GroupSource::SubmissionDate],
        auto_generated: true,
        detail:         None,
      },
    )
  }

  fn names(groups: &[Group]) -> Vec<&str> {
    groups.iter().map(|g| g.name.as_str()).collect()
  }

  #[test]
  fn keeps_the_first_of_two_overlapping_groups() {
    let out = deduplicate(vec![
      group("day", &["1", "2", "3", "4", "5"]),
      group("burst", &["1", "2", "3", "4", "5", "6"]),
    ]);
    assert_eq!(names(&out), ["day"]);
  }

  #[test]
  fn subset_is_a_duplicate_of_its_superset() {
    let out = deduplicate(vec![
      group("big", &["1", "2", "3", "4", "5", "6", "7", "8"]),
      group("small", &["2", "3"]),
    ]);
    assert_eq!(names(&out), ["big"]);
  }

  #[test]
  fn exactly_eighty_percent_is_not_a_duplicate() {
    let out = deduplicate(vec![
      group("a", &["1", "2", "3", "4", "5"]),
      group("b", &["1", "2", "3", "4", "9"]),
    ]);
    assert_eq!(names(&out), ["a", "b"]);
  }

  #[test]
  fn comparison_is_against_every_accepted_group() {
    let out = deduplicate(vec![
      group("a", &["1", "2"]),
      group("b", &["3", "4"]),
      group("c", &["3", "4", "5"]),
    ]);
    assert_eq!(names(&out), ["a", "b"]);
  }

  #[test]
  fn overlap_ratio_uses_the_smaller_set() {
    let candidate: Vec<String> = vec!["1".into(), "2".into()];
    let accepted: HashSet<String> =
      ["1", "2", "3", "4"].into_iter().map(String::from).collect();
    assert_eq!(overlap_ratio(&candidate, &accepted), 1.0);
    assert_eq!(overlap_ratio(&candidate, &HashSet::new()), 0.0);
  }
}
