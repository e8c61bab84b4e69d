//! The grouping entry point: run every enabled grouper, deduplicate the
//! combined candidates, and keep the first `max_groups`.

use std::{
  borrow::Cow,
  collections::{BTreeMap, HashSet},
  time::Instant,
};

use cohort_core::{
  Result,
  contact::Contact,
  group::{Group, GroupType},
  options::GroupingOptions,
};
use serde::Serialize;
use strum::IntoEnumIterator as _;

use crate::{
  burst::group_by_events, company::group_by_company, dedup::deduplicate,
  location::group_by_location, temporal::group_by_time,
};

pub const MIN_CONTACTS: usize = 2;
pub const INSUFFICIENT_CONTACTS: &str = "Need at least 2 contacts for grouping";
pub const NO_GROUPS_FOUND: &str = "No groups matched the selected grouping methods";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupingStats {
  /// Candidates emitted by all groupers before deduplication.
  pub total_candidates: usize,
  /// Candidates left after deduplication, before the `max_groups` cap.
  pub after_dedup:      usize,
  /// Groups returned.
  pub accepted:         usize,
  pub duration_ms:      u64,
  /// Returned groups per grouping method; every method is present.
  pub by_type:          BTreeMap<GroupType, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupingOutcome {
  pub groups:  Vec<Group>,
  pub stats:   GroupingStats,
  /// Explanation when no groups were produced.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl GroupingOutcome {
  fn empty(message: &str, duration_ms: u64) -> Self {
    Self {
      groups:  Vec::new(),
      stats:   GroupingStats {
        duration_ms,
        by_type: GroupType::iter().map(|t| (t, 0)).collect(),
        ..Default::default()
      },
      message: Some(message.to_owned()),
    }
  }
}

/// Drop repeated contact ids, keeping the first occurrence.
fn unique_by_id(contacts: &[Contact]) -> Cow<'_, [Contact]> {
  let mut seen = HashSet::new();
  if contacts.iter().all(|c| seen.insert(c.id.as_str())) {
    return Cow::Borrowed(contacts);
  }
  let mut seen = HashSet::new();
  let unique: Vec<Contact> = contacts
    .iter()
    .filter(|c| seen.insert(c.id.as_str()))
    .cloned()
    .collect();
  tracing::debug!(
    dropped = contacts.len() - unique.len(),
    "ignoring contacts with repeated ids"
  );
  Cow::Owned(unique)
}

/// Partition `contacts` into candidate groups.
///
/// Never fails for ordinary data variance: a contact lacking a signal simply
/// sits out that grouper. Only invalid options are an error.
pub fn generate_groups(
  contacts: &[Contact],
  options: &GroupingOptions,
) -> Result<GroupingOutcome> {
  options.validate()?;
  let started = Instant::now();
  let contacts = unique_by_id(contacts);

  if contacts.len() < MIN_CONTACTS {
    return Ok(GroupingOutcome::empty(INSUFFICIENT_CONTACTS, 0));
  }

  let min = options.min_group_size;
  let mut candidates: Vec<Group> = Vec::new();
  if options.group_by_company {
    candidates.extend(group_by_company(&contacts, min));
  }
  if options.group_by_time {
    candidates.extend(group_by_time(&contacts, min));
  }
  if options.group_by_location {
    candidates.extend(group_by_location(&contacts, min));
  }
  if options.group_by_events {
    candidates.extend(group_by_events(&contacts, min));
  }

  let total_candidates = candidates.len();
  let mut groups = deduplicate(candidates);
  let after_dedup = groups.len();
  groups.truncate(options.max_groups);

  let duration_ms = started.elapsed().as_millis() as u64;
  if groups.is_empty() {
    let mut outcome = GroupingOutcome::empty(NO_GROUPS_FOUND, duration_ms);
    outcome.stats.total_candidates = total_candidates;
    return Ok(outcome);
  }

  let mut by_type: BTreeMap<GroupType, usize> =
    GroupType::iter().map(|t| (t, 0)).collect();
  for group in &groups {
    *by_type.entry(group.kind).or_default() += 1;
  }

  tracing::info!(
    contacts = contacts.len(),
    total_candidates,
    after_dedup,
    accepted = groups.len(),
    duration_ms,
    "generated contact groups"
  );

  Ok(GroupingOutcome {
    stats: GroupingStats {
      total_candidates,
      after_dedup,
      accepted: groups.len(),
      duration_ms,
      by_type,
    },
    groups,
    message: None,
  })
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use chrono::DateTime;
  use cohort_core::contact::Coordinates;

  use super::*;

  fn contact(id: &str) -> Contact { Contact::new(id, format!("Contact {id}")) }

  fn only(options: GroupingOptions) -> GroupingOptions {
    GroupingOptions {
      group_by_company:  false,
      group_by_time:     false,
      group_by_location: false,
      group_by_events:   false,
      ..options
    }
  }

  #[test]
  fn single_contact_returns_an_explanation() {
    let outcome = generate_groups(&[contact("1")], &GroupingOptions::default()).unwrap();
    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.message.as_deref(), Some(INSUFFICIENT_CONTACTS));
    assert_eq!(outcome.stats.by_type.len(), 4);
  }

  #[test]
  fn invalid_options_are_rejected() {
    let opts = GroupingOptions { min_group_size: 0, ..Default::default() };
    assert!(generate_groups(&[contact("1"), contact("2")], &opts).is_err());
  }

  #[test]
  fn two_contacts_sharing_a_company() {
    let mut a = contact("1");
    a.company = Some("Acme Inc".into());
    let mut b = contact("2");
    b.company = Some("Acme Inc".into());

    let outcome = generate_groups(&[a, b], &GroupingOptions::default()).unwrap();
    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].kind, GroupType::Company);
    assert_eq!(outcome.groups[0].contact_ids, ["1", "2"]);
    assert_eq!(outcome.stats.by_type[&GroupType::Company], 1);
    assert_eq!(outcome.stats.by_type[&GroupType::Event], 0);
    assert!(outcome.message.is_none());
  }

  #[test]
  fn day_and_burst_candidates_collapse_to_one_group() {
    let contacts: Vec<Contact> = (0..5)
      .map(|i| {
        let mut c = contact(&i.to_string());
        c.submitted_at = Some(
          DateTime::parse_from_rfc3339(&format!("2024-03-05T14:{:02}:00+00:00", i * 10))
            .unwrap(),
        );
        c
      })
      .collect();
    let opts = GroupingOptions { min_group_size: 3, ..Default::default() };

    let outcome = generate_groups(&contacts, &opts).unwrap();
    assert_eq!(outcome.stats.total_candidates, 2);
    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].kind, GroupType::Time);
  }

  #[test]
  fn repeated_contact_ids_count_once() {
    let mut a = contact("1");
    a.company = Some("Acme".into());
    let mut b = contact("2");
    b.company = Some("Globex".into());

    let outcome =
      generate_groups(&[a.clone(), a.clone(), b.clone()], &GroupingOptions::default()).unwrap();
    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.message.as_deref(), Some(NO_GROUPS_FOUND));

    let outcome = generate_groups(&[a.clone(), a], &GroupingOptions::default()).unwrap();
    assert_eq!(outcome.message.as_deref(), Some(INSUFFICIENT_CONTACTS));
  }

  #[test]
  fn disabled_groupers_do_not_run() {
    let mut a = contact("1");
    a.company = Some("Acme".into());
    a.location = Some(Coordinates::new(1.0, 1.0));
    let mut b = contact("2");
    b.company = Some("Acme".into());
    b.location = Some(Coordinates::new(5.0, 5.0));

    let opts = only(GroupingOptions { group_by_location: true, ..Default::default() });
    let outcome = generate_groups(&[a, b], &opts).unwrap();
    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.message.as_deref(), Some(NO_GROUPS_FOUND));
  }

  #[test]
  fn output_is_capped_at_max_groups() {
    let contacts: Vec<Contact> = (0..12)
      .map(|i| {
        let mut c = contact(&i.to_string());
        c.company = Some(format!("Company {}", i / 2));
        c
      })
      .collect();
    let opts = GroupingOptions { max_groups: 4, ..Default::default() };

    let outcome = generate_groups(&contacts, &opts).unwrap();
    assert_eq!(outcome.stats.total_candidates, 6);
    assert_eq!(outcome.stats.after_dedup, 6);
    assert_eq!(outcome.stats.accepted, 4);
    assert_eq!(outcome.groups.len(), 4);
    assert_eq!(outcome.groups[0].name, "Company 0");
  }

  #[test]
  fn every_group_respects_min_size_and_has_unique_members() {
    let contacts: Vec<Contact> = (0..30)
      .map(|i| {
        let mut c = contact(&i.to_string());
        c.company = Some(["Acme", "Globex", "Initech"][i % 3].into());
        c.email = Some(format!("p{i}@{}", ["acme.com", "gmail.com", "umbrella.io"][i % 3]));
        c.location = Some(Coordinates::new(10.0 + (i % 4) as f64 * 0.001, 20.0));
        c.submitted_at = Some(
          DateTime::parse_from_rfc3339(&format!("2024-03-{:02}T{:02}:00:00+00:00", 1 + i % 3, 8 + i % 7))
            .unwrap(),
        );
        c
      })
      .collect();
    let opts = GroupingOptions { min_group_size: 3, max_groups: 50, ..Default::default() };

    let outcome = generate_groups(&contacts, &opts).unwrap();
    assert!(!outcome.groups.is_empty());
    for g in &outcome.groups {
      assert!(g.len() >= 3, "{} has {} members", g.name, g.len());
      let unique: HashSet<&String> = g.contact_ids.iter().collect();
      assert_eq!(unique.len(), g.len(), "{} repeats a member", g.name);
    }
  }
}
