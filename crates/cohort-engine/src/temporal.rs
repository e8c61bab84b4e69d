//! Temporal grouping: contacts added on the same calendar day, split into
//! event-scale clusters.
//!
//! Dates are taken in the offset each timestamp was recorded with; nothing is
//! normalised to UTC first.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use cohort_core::{
  contact::Contact,
  group::{Confidence, Group, GroupDetail, GroupMetadata, GroupSource, GroupType},
};

/// Largest gap between consecutive contacts of one cluster.
pub const CLUSTER_GAP: TimeDelta = TimeDelta::hours(3);
/// Cluster size from which a time group is tagged `high`.
const HIGH_CONFIDENCE_SIZE: usize = 5;

/// A contact paired with its arrival time.
pub(crate) type Arrival<'a> = (DateTime<FixedOffset>, &'a Contact);

/// Every timestamped contact, ordered by arrival. Ties keep input order.
pub(crate) fn arrivals(contacts: &[Contact]) -> Vec<Arrival<'_>> {
  let mut out: Vec<Arrival<'_>> = contacts
    .iter()
    .filter_map(|c| c.arrived_at().map(|at| (at, c)))
    .collect();
  out.sort_by_key(|(at, _)| *at);
  out
}

pub(crate) fn hours_between(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> f64 {
  (end - start).num_seconds() as f64 / 3600.0
}

/// One-pass sliding split: a contact joins the running cluster when it
/// arrived within [`CLUSTER_GAP`] of the previous member.
fn split_by_gap<'a, 'c>(sorted: &'a [Arrival<'c>]) -> Vec<&'a [Arrival<'c>]> {
  let mut clusters = Vec::new();
  let mut start = 0;
  for i in 1..sorted.len() {
    if sorted[i].0 - sorted[i - 1].0 > CLUSTER_GAP {
      clusters.push(&sorted[start..i]);
      start = i;
    }
  }
  if start < sorted.len() {
    clusters.push(&sorted[start..]);
  }
  clusters
}

fn time_group(date: NaiveDate, cluster: &[Arrival<'_>], disambiguate: bool) -> Group {
  let start = cluster[0].0;
  let end = cluster[cluster.len() - 1].0;
  let span = hours_between(start, end);
  let day = date.format("%b %-d, %Y");

  let name = if disambiguate {
    format!("Met on {day} ({})", start.format("%H:%M"))
  } else {
    format!("Met on {day}")
  };

  Group::generated(
    GroupType::Time,
    name,
    cluster.iter().map(|(_, c)| c.id.clone()),
    format!("{} contacts added on {day} within {span:.1} hours", cluster.len()),
    GroupMetadata {
      confidence:     Confidence::high_if(cluster.len() >= HIGH_CONFIDENCE_SIZE),
      sources:        vec![GroupSource::SubmissionDate],
      auto_generated: true,
      detail:         Some(GroupDetail::Time {
        date,
        start,
        end,
        time_span_hours: span,
      }),
    },
  )
}

/// Group contacts added on the same day and close together in time.
pub fn group_by_time(contacts: &[Contact], min_group_size: usize) -> Vec<Group> {
  let mut days: BTreeMap<NaiveDate, Vec<Arrival<'_>>> = BTreeMap::new();
  for arrival in arrivals(contacts) {
    days.entry(arrival.0.date_naive()).or_default().push(arrival);
  }

  let mut groups = Vec::new();
  for (date, members) in &days {
    if members.len() < min_group_size {
      continue;
    }
    let clusters: Vec<_> = split_by_gap(members)
      .into_iter()
      .filter(|cluster| cluster.len() >= min_group_size)
      .collect();
    let disambiguate = clusters.len() > 1;
    groups.extend(
      clusters
        .into_iter()
        .map(|cluster| time_group(*date, cluster, disambiguate)),
    );
  }

  tracing::debug!(days = days.len(), groups = groups.len(), "time grouping finished");
  groups
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(id: &str, ts: &str) -> Contact {
    let mut c = Contact::new(id, id);
    c.submitted_at = Some(DateTime::parse_from_rfc3339(ts).unwrap());
    c
  }

  #[test]
  fn same_day_contacts_form_one_group() {
    let contacts = vec![
      at("1", "2024-03-05T09:00:00+00:00"),
      at("2", "2024-03-05T10:00:00+00:00"),
      at("3", "2024-03-05T11:30:00+00:00"),
      at("4", "2024-03-06T11:30:00+00:00"),
    ];
    let groups = group_by_time(&contacts, 2);
    assert_eq!(groups.len(), 1);
    let g = &groups[0];
    assert_eq!(g.contact_ids, ["1", "2", "3"]);
    assert_eq!(g.name, "Met on Mar 5, 2024");
    assert_eq!(g.metadata.confidence, Confidence::Medium);
    match &g.metadata.detail {
      Some(GroupDetail::Time { time_span_hours, .. }) => {
        assert!((time_span_hours - 2.5).abs() < 1e-9)
      }
      other => panic!("unexpected detail: {other:?}"),
    }
  }

  #[test]
  fn gap_is_measured_from_the_previous_contact() {
    // Each step is 2h: the chain stays together although it spans 6h.
    let contacts = vec![
      at("1", "2024-03-05T08:00:00+00:00"),
      at("2", "2024-03-05T10:00:00+00:00"),
      at("3", "2024-03-05T12:00:00+00:00"),
      at("4", "2024-03-05T14:00:00+00:00"),
    ];
    let groups = group_by_time(&contacts, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
  }

  #[test]
  fn long_gap_splits_a_day_into_named_clusters() {
    let contacts = vec![
      at("1", "2024-03-05T08:00:00+00:00"),
      at("2", "2024-03-05T08:30:00+00:00"),
      at("3", "2024-03-05T18:00:00+00:00"),
      at("4", "2024-03-05T18:45:00+00:00"),
    ];
    let groups = group_by_time(&contacts, 2);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].contact_ids, ["1", "2"]);
    assert_eq!(groups[1].contact_ids, ["3", "4"]);
    assert_ne!(groups[0].name, groups[1].name);
    assert_eq!(groups[1].name, "Met on Mar 5, 2024 (18:00)");
  }

  #[test]
  fn undersized_clusters_are_dropped() {
    let contacts = vec![
      at("1", "2024-03-05T08:00:00+00:00"),
      at("2", "2024-03-05T08:30:00+00:00"),
      at("3", "2024-03-05T18:00:00+00:00"),
    ];
    let groups = group_by_time(&contacts, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].contact_ids, ["1", "2"]);
    assert_eq!(groups[0].name, "Met on Mar 5, 2024");
  }

  #[test]
  fn calendar_day_follows_the_recorded_offset() {
    // Same instant range in UTC terms, but recorded on different local days.
    let contacts = vec![
      at("1", "2024-03-05T23:30:00-05:00"),
      at("2", "2024-03-06T00:30:00-05:00"),
    ];
    assert!(group_by_time(&contacts, 2).is_empty());
  }

  #[test]
  fn contacts_without_timestamps_are_ignored() {
    let mut created_only = Contact::new("3", "c");
    created_only.created_at =
      Some(DateTime::parse_from_rfc3339("2024-03-05T09:10:00+00:00").unwrap());
    let contacts = vec![
      at("1", "2024-03-05T09:00:00+00:00"),
      Contact::new("2", "no timestamp"),
      created_only,
    ];
    let groups = group_by_time(&contacts, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].contact_ids, ["1", "3"]);
  }

  #[test]
  fn five_or_more_is_high_confidence() {
    let contacts: Vec<Contact> = (0..5)
      .map(|i| at(&i.to_string(), &format!("2024-03-05T09:{:02}:00+00:00", i * 10)))
      .collect();
    let groups = group_by_time(&contacts, 3);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].metadata.confidence, Confidence::High);
  }
}
