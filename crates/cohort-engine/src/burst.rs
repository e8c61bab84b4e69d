//! Burst detection: runs of contacts added in rapid succession, regardless of
//! calendar-day boundaries.
//!
//! Unlike the time grouper, the window is anchored on the first contact of a
//! run rather than on the previous member.

use chrono::TimeDelta;
use cohort_core::{
  contact::Contact,
  group::{Confidence, EventKind, Group, GroupDetail, GroupMetadata, GroupSource, GroupType},
};

use crate::temporal::{Arrival, arrivals, hours_between};

/// Longest distance from a run's first contact to any other member.
pub const BURST_WINDOW: TimeDelta = TimeDelta::hours(4);

const RAPID_NETWORKING_MAX: TimeDelta = TimeDelta::hours(2);
const CONFERENCE_MIN_SIZE: usize = 10;
const MULTI_DAY_MIN: TimeDelta = TimeDelta::hours(6);
const HIGH_CONFIDENCE_SIZE: usize = 5;

/// Classify a run from its size and duration. The first matching rule wins.
pub fn classify_run(size: usize, duration: TimeDelta) -> EventKind {
  if duration <= RAPID_NETWORKING_MAX {
    EventKind::RapidNetworking
  } else if size >= CONFERENCE_MIN_SIZE {
    EventKind::Conference
  } else if duration >= MULTI_DAY_MIN {
    EventKind::MultiDay
  } else {
    EventKind::Event
  }
}

/// Group rapid-succession runs of contacts.
pub fn group_by_events(contacts: &[Contact], min_group_size: usize) -> Vec<Group> {
  let sorted = arrivals(contacts);
  let mut used = vec![false; sorted.len()];
  let mut groups = Vec::new();

  for seed in 0..sorted.len() {
    if used[seed] {
      continue;
    }
    let anchor = sorted[seed].0;
    used[seed] = true;
    let mut run = vec![seed];

    for next in seed + 1..sorted.len() {
      if used[next] {
        continue;
      }
      // Sorted input: nothing past the first miss can fit the window.
      if sorted[next].0 - anchor > BURST_WINDOW {
        break;
      }
      used[next] = true;
      run.push(next);
    }

    if run.len() >= min_group_size {
      let members: Vec<Arrival<'_>> = run.iter().map(|&i| sorted[i]).collect();
      groups.push(event_group(groups.len() + 1, &members));
    } else {
      for i in run {
        used[i] = false;
      }
    }
  }

  tracing::debug!(timestamped = sorted.len(), groups = groups.len(), "event grouping finished");
  groups
}

fn event_group(ordinal: usize, run: &[Arrival<'_>]) -> Group {
  let start = run[0].0;
  let end = run[run.len() - 1].0;
  let event_kind = classify_run(run.len(), end - start);
  let duration_hours = hours_between(start, end);

  Group::generated(
    GroupType::Event,
    format!(
      "{} #{ordinal} ({})",
      event_kind.label(),
      start.format("%b %-d, %Y")
    ),
    run.iter().map(|(_, c)| c.id.clone()),
    format!(
      "{} contacts added within {duration_hours:.1} hours starting {}",
      run.len(),
      start.format("%b %-d, %Y %H:%M")
    ),
    GroupMetadata {
      confidence:     Confidence::high_if(run.len() >= HIGH_CONFIDENCE_SIZE),
      sources:        vec![GroupSource::SubmissionBurst],
      auto_generated: true,
      detail:         Some(GroupDetail::Event {
        event_kind,
        start,
        end,
        duration_hours,
      }),
    },
  )
}
