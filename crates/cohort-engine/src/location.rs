//! Geographic grouping: contacts recorded close to one another.
//!
//! Seed-based agglomeration, O(n²): each unassigned contact seeds a cluster
//! and absorbs every other unassigned contact within [`PROXIMITY_KM`] of the
//! seed.

use cohort_core::{
  contact::{Contact, Coordinates},
  group::{Confidence, Group, GroupDetail, GroupMetadata, GroupSource, GroupType},
};

use crate::geo::{centroid, haversine_km, haversine_m};

/// Clustering threshold, in kilometres (500 m).
pub const PROXIMITY_KM: f64 = 0.5;
/// Clusters with a radius up to this many metres are tagged `high`.
const HIGH_CONFIDENCE_RADIUS_M: f64 = 500.0;

/// Group contacts whose coordinates lie within [`PROXIMITY_KM`] of a seed.
pub fn group_by_location(contacts: &[Contact], min_group_size: usize) -> Vec<Group> {
  let located: Vec<(Coordinates, &Contact)> = contacts
    .iter()
    .filter_map(|c| c.coordinates().map(|p| (p, c)))
    .collect();

  if located.len() < min_group_size {
    return Vec::new();
  }

  let mut assigned = vec![false; located.len()];
  let mut clusters: Vec<Vec<usize>> = Vec::new();

  for seed in 0..located.len() {
    if assigned[seed] {
      continue;
    }
    assigned[seed] = true;
    let mut cluster = vec![seed];
    for other in 0..located.len() {
      if !assigned[other]
        && haversine_km(located[seed].0, located[other].0) <= PROXIMITY_KM
      {
        assigned[other] = true;
        cluster.push(other);
      }
    }
    if cluster.len() >= 2 {
      clusters.push(cluster);
    }
  }

  let groups: Vec<Group> = clusters
    .into_iter()
    .filter(|cluster| cluster.len() >= min_group_size)
    .enumerate()
    .filter_map(|(ordinal, cluster)| {
      let members: Vec<(Coordinates, &Contact)> =
        cluster.into_iter().map(|i| located[i]).collect();
      location_group(ordinal + 1, &members)
    })
    .collect();

  tracing::debug!(located = located.len(), groups = groups.len(), "location grouping finished");
  groups
}

fn location_group(ordinal: usize, members: &[(Coordinates, &Contact)]) -> Option<Group> {
  let points: Vec<Coordinates> = members.iter().map(|(p, _)| *p).collect();
  let center = centroid(&points)?;
  let radius_meters = points
    .iter()
    .map(|p| haversine_m(*p, center))
    .fold(0.0_f64, f64::max);

  Some(Group::generated(
    GroupType::Location,
    format!(
      "Nearby #{ordinal} ({:.3}, {:.3})",
      center.latitude, center.longitude
    ),
    members.iter().map(|(_, c)| c.id.clone()),
    format!(
      "{} contacts within {radius_meters:.0} m of ({:.5}, {:.5})",
      members.len(),
      center.latitude,
      center.longitude
    ),
    GroupMetadata {
      confidence:     Confidence::high_if(radius_meters <= HIGH_CONFIDENCE_RADIUS_M),
      sources:        vec![GroupSource::Coordinates],
      auto_generated: true,
      detail:         Some(GroupDetail::Location { center, radius_meters }),
    },
  ))
}
