//! Group types: the artifact the grouping engine produces.
//!
//! A group is created fresh on every run and never mutated in place. Updates
//! happen by generating a new batch and merging it into the stored collection.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contact::Coordinates;

// ─── Grouping method ─────────────────────────────────────────────────────────

/// The closed set of grouping methods. Doubles as the id prefix of generated
/// groups.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GroupType {
  Company,
  Time,
  Location,
  Event,
}

// ─── Provenance ──────────────────────────────────────────────────────────────

/// Coarse trust label attached to a generated group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
  High,
  Medium,
}

impl Confidence {
  /// `High` when `condition` holds, otherwise `Medium`.
  pub fn high_if(condition: bool) -> Self {
    if condition { Self::High } else { Self::Medium }
  }
}

/// A raw signal that contributed to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSource {
  CompanyName,
  EmailDomain,
  SubmissionDate,
  Coordinates,
  SubmissionBurst,
}

/// The character of a rapid-succession run of contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  RapidNetworking,
  Conference,
  MultiDay,
  Event,
}

impl EventKind {
  pub fn label(self) -> &'static str {
    match self {
      Self::RapidNetworking => "Rapid Networking",
      Self::Conference => "Conference",
      Self::MultiDay => "Multi-day Event",
      Self::Event => "Event",
    }
  }
}

// ─── Method-specific payload ─────────────────────────────────────────────────

/// Geometry or timing computed by the grouper that produced the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupDetail {
  Company {
    company: String,
    /// The email domain that contributed members, if any.
    domain:  Option<String>,
  },
  Time {
    date:            NaiveDate,
    start:           DateTime<FixedOffset>,
    end:             DateTime<FixedOffset>,
    time_span_hours: f64,
  },
  Location {
    center:        Coordinates,
    radius_meters: f64,
  },
  Event {
    event_kind:     EventKind,
    start:          DateTime<FixedOffset>,
    end:            DateTime<FixedOffset>,
    duration_hours: f64,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMetadata {
  pub confidence:     Confidence,
  pub sources:        Vec<GroupSource>,
  /// Set on every group produced by the engine; manually created groups
  /// leave it unset and are never replaced by a regeneration.
  #[serde(default)]
  pub auto_generated: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub detail:         Option<GroupDetail>,
}

// ─── Group ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
  pub id:            String,
  pub name:          String,
  #[serde(rename = "type")]
  pub kind:          GroupType,
  /// Ordered, unique member ids.
  pub contact_ids:   Vec<String>,
  #[serde(default)]
  pub description:   String,
  pub created_at:    DateTime<Utc>,
  pub last_modified: DateTime<Utc>,
  pub metadata:      GroupMetadata,
}

impl Group {
  /// Build a freshly generated group with a type-prefixed id.
  ///
  /// `contact_ids` is de-duplicated preserving first-seen order.
  pub fn generated(
    kind: GroupType,
    name: impl Into<String>,
    contact_ids: impl IntoIterator<Item = String>,
    description: impl Into<String>,
    metadata: GroupMetadata,
  ) -> Self {
    let now = Utc::now();
    let mut seen = HashSet::new();
    let ids: Vec<String> = contact_ids
      .into_iter()
      .filter(|id| seen.insert(id.clone()))
      .collect();
    Self {
      id: Self::generate_id(kind),
      name: name.into(),
      kind,
      contact_ids: ids,
      description: description.into(),
      created_at: now,
      last_modified: now,
      metadata: GroupMetadata { auto_generated: true, ..metadata },
    }
  }

  /// A globally unique id carrying the grouping method as a prefix, e.g.
  /// `company_3f2a…`.
  pub fn generate_id(kind: GroupType) -> String {
    format!("{kind}_{}", Uuid::new_v4().simple())
  }

  pub fn len(&self) -> usize { self.contact_ids.len() }

  pub fn is_empty(&self) -> bool { self.contact_ids.is_empty() }

  /// Structural check applied before persistence. Returns the reason the
  /// group is unusable, if any.
  pub fn structural_problem(&self) -> Option<&'static str> {
    if self.id.trim().is_empty() {
      Some("missing id")
    } else if self.name.trim().is_empty() {
      Some("missing name")
    } else if self.contact_ids.is_empty() {
      Some("missing contact ids")
    } else {
      None
    }
  }
}
