//! Contact: the read-only input record of the grouping engine.
//!
//! Contacts are owned by an external store. The engine reads them once per
//! invocation and never mutates them.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Coordinates {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self { latitude, longitude }
  }

  /// Both components are finite and inside the WGS84 ranges.
  pub fn is_valid(&self) -> bool {
    self.latitude.is_finite()
      && self.longitude.is_finite()
      && (-90.0..=90.0).contains(&self.latitude)
      && (-180.0..=180.0).contains(&self.longitude)
  }
}

/// A contact as delivered by the contact store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  /// Opaque identifier, stable across calls.
  pub id:           String,
  #[serde(default)]
  pub name:         String,
  #[serde(default)]
  pub email:        Option<String>,
  /// Free-text organisation name.
  #[serde(default)]
  pub company:      Option<String>,
  #[serde(default)]
  pub location:     Option<Coordinates>,
  /// When the contact was submitted. Keeps the offset it was recorded with.
  #[serde(default)]
  pub submitted_at: Option<DateTime<FixedOffset>>,
  #[serde(default)]
  pub created_at:   Option<DateTime<FixedOffset>>,
}

impl Contact {
  /// Convenience constructor with every optional field empty.
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id:           id.into(),
      name:         name.into(),
      email:        None,
      company:      None,
      location:     None,
      submitted_at: None,
      created_at:   None,
    }
  }

  /// The moment the contact entered the system: `submitted_at`, falling back
  /// to `created_at`.
  pub fn arrived_at(&self) -> Option<DateTime<FixedOffset>> {
    self.submitted_at.or(self.created_at)
  }

  /// Lower-cased domain part of the email address, if it has one that
  /// looks like a hostname.
  pub fn email_domain(&self) -> Option<String> {
    let email = self.email.as_deref()?.trim();
    let (_, domain) = email.rsplit_once('@')?;
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() || !domain.contains('.') {
      return None;
    }
    Some(domain)
  }

  /// Company name trimmed and lower-cased; `None` when absent or blank.
  pub fn normalized_company(&self) -> Option<String> {
    let company = self.company.as_deref()?.trim();
    if company.is_empty() {
      None
    } else {
      Some(company.to_lowercase())
    }
  }

  /// Coordinates, only when they are usable for distance computations.
  pub fn coordinates(&self) -> Option<Coordinates> {
    self.location.filter(Coordinates::is_valid)
  }
}
