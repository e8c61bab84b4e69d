//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Contact timestamps are stored as RFC 3339 strings with the offset they
//! were recorded in. Group collections are stored as compact JSON.

use chrono::{DateTime, FixedOffset, Utc};
use cohort_core::{
  contact::{Contact, Coordinates},
  group::Group,
};

use crate::{Error, Result};

// ─── DateTime
// ─────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_offset_dt(dt: DateTime<FixedOffset>) -> String { dt.to_rfc3339() }

pub fn decode_offset_dt(s: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(s).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Groups ──────────────────────────────────────────────────────────────────

pub fn encode_groups(groups: &[Group]) -> Result<String> {
  Ok(serde_json::to_string(groups)?)
}

pub fn decode_groups(s: &str) -> Result<Vec<Group>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub contact_id:   String,
  pub name:         String,
  pub email:        Option<String>,
  pub company:      Option<String>,
  pub latitude:     Option<f64>,
  pub longitude:    Option<f64>,
  pub submitted_at: Option<String>,
  pub created_at:   Option<String>,
}

impl RawContact {
  pub fn into_contact(self) -> Result<Contact> {
    let location = match (self.latitude, self.longitude) {
      (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
      _ => None,
    };

    Ok(Contact {
      id: self.contact_id,
      name: self.name,
      email: self.email,
      company: self.company,
      location,
      submitted_at: self.submitted_at.as_deref().map(decode_offset_dt).transpose()?,
      created_at: self.created_at.as_deref().map(decode_offset_dt).transpose()?,
    })
  }
}
