//! Caller-supplied knobs for a single grouping run.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;
pub const DEFAULT_MAX_GROUPS: usize = 15;

/// Which heuristics to run and how many groups to keep.
///
/// Every field is optional on the wire; missing fields take the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingOptions {
  pub group_by_company:  bool,
  pub group_by_time:     bool,
  pub group_by_location: bool,
  pub group_by_events:   bool,
  /// Smallest number of contacts an emitted group may hold.
  pub min_group_size:    usize,
  /// Cap on the number of groups returned after deduplication.
  pub max_groups:        usize,
}

impl Default for GroupingOptions {
  fn default() -> Self {
    Self {
      group_by_company:  true,
      group_by_time:     true,
      group_by_location: true,
      group_by_events:   true,
      min_group_size:    DEFAULT_MIN_GROUP_SIZE,
      max_groups:        DEFAULT_MAX_GROUPS,
    }
  }
}

impl GroupingOptions {
  pub fn validate(&self) -> Result<()> {
    if self.min_group_size == 0 {
      return Err(Error::InvalidOptions(
        "min_group_size must be at least 1".into(),
      ));
    }
    if self.max_groups == 0 {
      return Err(Error::InvalidOptions(
        "max_groups must be at least 1".into(),
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_fields_take_defaults() {
    let opts: GroupingOptions =
      serde_json::from_str(r#"{"group_by_time": false, "min_group_size": 3}"#)
        .unwrap();
    assert!(opts.group_by_company);
    assert!(!opts.group_by_time);
    assert!(opts.group_by_location);
    assert!(opts.group_by_events);
    assert_eq!(opts.min_group_size, 3);
    assert_eq!(opts.max_groups, DEFAULT_MAX_GROUPS);
  }

  #[test]
  fn zero_sizes_are_rejected() {
    let opts = GroupingOptions { min_group_size: 0, ..Default::default() };
    assert!(matches!(opts.validate(), Err(Error::InvalidOptions(_))));

    let opts = GroupingOptions { max_groups: 0, ..Default::default() };
    assert!(opts.validate().is_err());

    assert!(GroupingOptions::default().validate().is_ok());
  }
}
