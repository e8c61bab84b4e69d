//! Company grouping: explicit company names and shared organisation email
//! domains.
//!
//! Two signals are bucketed independently. A domain bucket that shares a
//! member with a company-name bucket is folded into it; otherwise it becomes
//! a group of its own.

use std::collections::{HashMap, HashSet};

use cohort_core::{
  contact::Contact,
  group::{Confidence, Group, GroupDetail, GroupMetadata, GroupSource, GroupType},
};

use crate::domain::{classify_domain, company_name_from_domain};

/// Domains must score strictly above this to form a bucket.
const DOMAIN_ACCEPT_CONFIDENCE: f64 = 0.6;
/// Confidence assigned to an explicit, user-entered company name.
const COMPANY_NAME_CONFIDENCE: f64 = 0.9;
/// Originating confidence above which a group is tagged `high`.
const HIGH_CONFIDENCE_CUTOFF: f64 = 0.8;

/// Contacts sharing one raw signal, before size filtering.
struct Bucket<'a> {
  /// Display label: the first spelling seen, or the domain itself.
  label:      String,
  members:    Vec<&'a Contact>,
  confidence: f64,
}

/// Insertion-ordered bucket map so output order follows the input.
#[derive(Default)]
struct Buckets<'a> {
  index:   HashMap<String, usize>,
  buckets: Vec<Bucket<'a>>,
}

impl<'a> Buckets<'a> {
  fn push(&mut self, key: String, label: &str, confidence: f64, contact: &'a Contact) {
    let idx = match self.index.get(&key) {
      Some(&idx) => idx,
      None => {
        self.buckets.push(Bucket {
          label: label.to_owned(),
          members: Vec::new(),
          confidence,
        });
        self.index.insert(key, self.buckets.len() - 1);
        self.buckets.len() - 1
      }
    };
    self.buckets[idx].members.push(contact);
  }

  fn into_sized(self, min_group_size: usize) -> Vec<Bucket<'a>> {
    self
      .buckets
      .into_iter()
      .filter(|b| b.members.len() >= min_group_size)
      .collect()
  }
}

/// A company group under construction.
struct Candidate {
  name:        String,
  contact_ids: Vec<String>,
  members:     HashSet<String>,
  sources:     Vec<GroupSource>,
  confidence:  f64,
  domain:      Option<String>,
}

impl Candidate {
  fn from_bucket(bucket: &Bucket<'_>, name: String, source: GroupSource) -> Self {
    let contact_ids: Vec<String> =
      bucket.members.iter().map(|c| c.id.clone()).collect();
    Self {
      name,
      members: contact_ids.iter().cloned().collect(),
      contact_ids,
      sources: vec![source],
      confidence: bucket.confidence,
      domain: None,
    }
  }

  fn overlaps(&self, bucket: &Bucket<'_>) -> bool {
    bucket.members.iter().any(|c| self.members.contains(&c.id))
  }

  fn into_group(self) -> Group {
    let count = self.contact_ids.len();
    let description = match &self.domain {
      Some(domain) if self.sources.contains(&GroupSource::CompanyName) => {
        format!("{count} contacts from {} (company name and @{domain})", self.name)
      }
      Some(domain) => format!("{count} contacts sharing the @{domain} email domain"),
      None => format!("{count} contacts from {}", self.name),
    };
    Group::generated(
      GroupType::Company,
      self.name.clone(),
      self.contact_ids,
      description,
      GroupMetadata {
        confidence:     Confidence::high_if(self.confidence > HIGH_CONFIDENCE_CUTOFF),
        sources:        self.sources,
        auto_generated: true,
        detail:         Some(GroupDetail::Company {
          company: self.name,
          domain:  self.domain,
        }),
      },
    )
  }
}

/// Group contacts by company name and organisation-looking email domain.
pub fn group_by_company(contacts: &[Contact], min_group_size: usize) -> Vec<Group> {
  let mut by_name = Buckets::default();
  let mut by_domain = Buckets::default();
  let mut verdicts: HashMap<String, f64> = HashMap::new();

  for contact in contacts {
    if let (Some(key), Some(raw)) = (contact.normalized_company(), contact.company.as_deref()) {
      by_name.push(key, raw.trim(), COMPANY_NAME_CONFIDENCE, contact);
    }

    let Some(domain) = contact.email_domain() else { continue };
    let confidence = *verdicts.entry(domain.clone()).or_insert_with(|| {
      let verdict = classify_domain(&domain);
      if verdict.is_likely_organization {
        verdict.confidence
      } else {
        0.0
      }
    });
    if confidence > DOMAIN_ACCEPT_CONFIDENCE {
      by_domain.push(domain.clone(), &domain, confidence, contact);
    }
  }

  let name_buckets = by_name.into_sized(min_group_size);
  let domain_buckets = by_domain.into_sized(min_group_size);

  let mut accepted: Vec<Candidate> = name_buckets
    .iter()
    .map(|b| Candidate::from_bucket(b, b.label.clone(), GroupSource::CompanyName))
    .collect();
  let name_group_count = accepted.len();

  // Every contact already placed in a company-name group.
  let mut claimed: HashSet<String> = accepted
    .iter()
    .flat_map(|c| c.members.iter().cloned())
    .collect();

  for bucket in &domain_buckets {
    let name = company_name_from_domain(&bucket.label);
    let name_key = name.to_lowercase();
    // Shared members first, then a group that would carry the same name.
    let target = accepted[..name_group_count]
      .iter()
      .position(|candidate| candidate.overlaps(bucket))
      .or_else(|| {
        accepted
          .iter()
          .position(|candidate| candidate.name.to_lowercase() == name_key)
      });

    match target {
      Some(idx) => {
        let candidate = &mut accepted[idx];
        for contact in &bucket.members {
          if claimed.insert(contact.id.clone()) {
            candidate.members.insert(contact.id.clone());
            candidate.contact_ids.push(contact.id.clone());
          }
        }
        if !candidate.sources.contains(&GroupSource::EmailDomain) {
          candidate.sources.push(GroupSource::EmailDomain);
        }
        candidate.confidence = candidate.confidence.max(bucket.confidence);
        candidate.domain.get_or_insert_with(|| bucket.label.clone());
      }
      None => {
        let mut candidate = Candidate::from_bucket(bucket, name, GroupSource::EmailDomain);
        candidate.domain = Some(bucket.label.clone());
        claimed.extend(candidate.members.iter().cloned());
        accepted.push(candidate);
      }
    }
  }

  tracing::debug!(
    name_buckets = name_group_count,
    domain_buckets = domain_buckets.len(),
    groups = accepted.len(),
    "company grouping finished"
  );

  accepted.into_iter().map(Candidate::into_group).collect()
}
