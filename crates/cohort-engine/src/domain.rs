//! Email-domain classification.
//!
//! A heuristic scorer deciding whether a domain looks like an organisation's
//! own mail domain or a consumer mail provider. False positives and negatives
//! are expected; callers apply their own acceptance threshold.

use serde::Serialize;

/// Verdict of [`classify_domain`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainVerdict {
  pub is_likely_organization: bool,
  pub confidence:             f64,
  pub reason:                 String,
}

const CONSUMER_PROVIDERS: &[&str] = &[
  // Major providers
  "gmail.com", "googlemail.com", "yahoo.com", "yahoo.co.uk", "hotmail.com",
  "outlook.com", "live.com", "msn.com", "icloud.com", "me.com", "mac.com",
  "aol.com",
  // International providers
  "yandex.com", "yandex.ru", "mail.ru", "163.com", "126.com", "qq.com",
  "gmx.com", "gmx.de", "gmx.net", "web.de", "t-online.de", "orange.fr",
  "free.fr", "laposte.net", "libero.it",
  // Privacy-oriented providers
  "protonmail.com", "proton.me", "tutanota.com", "fastmail.com", "hey.com",
  "zoho.com",
];

const BUSINESS_TLDS: &[&str] = &[
  "com", "org", "net", "io", "co", "biz", "edu", "gov", "ai", "tech",
];

const PERSONAL_TOKENS: &[&str] = &["personal", "home", "family", "private"];

const BASE_CONFIDENCE: f64 = 0.5;
const CONSUMER_CONFIDENCE: f64 = 0.95;
const ORGANIZATION_CUTOFF: f64 = 0.6;

/// Classify a lower-cased email domain. Pure: the same input always yields
/// the same verdict.
pub fn classify_domain(domain: &str) -> DomainVerdict {
  if CONSUMER_PROVIDERS.contains(&domain) {
    return DomainVerdict {
      is_likely_organization: false,
      confidence:             CONSUMER_CONFIDENCE,
      reason:                 "known consumer mail provider".into(),
    };
  }

  let mut confidence = BASE_CONFIDENCE;
  let mut reasons: Vec<&str> = Vec::new();

  let (label, tld) = match domain.rsplit_once('.') {
    Some((label, tld)) => (label, tld),
    None => (domain, ""),
  };

  if BUSINESS_TLDS.contains(&tld) {
    confidence += 0.2;
    reasons.push("business tld");
  }

  if has_digit_run(domain) {
    confidence -= 0.3;
    reasons.push("digit run");
  }

  if !label.is_empty()
    && label.chars().count() <= 10
    && !label.contains(['-', '_'])
  {
    confidence += 0.1;
    reasons.push("short clean label");
  }

  if PERSONAL_TOKENS.iter().any(|t| domain.contains(t)) {
    confidence -= 0.4;
    reasons.push("personal token");
  }

  let confidence = confidence.clamp(0.0, 1.0);
  let reason = if reasons.is_empty() {
    "no distinguishing signal".to_owned()
  } else {
    reasons.join(", ")
  };

  DomainVerdict {
    is_likely_organization: confidence > ORGANIZATION_CUTOFF,
    confidence,
    reason,
  }
}

/// Two or more consecutive ASCII digits anywhere in the domain.
fn has_digit_run(domain: &str) -> bool {
  domain
    .as_bytes()
    .windows(2)
    .any(|w| w[0].is_ascii_digit() && w[1].is_ascii_digit())
}

/// Human-facing company name derived from a domain: the first label, split
/// on `-`/`_` and title-cased. `mailhost-corp.com` becomes `Mailhost Corp`.
pub fn company_name_from_domain(domain: &str) -> String {
  let label = domain.split('.').next().unwrap_or(domain);
  label
    .split(['-', '_'])
    .filter(|part| !part.is_empty())
    .map(|part| {
      let mut chars = part.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn consumer_providers_are_rejected_with_high_confidence() {
    let v = classify_domain("gmail.com");
    assert!(!v.is_likely_organization);
    assert_eq!(v.confidence, 0.95);
  }

  #[test]
  fn short_business_domain_is_organization() {
    let v = classify_domain("acme.com");
    assert!(v.is_likely_organization);
    assert!((v.confidence - 0.8).abs() < 1e-9);
  }

  #[test]
  fn hyphenated_business_domain_passes_on_tld_alone() {
    let v = classify_domain("mailhost-corp.com");
    assert!(v.is_likely_organization);
    assert!((v.confidence - 0.7).abs() < 1e-9);
  }

  #[test]
  fn digit_runs_are_penalised() {
    let v = classify_domain("user1984.com");
    assert!(!v.is_likely_organization);
    assert!((v.confidence - 0.5).abs() < 1e-9);

    // A single digit is not a run.
    assert!(classify_domain("web3.io").is_likely_organization);
  }

  #[test]
  fn personal_tokens_are_penalised() {
    let v = classify_domain("smithfamily.net");
    assert!(!v.is_likely_organization);
    assert!(v.reason.contains("personal token"));
  }

  #[test]
  fn unusual_tld_without_other_signals_is_not_enough() {
    let v = classify_domain("acme.example");
    assert!((v.confidence - 0.6).abs() < 1e-9);
    assert!(!v.is_likely_organization);
  }

  #[test]
  fn confidence_is_clamped() {
    let v = classify_domain("my-home-family-99.xyz");
    assert!(v.confidence >= 0.0);
    assert!(v.confidence <= 1.0);
  }

  #[test]
  fn classification_is_pure() {
    for domain in ["acme.com", "gmail.com", "home123.net", "x.y"] {
      assert_eq!(classify_domain(domain), classify_domain(domain));
    }
  }

  #[test]
  fn company_names_are_title_cased_from_the_first_label() {
    assert_eq!(company_name_from_domain("mailhost-corp.com"), "Mailhost Corp");
    assert_eq!(company_name_from_domain("acme.co.uk"), "Acme");
  }
}
