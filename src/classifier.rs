//! Meta-type classification.
//!
//! A rule matches when every trait it constrains (non-zero threshold) is strictly
//! above that threshold. Matches keep rule-table order and are cut to `max_labels`.

use tracing::{debug, instrument};

use crate::domain::{FinalScores, MetaRule};
use crate::error::{QuizError, Result};

pub fn rule_matches(scores: &FinalScores, rule: &MetaRule) -> Result<bool> {
  for (trait_key, threshold) in rule.constrained() {
    let score = scores
      .get(trait_key)
      .ok_or_else(|| QuizError::unknown_trait(trait_key, format!("meta rule '{}'", rule.label)))?;
    if score <= threshold {
      return Ok(false);
    }
  }
  Ok(true)
}

/// Labels of the first `max_labels` matching rules, or `[fallback]` when none match.
#[instrument(level = "debug", skip(scores, rules), fields(rules = rules.len()))]
pub fn classify(scores: &FinalScores, rules: &[MetaRule], fallback: &str, max_labels: usize) -> Result<Vec<String>> {
  let mut labels = Vec::new();
  for rule in rules {
    // Rules past the cut are still checked for unknown traits.
    if rule_matches(scores, rule)? && labels.len() < max_labels {
      labels.push(rule.label.clone());
    }
  }
  if labels.is_empty() {
    labels.push(fallback.to_string());
  }
  debug!(target: "quiz", ?labels, "Classified");
  Ok(labels)
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;
  use crate::bank::UNCLASSIFIED_LABEL;
  use crate::domain::ScoreVector;
  use crate::test_fixtures::rule;

  fn scores(pairs: &[(&str, f64)]) -> FinalScores {
    ScoreVector(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect::<BTreeMap<_, _>>()).clamped()
  }

  fn base() -> FinalScores {
    scores(&[("clown", 0.9), ("hater", 0.7), ("grinder", 0.2), ("yapper", 0.5)])
  }

  #[test]
  fn single_matching_rule_is_returned_alone() {
    let rules = vec![
      rule("Menace", &[("clown", 0.8), ("hater", 0.6)]),
      rule("Workhorse", &[("grinder", 0.5)]),
      rule("Podcaster", &[("yapper", 0.9)]),
    ];
    let out = classify(&base(), &rules, UNCLASSIFIED_LABEL, 3).unwrap();
    assert_eq!(out, vec!["Menace"]);
  }

  #[test]
  fn no_match_yields_only_the_fallback() {
    let rules = vec![rule("Workhorse", &[("grinder", 0.5)])];
    let out = classify(&base(), &rules, UNCLASSIFIED_LABEL, 3).unwrap();
    assert_eq!(out, vec![UNCLASSIFIED_LABEL]);
    assert_eq!(classify(&base(), &[], "Nobody", 3).unwrap(), vec!["Nobody"]);
  }

  #[test]
  fn only_the_first_three_matches_are_kept_in_table_order() {
    let rules = vec![
      rule("E", &[("clown", 0.1)]),
      rule("D", &[("hater", 0.1)]),
      rule("skip", &[("grinder", 0.9)]),
      rule("C", &[("yapper", 0.1)]),
      rule("B", &[("clown", 0.2), ("yapper", 0.2)]),
      rule("A", &[("hater", 0.3)]),
    ];
    let out = classify(&base(), &rules, UNCLASSIFIED_LABEL, 3).unwrap();
    assert_eq!(out, vec!["E", "D", "C"]);
  }

  #[test]
  fn threshold_must_be_strictly_exceeded() {
    let rules = vec![rule("Edge", &[("yapper", 0.5)])];
    assert_eq!(classify(&base(), &rules, UNCLASSIFIED_LABEL, 3).unwrap(), vec![UNCLASSIFIED_LABEL]);
  }

  #[test]
  fn zero_thresholds_are_unconstrained() {
    let rules = vec![rule("Chill", &[("grinder", 0.0), ("clown", 0.0)])];
    assert_eq!(classify(&base(), &rules, UNCLASSIFIED_LABEL, 3).unwrap(), vec!["Chill"]);
  }

  #[test]
  fn clamped_overshoot_still_matches_near_one() {
    let s = scores(&[("clown", 3.0)]);
    assert_eq!(s.get("clown"), Some(1.0));
    let rules = vec![rule("Full Clown", &[("clown", 0.99)])];
    assert_eq!(classify(&s, &rules, UNCLASSIFIED_LABEL, 3).unwrap(), vec!["Full Clown"]);
  }

  #[test]
  fn rule_with_unknown_trait_is_fatal() {
    let rules = vec![rule("A", &[("clown", 0.1)]), rule("Ghost", &[("organizer", 0.1)])];
    let err = classify(&base(), &rules, UNCLASSIFIED_LABEL, 3).unwrap_err();
    assert!(matches!(err, QuizError::UnknownTrait { ref trait_key, .. } if trait_key == "organizer"));
    assert!(err.is_fatal());
  }
}
