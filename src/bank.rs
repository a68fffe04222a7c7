//! The validated, immutable quiz bank shared by every session.
//!
//! All configuration checks happen once here, so the engine and the classifier can
//! treat a `QuizBank` as internally consistent. Any defect is fatal at startup.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::chart::ChartLayout;
use crate::domain::{LikertScale, MetaRule, OverrideRule, Question, TraitKey};
use crate::error::{QuizError, Result};

/// Label returned by the classifier when no meta rule matches.
pub const UNCLASSIFIED_LABEL: &str = "Yourself!";
/// How many matching meta types are surfaced at most.
pub const DEFAULT_MAX_META_LABELS: usize = 3;

/// Unvalidated pieces of a bank, as produced by config loading or built-in seeds.
#[derive(Clone, Debug)]
pub struct BankParts {
  pub traits: Vec<TraitKey>,
  pub questions: Vec<Question>,
  pub scale: LikertScale,
  pub normalization: f64,
  pub meta_rules: Vec<MetaRule>,
  pub fallback_label: String,
  pub max_meta_labels: usize,
  pub overrides: Vec<OverrideRule>,
  pub chart: ChartLayout,
}

#[derive(Clone, Debug)]
pub struct QuizBank {
  parts: BankParts,
  by_id: HashMap<String, usize>,
}

impl QuizBank {
  #[instrument(level = "debug", skip_all, fields(traits = parts.traits.len(), questions = parts.questions.len()))]
  pub fn new(parts: BankParts) -> Result<Self> {
    let traits = check_traits(&parts.traits)?;
    let by_id = check_questions(&parts.questions, &traits)?;
    check_scale(&parts.scale)?;

    if !parts.normalization.is_finite() || parts.normalization <= 0.0 {
      return Err(QuizError::InvalidConfiguration(format!(
        "normalization must be a positive number, got {}",
        parts.normalization
      )));
    }
    if parts.fallback_label.trim().is_empty() {
      return Err(QuizError::InvalidConfiguration("fallback label is empty".into()));
    }
    if parts.max_meta_labels == 0 {
      return Err(QuizError::InvalidConfiguration("max_meta_labels must be at least 1".into()));
    }

    for rule in &parts.meta_rules {
      if rule.label.trim().is_empty() {
        return Err(QuizError::InvalidConfiguration("meta rule with empty label".into()));
      }
      for (t, threshold) in &rule.thresholds {
        if !traits.contains(t.as_str()) {
          return Err(QuizError::unknown_trait(t, format!("meta rule '{}'", rule.label)));
        }
        if !threshold.is_finite() || *threshold < 0.0 {
          return Err(QuizError::InvalidConfiguration(format!(
            "meta rule '{}' has invalid threshold {} for '{}'",
            rule.label, threshold, t
          )));
        }
      }
    }

    for o in &parts.overrides {
      if o.name.trim().is_empty() {
        return Err(QuizError::InvalidConfiguration("override with empty name".into()));
      }
      if let Some(t) = o.scores.keys().find(|t| !traits.contains(t.as_str())) {
        return Err(QuizError::unknown_trait(t, format!("override '{}'", o.name)));
      }
    }

    if let Some(a) = parts.chart.axes.iter().find(|a| !traits.contains(a.trait_key.as_str())) {
      return Err(QuizError::unknown_trait(&a.trait_key, "chart axis"));
    }
    if !parts.chart.exponent.is_finite() || parts.chart.exponent <= 0.0 {
      return Err(QuizError::InvalidConfiguration("chart exponent must be positive".into()));
    }

    debug!(target: "quiz", rules = parts.meta_rules.len(), overrides = parts.overrides.len(), "Quiz bank validated");
    Ok(Self { parts, by_id })
  }

  pub fn traits(&self) -> &[TraitKey] { &self.parts.traits }
  pub fn questions(&self) -> &[Question] { &self.parts.questions }
  pub fn scale(&self) -> &LikertScale { &self.parts.scale }
  pub fn normalization(&self) -> f64 { self.parts.normalization }
  pub fn meta_rules(&self) -> &[MetaRule] { &self.parts.meta_rules }
  pub fn fallback_label(&self) -> &str { &self.parts.fallback_label }
  pub fn max_meta_labels(&self) -> usize { self.parts.max_meta_labels }
  pub fn chart(&self) -> &ChartLayout { &self.parts.chart }

  pub fn question(&self, id: &str) -> Option<&Question> {
    self.by_id.get(id).map(|&i| &self.parts.questions[i])
  }

  pub fn find_override(&self, player_name: &str) -> Option<&OverrideRule> {
    self.parts.overrides.iter().find(|o| o.matches(player_name))
  }
}

fn check_traits(traits: &[TraitKey]) -> Result<HashSet<&str>> {
  if traits.is_empty() {
    return Err(QuizError::InvalidConfiguration("trait set is empty".into()));
  }
  let mut seen = HashSet::new();
  for t in traits {
    if t.trim().is_empty() {
      return Err(QuizError::InvalidConfiguration("empty trait key".into()));
    }
    if !seen.insert(t.as_str()) {
      return Err(QuizError::InvalidConfiguration(format!("duplicate trait '{}'", t)));
    }
  }
  Ok(seen)
}

fn check_questions(questions: &[Question], traits: &HashSet<&str>) -> Result<HashMap<String, usize>> {
  if questions.is_empty() {
    return Err(QuizError::InvalidConfiguration("question set is empty".into()));
  }
  let mut by_id = HashMap::with_capacity(questions.len());
  for (i, q) in questions.iter().enumerate() {
    if by_id.insert(q.id.clone(), i).is_some() {
      return Err(QuizError::InvalidConfiguration(format!("duplicate question id '{}'", q.id)));
    }
    if q.contributions.is_empty() {
      return Err(QuizError::InvalidConfiguration(format!("question '{}' has no traits", q.id)));
    }
    for c in &q.contributions {
      if !traits.contains(c.trait_key.as_str()) {
        return Err(QuizError::unknown_trait(&c.trait_key, format!("question '{}'", q.id)));
      }
      if !c.weight.is_finite() {
        return Err(QuizError::InvalidConfiguration(format!("question '{}' has a non-finite weight", q.id)));
      }
    }
  }
  Ok(by_id)
}

fn check_scale(scale: &LikertScale) -> Result<()> {
  if scale.options.len() != LikertScale::OPTION_COUNT {
    return Err(QuizError::InvalidConfiguration(format!(
      "answer scale needs {} options, got {}",
      LikertScale::OPTION_COUNT,
      scale.options.len()
    )));
  }
  let mut labels = HashSet::new();
  for o in &scale.options {
    if !o.value.is_finite() {
      return Err(QuizError::InvalidConfiguration(format!("answer '{}' has a non-finite value", o.label)));
    }
    if !labels.insert(o.label.as_str()) {
      return Err(QuizError::InvalidConfiguration(format!("duplicate answer label '{}'", o.label)));
    }
  }
  if scale.options.windows(2).any(|w| w[0].value <= w[1].value) {
    return Err(QuizError::InvalidConfiguration("answer scale must be strictly descending".into()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;
  use crate::chart::ChartAxis;
  use crate::domain::{LikertOption, TraitWeight};

  fn parts() -> BankParts {
    BankParts {
      traits: vec!["clown".into(), "hater".into()],
      questions: vec![Question {
        id: "q1".into(),
        text: "I laugh at my own jokes.".into(),
        contributions: vec![TraitWeight { trait_key: "clown".into(), weight: 1.0 }],
      }],
      scale: LikertScale {
        options: (0..6)
          .map(|i| LikertOption { label: format!("opt{i}"), value: 5.0 - i as f64 })
          .collect(),
      },
      normalization: 30.0,
      meta_rules: vec![],
      fallback_label: UNCLASSIFIED_LABEL.into(),
      max_meta_labels: DEFAULT_MAX_META_LABELS,
      overrides: vec![],
      chart: ChartLayout::default(),
    }
  }

  #[test]
  fn accepts_consistent_bank() {
    let bank = QuizBank::new(parts()).unwrap();
    assert_eq!(bank.question("q1").map(|q| q.text.as_str()), Some("I laugh at my own jokes."));
    assert!(bank.question("nope").is_none());
  }

  #[test]
  fn rejects_empty_question_set() {
    let mut p = parts();
    p.questions.clear();
    assert!(matches!(QuizBank::new(p), Err(QuizError::InvalidConfiguration(_))));
  }

  #[test]
  fn question_with_unknown_trait_fails_fast() {
    let mut p = parts();
    p.questions[0].contributions.push(TraitWeight { trait_key: "sender".into(), weight: 2.0 });
    let err = QuizBank::new(p).unwrap_err();
    assert_eq!(err, QuizError::unknown_trait("sender", "question 'q1'"));
    assert!(err.is_fatal());
  }

  #[test]
  fn meta_rule_with_unknown_trait_fails_fast() {
    let mut p = parts();
    p.meta_rules.push(MetaRule { label: "X".into(), thresholds: BTreeMap::from([("ghost".to_string(), 0.5)]) });
    assert!(matches!(QuizBank::new(p), Err(QuizError::UnknownTrait { .. })));
  }

  #[test]
  fn scale_must_have_six_descending_options() {
    let mut p = parts();
    p.scale.options.pop();
    assert!(matches!(QuizBank::new(p), Err(QuizError::InvalidConfiguration(_))));

    let mut p = parts();
    p.scale.options[2].value = 10.0;
    assert!(matches!(QuizBank::new(p), Err(QuizError::InvalidConfiguration(_))));
  }

  #[test]
  fn rejects_non_positive_normalization_and_unknown_axes() {
    let mut p = parts();
    p.normalization = 0.0;
    assert!(matches!(QuizBank::new(p), Err(QuizError::InvalidConfiguration(_))));

    let mut p = parts();
    p.chart.axes.push(ChartAxis { trait_key: "organizer".into(), low: [0.0, 0.0], high: [1.0, 1.0] });
    assert!(matches!(QuizBank::new(p), Err(QuizError::UnknownTrait { .. })));
  }

  #[test]
  fn duplicate_traits_and_ids_are_rejected() {
    let mut p = parts();
    p.traits.push("clown".into());
    assert!(QuizBank::new(p).is_err());

    let mut p = parts();
    let dup = p.questions[0].clone();
    p.questions.push(dup);
    assert!(QuizBank::new(p).is_err());
  }
}
