//! Small banks shared by unit tests.

use std::collections::BTreeMap;

use crate::bank::{BankParts, QuizBank, DEFAULT_MAX_META_LABELS, UNCLASSIFIED_LABEL};
use crate::chart::ChartLayout;
use crate::domain::{LikertOption, LikertScale, MetaRule, Question, TraitWeight};

pub const STRONGLY_AGREE: &str = "Strongly Agree";

pub fn scale_5_to_0() -> LikertScale {
  LikertScale {
    options: [
      (STRONGLY_AGREE, 5.0),
      ("Agree", 4.0),
      ("Slightly Agree", 3.0),
      ("Slightly Disagree", 2.0),
      ("Disagree", 1.0),
      ("Strongly Disagree", 0.0),
    ]
    .into_iter()
    .map(|(label, value)| LikertOption { label: label.into(), value })
    .collect(),
  }
}

pub fn question(id: &str, pairs: &[(&str, f64)]) -> Question {
  Question {
    id: id.into(),
    text: format!("Statement {id}"),
    contributions: pairs
      .iter()
      .map(|(t, w)| TraitWeight { trait_key: (*t).into(), weight: *w })
      .collect(),
  }
}

pub fn rule(label: &str, thresholds: &[(&str, f64)]) -> MetaRule {
  MetaRule {
    label: label.into(),
    thresholds: thresholds.iter().map(|(t, v)| ((*t).to_string(), *v)).collect::<BTreeMap<_, _>>(),
  }
}

pub fn parts(traits: &[&str], questions: Vec<Question>, normalization: f64) -> BankParts {
  BankParts {
    traits: traits.iter().map(|t| t.to_string()).collect(),
    questions,
    scale: scale_5_to_0(),
    normalization,
    meta_rules: Vec::new(),
    fallback_label: UNCLASSIFIED_LABEL.into(),
    max_meta_labels: DEFAULT_MAX_META_LABELS,
    overrides: Vec::new(),
    chart: ChartLayout::default(),
  }
}

/// Six traits, one weight-1 question each, normalization 6.
pub fn six_by_six() -> QuizBank {
  let traits = ["clown", "hater", "grinder", "brick", "sender", "yapper"];
  let questions = traits
    .iter()
    .enumerate()
    .map(|(i, t)| question(&format!("q{i}"), &[(t, 1.0)]))
    .collect();
  QuizBank::new(parts(&traits, questions, 6.0)).expect("fixture bank is valid")
}
