//! Domain models: traits, questions, the Likert scale, meta rules and score vectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable string key of one personality axis (e.g. "clown", "yapper").
pub type TraitKey = String;

/// One `(trait, weight)` contribution of a question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitWeight {
  #[serde(rename = "trait")]
  pub trait_key: TraitKey,
  pub weight: f64,
}

/// A question after normalization: always at least one contribution, in config order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub text: String,
  pub contributions: Vec<TraitWeight>,
}

/// One answer option of the Likert scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LikertOption {
  pub label: String,
  pub value: f64,
}

/// Exactly six options, strictly descending by value (checked when the bank is built).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LikertScale {
  pub options: Vec<LikertOption>,
}

impl LikertScale {
  pub const OPTION_COUNT: usize = 6;

  pub fn value_of(&self, label: &str) -> Option<f64> {
    self.options.iter().find(|o| o.label == label).map(|o| o.value)
  }

  pub fn labels(&self) -> Vec<String> {
    self.options.iter().map(|o| o.label.clone()).collect()
  }

  /// Highest value on the scale (the first option).
  pub fn max_value(&self) -> f64 {
    self.options.iter().map(|o| o.value).fold(f64::NEG_INFINITY, f64::max)
  }
}

/// Named meta type. A threshold of 0 means the trait is not required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaRule {
  pub label: String,
  #[serde(default)]
  pub thresholds: BTreeMap<TraitKey, f64>,
}

impl MetaRule {
  /// Traits this rule actually constrains.
  pub fn constrained(&self) -> impl Iterator<Item = (&TraitKey, f64)> {
    self.thresholds.iter().filter(|(_, t)| **t != 0.0).map(|(k, t)| (k, *t))
  }
}

/// Player name that skips the questions and lands on a preset result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
  pub name: String,
  pub label: String,
  #[serde(default)]
  pub scores: BTreeMap<TraitKey, f64>,
}

impl OverrideRule {
  pub fn matches(&self, player_name: &str) -> bool {
    self.name.trim().eq_ignore_ascii_case(player_name.trim())
  }
}

/// Raw per-trait accumulators. Unclamped: intermediate overshoot is allowed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreVector(pub BTreeMap<TraitKey, f64>);

impl ScoreVector {
  pub fn zeroed<'a>(traits: impl IntoIterator<Item = &'a TraitKey>) -> Self {
    Self(traits.into_iter().map(|t| (t.clone(), 0.0)).collect())
  }

  pub fn get(&self, trait_key: &str) -> Option<f64> {
    self.0.get(trait_key).copied()
  }

  pub fn get_mut(&mut self, trait_key: &str) -> Option<&mut f64> {
    self.0.get_mut(trait_key)
  }

  /// Clamp every value into `[0.0, 1.0]` for display or classification.
  pub fn clamped(&self) -> FinalScores {
    FinalScores(self.0.iter().map(|(k, v)| (k.clone(), clamp_unit(*v))).collect())
  }
}

/// Scores guaranteed to lie in `[0.0, 1.0]`. Only built through `ScoreVector::clamped`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FinalScores(BTreeMap<TraitKey, f64>);

impl FinalScores {
  pub fn get(&self, trait_key: &str) -> Option<f64> {
    self.0.get(trait_key).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&TraitKey, f64)> {
    self.0.iter().map(|(k, v)| (k, *v))
  }
}

fn clamp_unit(v: f64) -> f64 {
  // NaN only shows up from a broken bank; treat it as "no signal".
  if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
