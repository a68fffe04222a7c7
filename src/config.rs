//! Loading the quiz bank (traits, answer scale, questions, meta rules, chart) from TOML.
//!
//! Every section is optional. Sections that depend on the trait set (questions,
//! meta rules, chart axes) only fall back to the built-in bank when `traits` is
//! omitted too; a custom trait set must bring its own questions.
//!
//! ```toml
//! traits = ["clown", "hater"]
//! normalization = 18.0
//! fallback_label = "Yourself!"
//!
//! [[scale]]
//! label = "Strongly Agree"
//! value = 5.0
//! # ... six entries, descending
//!
//! [[questions]]
//! id = "q1"
//! text = "I make every meeting a bit."
//! traits = ["clown", "hater"]
//! weights = [2.0, 0.5]
//!
//! [[meta_rules]]
//! label = "Menace"
//! thresholds = { clown = 0.6, hater = 0.6 }
//! ```

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::bank::{BankParts, QuizBank, DEFAULT_MAX_META_LABELS, UNCLASSIFIED_LABEL};
use crate::chart::ChartLayout;
use crate::domain::{LikertOption, LikertScale, MetaRule, OverrideRule, Question, TraitWeight};
use crate::error::{QuizError, Result};
use crate::seeds;

/// Unknown keys are rejected so a misspelled section is not silently replaced by a default.
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct QuizConfig {
  #[serde(default)] pub traits: Option<Vec<String>>,
  #[serde(default)] pub normalization: Option<f64>,
  #[serde(default)] pub fallback_label: Option<String>,
  #[serde(default)] pub max_meta_labels: Option<usize>,
  #[serde(default)] pub scale: Option<Vec<LikertOption>>,
  #[serde(default)] pub questions: Option<Vec<QuestionCfg>>,
  #[serde(default)] pub meta_rules: Option<Vec<MetaRule>>,
  #[serde(default)] pub overrides: Vec<OverrideRule>,
  #[serde(default)] pub chart: Option<ChartLayout>,
}

/// A single value or a list of them, as written in the bank file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
  One(T),
  Many(Vec<T>),
}

/// Question entry accepted in TOML. `traits` and `weights` are either both scalars
/// or both lists of equal length.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionCfg {
  #[serde(default)] pub id: Option<String>,
  pub text: String,
  pub traits: OneOrMany<String>,
  pub weights: OneOrMany<f64>,
}

impl QuestionCfg {
  pub fn normalize(self) -> Result<Question> {
    let id = self.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let contributions = match (self.traits, self.weights) {
      (OneOrMany::One(trait_key), OneOrMany::One(weight)) => vec![TraitWeight { trait_key, weight }],
      (OneOrMany::Many(traits), OneOrMany::Many(weights)) => {
        if traits.len() != weights.len() {
          return Err(QuizError::InvalidConfiguration(format!(
            "question '{}' has {} traits but {} weights",
            id,
            traits.len(),
            weights.len()
          )));
        }
        traits
          .into_iter()
          .zip(weights)
          .map(|(trait_key, weight)| TraitWeight { trait_key, weight })
          .collect()
      }
      _ => {
        return Err(QuizError::InvalidConfiguration(format!(
          "question '{}' mixes a single trait with a weight list (or the reverse)",
          id
        )))
      }
    };
    Ok(Question { id, text: self.text, contributions })
  }
}

impl QuizConfig {
  /// Fill omitted sections from the built-in bank and normalize questions.
  pub fn into_parts(self) -> Result<BankParts> {
    let custom_traits = self.traits.is_some();
    let traits = self.traits.unwrap_or_else(seeds::default_traits);

    let questions = match self.questions {
      Some(qs) => qs.into_iter().map(QuestionCfg::normalize).collect::<Result<Vec<_>>>()?,
      None if custom_traits => Vec::new(),
      None => seeds::default_questions(),
    };
    let meta_rules = match self.meta_rules {
      Some(rules) => rules,
      None if custom_traits => Vec::new(),
      None => seeds::default_meta_rules(),
    };
    let chart = match self.chart {
      Some(chart) => chart,
      None if custom_traits => ChartLayout::default(),
      None => seeds::default_chart(),
    };

    // A custom scale without an explicit normalization is sized like the default one.
    let (scale, derived_norm) = match self.scale {
      Some(options) => {
        let scale = LikertScale { options };
        let norm = scale.max_value() * seeds::WEIGHT_PER_TRAIT;
        (scale, norm)
      }
      None => (seeds::default_scale(), seeds::DEFAULT_NORMALIZATION),
    };

    Ok(BankParts {
      traits,
      questions,
      scale,
      normalization: self.normalization.unwrap_or(derived_norm),
      meta_rules,
      fallback_label: self.fallback_label.unwrap_or_else(|| UNCLASSIFIED_LABEL.to_string()),
      max_meta_labels: self.max_meta_labels.unwrap_or(DEFAULT_MAX_META_LABELS),
      overrides: self.overrides,
      chart,
    })
  }
}

pub fn parse_quiz_config(s: &str) -> Result<QuizConfig> {
  toml::from_str::<QuizConfig>(s).map_err(|e| QuizError::InvalidConfiguration(format!("bad TOML: {}", e)))
}

/// Load `QuizConfig` from QUIZ_CONFIG_PATH. `Ok(None)` when the variable is unset;
/// an unreadable or unparsable file is a configuration error.
pub fn load_quiz_config_from_env() -> Result<Option<QuizConfig>> {
  let path = match std::env::var("QUIZ_CONFIG_PATH") {
    Ok(p) => p,
    Err(_) => return Ok(None),
  };
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_quiz_config(&s) {
      Ok(cfg) => {
        info!(target: "brainrot_quiz", %path, "Loaded quiz config (TOML)");
        Ok(Some(cfg))
      }
      Err(e) => {
        error!(target: "brainrot_quiz", %path, error = %e, "Failed to parse TOML config");
        Err(e)
      }
    },
    Err(e) => {
      error!(target: "brainrot_quiz", %path, error = %e, "Failed to read TOML config file");
      Err(QuizError::InvalidConfiguration(format!("cannot read {}: {}", path, e)))
    }
  }
}

/// Build the validated bank from an optional config (built-in bank when `None`).
pub fn build_bank(cfg: Option<QuizConfig>) -> Result<QuizBank> {
  QuizBank::new(cfg.unwrap_or_default().into_parts()?)
}
