//! Result chart geometry.
//!
//! Every trait owns one axis on the background image, given as a pixel segment from
//! its `low` end (score 0) to its `high` end (score 1). A score `r` lands at
//! `low + |high - low| * r^exponent` along that segment. The exponent pushes mid-range
//! scores toward the centre so only strong traits reach the outer ring.
//! Rendering the image itself is up to the frontend.

use serde::{Deserialize, Serialize};

use crate::domain::{FinalScores, TraitKey};
use crate::error::{QuizError, Result};

pub const DEFAULT_EXPONENT: f64 = 2.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartAxis {
  #[serde(rename = "trait")]
  pub trait_key: TraitKey,
  pub low: [f64; 2],
  pub high: [f64; 2],
}

impl ChartAxis {
  /// Axis as `(length, angle)` measured from the low end.
  pub fn polar(&self) -> (f64, f64) {
    let dx = self.high[0] - self.low[0];
    let dy = self.high[1] - self.low[1];
    (dx.hypot(dy), dy.atan2(dx))
  }

  pub fn place(&self, score: f64, exponent: f64) -> ChartPoint {
    let (len, angle) = self.polar();
    let reach = len * score.powf(exponent);
    ChartPoint {
      trait_key: self.trait_key.clone(),
      x: self.low[0] + reach * angle.cos(),
      y: self.low[1] + reach * angle.sin(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
  #[serde(default = "default_exponent")]
  pub exponent: f64,
  /// Polygon order: axes are drawn in this order, not in trait order.
  #[serde(default)]
  pub axes: Vec<ChartAxis>,
}

fn default_exponent() -> f64 { DEFAULT_EXPONENT }

impl Default for ChartLayout {
  fn default() -> Self {
    Self { exponent: DEFAULT_EXPONENT, axes: Vec::new() }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
  #[serde(rename = "trait")]
  pub trait_key: TraitKey,
  pub x: f64,
  pub y: f64,
}

/// Polygon vertices for a finished result, one per configured axis.
pub fn plot(layout: &ChartLayout, scores: &FinalScores) -> Result<Vec<ChartPoint>> {
  layout
    .axes
    .iter()
    .map(|axis| {
      let r = scores
        .get(&axis.trait_key)
        .ok_or_else(|| QuizError::unknown_trait(&axis.trait_key, "chart axis"))?;
      Ok(axis.place(r, layout.exponent))
    })
    .collect()
}
