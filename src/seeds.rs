//! Built-in quiz bank: the eight brainrot traits, the default answer scale,
//! questions, meta types and the chart axes of the stock background image.
//!
//! Used whenever QUIZ_CONFIG_PATH does not override a section.

use std::collections::BTreeMap;

use crate::chart::{ChartAxis, ChartLayout, DEFAULT_EXPONENT};
use crate::domain::{LikertOption, LikertScale, MetaRule, Question, TraitWeight};

/// Total question weight per trait that the default normalization is sized for.
pub const WEIGHT_PER_TRAIT: f64 = 6.0;

/// `max(scale) * WEIGHT_PER_TRAIT`: a trait whose questions carry a total weight of 6 tops out at 1.0.
pub const DEFAULT_NORMALIZATION: f64 = 30.0;

pub fn default_traits() -> Vec<String> {
  ["clown", "hater", "grinder", "brick", "sender", "yapper", "instigator", "organizer"]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_scale() -> LikertScale {
  LikertScale {
    options: [
      ("Strongly Agree", 5.0),
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

fn q(id: &str, text: &str, pairs: &[(&str, f64)]) -> Question {
  Question {
    id: id.into(),
    text: text.into(),
    contributions: pairs
      .iter()
      .map(|(t, w)| TraitWeight { trait_key: (*t).into(), weight: *w })
      .collect(),
  }
}

pub fn default_questions() -> Vec<Question> {
  vec![
    q("clown_1", "I would rather get a laugh than be right.", &[("clown", 2.0)]),
    q("clown_2", "My group chat would be dead without my memes.", &[("clown", 2.0), ("sender", 0.5)]),
    q("clown_3", "I have tripped on purpose to make a room laugh.", &[("clown", 1.5)]),
    q("hater_1", "Most popular things are overrated.", &[("hater", 2.0)]),
    q("hater_2", "I can find a flaw in anything within five seconds.", &[("hater", 2.0), ("instigator", 0.5)]),
    q("hater_3", "I enjoy reading bad reviews more than good ones.", &[("hater", 1.5)]),
    q("grinder_1", "Rest days make me feel guilty.", &[("grinder", 2.0)]),
    q("grinder_2", "I have a spreadsheet tracking my own habits.", &[("grinder", 1.5), ("organizer", 1.0)]),
    q("grinder_3", "I will stay up late to finish something nobody asked for.", &[("grinder", 2.0)]),
    q("brick_1", "People tell me I am hard to read.", &[("brick", 2.0)]),
    q("brick_2", "Very little gets a reaction out of me.", &[("brick", 2.0)]),
    q("brick_3", "I answer texts with a single letter.", &[("brick", 1.5), ("yapper", -0.5)]),
    q("sender_1", "If someone dares me, I am doing it.", &[("sender", 2.0)]),
    q("sender_2", "I commit to plans before thinking them through.", &[("sender", 2.0), ("organizer", -0.5)]),
    q("sender_3", "Speed limits are more of a suggestion.", &[("sender", 1.5)]),
    q("yapper_1", "I have talked for an hour about something I just learned.", &[("yapper", 2.0)]),
    q("yapper_2", "Silence in a conversation makes me fill it.", &[("yapper", 2.0)]),
    q("yapper_3", "I send voice notes longer than three minutes.", &[("yapper", 2.0), ("clown", 0.5)]),
    q("instigator_1", "I ask questions just to see people argue.", &[("instigator", 2.0), ("hater", 0.5)]),
    q("instigator_2", "I know exactly what to say to start drama.", &[("instigator", 2.0)]),
    q("instigator_3", "A calm group chat is a boring group chat.", &[("instigator", 1.5), ("sender", 0.5)]),
    q("organizer_1", "I am the one who makes the plans for the group.", &[("organizer", 2.0)]),
    q("organizer_2", "My calendar is colour coded.", &[("organizer", 2.0), ("grinder", 0.5)]),
    q("organizer_3", "I notice when something is out of place.", &[("organizer", 1.5), ("brick", 0.5)]),
  ]
}

fn rule(label: &str, thresholds: &[(&str, f64)]) -> MetaRule {
  MetaRule {
    label: label.into(),
    thresholds: thresholds.iter().map(|(t, v)| ((*t).to_string(), *v)).collect::<BTreeMap<_, _>>(),
  }
}

/// Ordered by preference: the first matches are the ones shown.
pub fn default_meta_rules() -> Vec<MetaRule> {
  vec![
    rule("Chaos Agent", &[("instigator", 0.6), ("sender", 0.6), ("clown", 0.4)]),
    rule("Menace to Society", &[("hater", 0.6), ("instigator", 0.6)]),
    rule("Podcast Host", &[("yapper", 0.6), ("clown", 0.5)]),
    rule("Silent Operator", &[("brick", 0.6), ("grinder", 0.6)]),
    rule("Main Character", &[("sender", 0.6), ("yapper", 0.5)]),
    rule("Group Chat Admin", &[("organizer", 0.6), ("yapper", 0.4)]),
    rule("Sigma", &[("grinder", 0.7), ("brick", 0.4)]),
    rule("Court Jester", &[("clown", 0.7)]),
    rule("Critic", &[("hater", 0.7)]),
  ]
}

fn axis(t: &str, low: [f64; 2], high: [f64; 2]) -> ChartAxis {
  ChartAxis { trait_key: t.into(), low, high }
}

/// Pixel axes of the stock 8-spoke background image, clockwise from the left.
pub fn default_chart() -> ChartLayout {
  ChartLayout {
    exponent: DEFAULT_EXPONENT,
    axes: vec![
      axis("clown", [253.0, 210.0], [115.0, 152.0]),
      axis("instigator", [290.0, 171.0], [233.0, 34.0]),
      axis("hater", [345.0, 171.0], [402.0, 34.0]),
      axis("grinder", [383.0, 210.0], [520.0, 152.0]),
      axis("brick", [383.0, 264.0], [520.0, 321.0]),
      axis("organizer", [345.0, 302.0], [402.0, 439.0]),
      axis("yapper", [290.0, 302.0], [233.0, 439.0]),
      axis("sender", [253.0, 264.0], [115.0, 321.0]),
    ],
  }
}
