//! Quiz engine: shuffled question order, position, and the running score vector.
//!
//! The engine is stateless. A `Session` value is created by `start` and handed back
//! to every later call, so two players can never touch each other's scores.
//!
//! Phases: NotStarted (no session) → InProgress → Complete.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::bank::QuizBank;
use crate::domain::{Question, ScoreVector};
use crate::error::{QuizError, Result};
use crate::util::{fill_template, trunc_for_log};

const PROMPT_TEMPLATE: &str = "Q{n}/{total}: {text}";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  NotStarted,
  InProgress,
  Complete,
}

/// One player's run through the quiz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub id: Uuid,
  pub question_order: Vec<String>,
  pub position: usize,
  pub scores: ScoreVector,
}

impl Session {
  pub fn phase(&self) -> Phase {
    if self.is_complete() { Phase::Complete } else { Phase::InProgress }
  }

  pub fn is_complete(&self) -> bool {
    self.position >= self.question_order.len()
  }

  pub fn total(&self) -> usize {
    self.question_order.len()
  }
}

/// Phase of an optional session; `None` means nothing has been started yet.
pub fn phase_of(session: Option<&Session>) -> Phase {
  session.map_or(Phase::NotStarted, Session::phase)
}

/// The question a player should see next.
#[derive(Clone, Copy, Debug)]
pub struct CurrentQuestion<'b> {
  /// 1-based.
  pub number: usize,
  pub total: usize,
  pub question: &'b Question,
}

impl CurrentQuestion<'_> {
  pub fn prompt(&self) -> String {
    fill_template(
      PROMPT_TEMPLATE,
      &[
        ("n", &self.number.to_string()),
        ("total", &self.total.to_string()),
        ("text", &self.question.text),
      ],
    )
  }
}

#[derive(Clone, Copy, Debug)]
pub enum Advance<'b> {
  Next(CurrentQuestion<'b>),
  Finished,
}

#[derive(Clone, Copy, Debug)]
pub struct QuizEngine<'b> {
  bank: &'b QuizBank,
}

impl<'b> QuizEngine<'b> {
  pub fn new(bank: &'b QuizBank) -> Self {
    Self { bank }
  }

  /// Fresh session: uniformly shuffled order, position 0, zeroed scores.
  #[instrument(level = "info", skip_all)]
  pub fn start<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Session> {
    if self.bank.questions().is_empty() {
      return Err(QuizError::InvalidConfiguration("question set is empty".into()));
    }
    let mut question_order: Vec<String> = self.bank.questions().iter().map(|q| q.id.clone()).collect();
    question_order.shuffle(rng);

    let session = Session {
      id: Uuid::new_v4(),
      question_order,
      position: 0,
      scores: ScoreVector::zeroed(self.bank.traits()),
    };
    info!(target: "quiz", session = %session.id, total = session.total(), "Quiz started");
    Ok(session)
  }

  /// `None` once the session is complete.
  pub fn current_question(&self, session: &Session) -> Result<Option<CurrentQuestion<'b>>> {
    if session.is_complete() {
      return Ok(None);
    }
    let id = &session.question_order[session.position];
    let question = self
      .bank
      .question(id)
      .ok_or_else(|| QuizError::InvalidSession(format!("unknown question id '{}'", id)))?;
    Ok(Some(CurrentQuestion { number: session.position + 1, total: session.total(), question }))
  }

  /// Record one answer for the current question. On any error the session is untouched.
  #[instrument(
    level = "debug",
    skip(self, session, answer),
    fields(session = %session.id, position = session.position, answer = %trunc_for_log(answer, 48))
  )]
  pub fn advance(&self, session: &mut Session, answer: &str) -> Result<Advance<'b>> {
    let current = match self.current_question(session)? {
      Some(c) => c,
      None => return Err(QuizError::InvalidAnswer("quiz is not in progress".into())),
    };
    let value = self.bank.scale().value_of(answer).ok_or_else(|| {
      warn!(target: "quiz", session = %session.id, answer = %trunc_for_log(answer, 48), "Rejected unknown answer label");
      QuizError::InvalidAnswer(format!("'{}' is not one of the answer options", trunc_for_log(answer, 48)))
    })?;

    // Check every trait before touching any score.
    let norm = self.bank.normalization();
    let mut deltas = Vec::with_capacity(current.question.contributions.len());
    for c in &current.question.contributions {
      if session.scores.get(&c.trait_key).is_none() {
        return Err(QuizError::unknown_trait(&c.trait_key, format!("question '{}'", current.question.id)));
      }
      deltas.push((c.trait_key.as_str(), value * c.weight / norm));
    }
    for (trait_key, delta) in deltas {
      if let Some(score) = session.scores.get_mut(trait_key) {
        *score += delta;
      }
    }
    session.position += 1;
    debug!(target: "quiz", session = %session.id, question = %current.question.id, value, "Answer recorded");

    match self.current_question(session)? {
      Some(next) => Ok(Advance::Next(next)),
      None => {
        info!(target: "quiz", session = %session.id, "Quiz complete");
        Ok(Advance::Finished)
      }
    }
  }

  /// Check a client-carried session against this bank before using it.
  pub fn validate(&self, session: &Session) -> Result<()> {
    let questions = self.bank.questions();
    if session.question_order.len() != questions.len() {
      return Err(QuizError::InvalidSession(format!(
        "question order has {} entries, bank has {}",
        session.question_order.len(),
        questions.len()
      )));
    }
    let mut seen = std::collections::HashSet::with_capacity(questions.len());
    for id in &session.question_order {
      if self.bank.question(id).is_none() || !seen.insert(id.as_str()) {
        return Err(QuizError::InvalidSession(format!("question order is not a permutation (at '{}')", id)));
      }
    }
    if session.position > session.question_order.len() {
      return Err(QuizError::InvalidSession("position past the end of the quiz".into()));
    }
    let traits = self.bank.traits();
    if session.scores.0.len() != traits.len() || traits.iter().any(|t| session.scores.get(t).is_none()) {
      return Err(QuizError::InvalidSession("score keys do not match the trait set".into()));
    }
    if session.scores.0.values().any(|v| !v.is_finite()) {
      return Err(QuizError::InvalidSession("non-finite score".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;
  use crate::test_fixtures::{parts, question, six_by_six, STRONGLY_AGREE};

  fn run_all(engine: &QuizEngine<'_>, session: &mut Session, answer_for: impl Fn(&str) -> &'static str) {
    while let Some(cur) = engine.current_question(session).unwrap() {
      let id = cur.question.id.clone();
      engine.advance(session, answer_for(&id)).unwrap();
    }
  }

  #[test]
  fn start_gives_fresh_permutation_and_zero_scores() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let s = engine.start(&mut StdRng::seed_from_u64(7)).unwrap();

    assert_eq!(s.position, 0);
    assert_eq!(s.phase(), Phase::InProgress);
    let mut ids = s.question_order.clone();
    ids.sort();
    assert_eq!(ids, vec!["q0", "q1", "q2", "q3", "q4", "q5"]);
    assert!(bank.traits().iter().all(|t| s.scores.get(t) == Some(0.0)));
    assert_eq!(phase_of(None), Phase::NotStarted);
  }

  #[test]
  fn restart_reshuffles() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let mut rng = StdRng::seed_from_u64(1);
    let orders: Vec<Vec<String>> = (0..20).map(|_| engine.start(&mut rng).unwrap().question_order).collect();
    assert!(orders.iter().any(|o| o != &orders[0]), "20 starts never reshuffled");
  }

  #[test]
  fn exactly_n_answers_complete_the_quiz() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let mut s = engine.start(&mut StdRng::seed_from_u64(3)).unwrap();

    for i in 0..6 {
      assert!(!s.is_complete());
      let step = engine.advance(&mut s, "Agree").unwrap();
      assert!(s.position <= s.total());
      match step {
        Advance::Next(cur) => assert_eq!(cur.number, i + 2),
        Advance::Finished => assert_eq!(i, 5),
      }
    }
    assert_eq!(s.phase(), Phase::Complete);
    assert_eq!(s.position, 6);
  }

  #[test]
  fn advancing_a_complete_session_is_rejected() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let mut s = engine.start(&mut StdRng::seed_from_u64(3)).unwrap();
    run_all(&engine, &mut s, |_| "Agree");

    let before = s.clone();
    let err = engine.advance(&mut s, "Agree").unwrap_err();
    assert!(matches!(err, QuizError::InvalidAnswer(_)));
    assert_eq!(s, before);
  }

  #[test]
  fn unknown_label_does_not_mutate() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let mut s = engine.start(&mut StdRng::seed_from_u64(9)).unwrap();
    engine.advance(&mut s, "Agree").unwrap();

    let before = s.clone();
    let err = engine.advance(&mut s, "Kinda").unwrap_err();
    assert!(matches!(err, QuizError::InvalidAnswer(_)));
    assert!(!err.is_fatal());
    assert_eq!(s, before);
  }

  #[test]
  fn oversized_answer_is_truncated_in_the_error() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let mut s = engine.start(&mut StdRng::seed_from_u64(10)).unwrap();

    let huge = "ü".repeat(4096);
    let err = engine.advance(&mut s, &huge).unwrap_err();
    assert!(matches!(err, QuizError::InvalidAnswer(_)));
    assert!(err.to_string().len() < 200, "{}", err);
    assert_eq!(s.position, 0);
  }

  #[test]
  fn all_strongly_agree_gives_five_sixths() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let mut s = engine.start(&mut StdRng::seed_from_u64(11)).unwrap();
    run_all(&engine, &mut s, |_| STRONGLY_AGREE);

    let fin = s.scores.clamped();
    for t in bank.traits() {
      let v = fin.get(t).unwrap();
      assert!((v - 5.0 / 6.0).abs() < 1e-12, "{t} = {v}");
    }
  }

  #[test]
  fn overshoot_is_kept_raw_and_clamped_on_read() {
    let qs = (0..3).map(|i| question(&format!("c{i}"), &[("clown", 1.0)])).collect();
    let bank = QuizBank::new(parts(&["clown", "hater"], qs, 6.0)).unwrap();
    let engine = QuizEngine::new(&bank);
    let mut s = engine.start(&mut StdRng::seed_from_u64(0)).unwrap();
    run_all(&engine, &mut s, |_| STRONGLY_AGREE);

    assert!((s.scores.get("clown").unwrap() - 2.5).abs() < 1e-12);
    assert_eq!(s.scores.clamped().get("clown"), Some(1.0));
    assert_eq!(s.scores.clamped().get("hater"), Some(0.0));
  }

  #[test]
  fn multi_trait_questions_apply_every_weight() {
    let qs = vec![question("mix", &[("clown", 2.0), ("hater", 0.5)])];
    let bank = QuizBank::new(parts(&["clown", "hater"], qs, 10.0)).unwrap();
    let engine = QuizEngine::new(&bank);
    let mut s = engine.start(&mut StdRng::seed_from_u64(0)).unwrap();
    engine.advance(&mut s, "Agree").unwrap();

    assert!((s.scores.get("clown").unwrap() - 0.8).abs() < 1e-12);
    assert!((s.scores.get("hater").unwrap() - 0.2).abs() < 1e-12);
  }

  #[test]
  fn question_order_does_not_change_totals() {
    let qs = vec![
      question("a", &[("clown", 1.5), ("hater", 1.0)]),
      question("b", &[("clown", 0.5)]),
      question("c", &[("hater", 3.0), ("clown", 1.0)]),
      question("d", &[("clown", 2.0)]),
    ];
    let bank = QuizBank::new(parts(&["clown", "hater"], qs, 18.0)).unwrap();
    let engine = QuizEngine::new(&bank);
    let answers: HashMap<&str, &'static str> =
      HashMap::from([("a", "Agree"), ("b", "Disagree"), ("c", STRONGLY_AGREE), ("d", "Slightly Agree")]);

    let mut totals = Vec::new();
    for seed in 0..8 {
      let mut s = engine.start(&mut StdRng::seed_from_u64(seed)).unwrap();
      run_all(&engine, &mut s, |id| answers[id]);
      totals.push(s.scores.clamped());
    }
    for t in &totals[1..] {
      for (k, v) in t.iter() {
        assert!((v - totals[0].get(k).unwrap()).abs() < 1e-12);
      }
    }
  }

  #[test]
  fn tampered_session_fails_validation() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let good = engine.start(&mut StdRng::seed_from_u64(5)).unwrap();
    assert!(engine.validate(&good).is_ok());

    let mut s = good.clone();
    s.question_order[0] = s.question_order[1].clone();
    assert!(matches!(engine.validate(&s), Err(QuizError::InvalidSession(_))));

    let mut s = good.clone();
    s.position = 7;
    assert!(engine.validate(&s).is_err());

    let mut s = good.clone();
    s.scores.0.remove("clown");
    assert!(engine.validate(&s).is_err());
  }

  #[test]
  fn missing_score_slot_is_an_unknown_trait() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let mut s = engine.start(&mut StdRng::seed_from_u64(5)).unwrap();
    s.scores.0.clear();
    let before = s.clone();
    assert!(matches!(engine.advance(&mut s, "Agree"), Err(QuizError::UnknownTrait { .. })));
    assert_eq!(s, before);
  }

  #[test]
  fn prompt_is_one_indexed() {
    let bank = six_by_six();
    let engine = QuizEngine::new(&bank);
    let s = engine.start(&mut StdRng::seed_from_u64(2)).unwrap();
    let cur = engine.current_question(&s).unwrap().unwrap();
    assert_eq!(cur.prompt(), format!("Q1/6: {}", cur.question.text));
  }
}
