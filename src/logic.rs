//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting a quiz (or short-circuiting through a name override)
//!   - Validating a client-carried session and recording one answer
//!   - Finalizing a result: clamp, classify, place on the chart

use tracing::{info, instrument, warn};

use crate::chart::plot;
use crate::classifier::classify;
use crate::domain::{FinalScores, OverrideRule, ScoreVector};
use crate::engine::{Advance, Session};
use crate::error::{QuizError, Result};
use crate::protocol::{to_out, QuizInfoOut, ResultOut, StartOut, StepOut};
use crate::state::AppState;
use crate::util::trunc_for_log;

pub fn quiz_info(state: &AppState) -> QuizInfoOut {
  QuizInfoOut {
    traits: state.bank.traits().to_vec(),
    answers: state.bank.scale().labels(),
    question_count: state.bank.questions().len(),
  }
}

/// Fresh session plus its first question, or an immediate result for an override name.
#[instrument(level = "info", skip(state, name), fields(has_name = name.is_some()))]
pub fn start_quiz(state: &AppState, name: Option<&str>) -> Result<StartOut> {
  if let Some(rule) = name.and_then(|n| state.bank.find_override(n)) {
    info!(target: "quiz", name = %trunc_for_log(&rule.name, 32), label = %rule.label, "Override rule matched; skipping questions");
    return Ok(StartOut::Overridden { result: override_result(state, rule)? });
  }

  let engine = state.engine();
  let session = engine.start(&mut rand::thread_rng())?;
  let question = engine
    .current_question(&session)?
    .map(|c| to_out(&c))
    .ok_or_else(|| QuizError::InvalidConfiguration("new session has no first question".into()))?;
  Ok(StartOut::InProgress { session, question })
}

/// Record one answer. The session is only modified when the answer is accepted.
#[instrument(level = "info", skip(state, session, answer), fields(session = %session.id, position = session.position))]
pub fn submit_answer(state: &AppState, session: &mut Session, answer: &str) -> Result<StepOut> {
  let engine = state.engine();
  engine.validate(session)?;
  let step = match engine.advance(session, answer)? {
    Advance::Next(c) => StepOut::Question { question: to_out(&c) },
    Advance::Finished => StepOut::Finished { total: session.total() },
  };
  Ok(step)
}

/// Clamp, classify and plot a completed session.
#[instrument(level = "info", skip(state, session), fields(session = %session.id))]
pub fn finish_quiz(state: &AppState, session: &Session) -> Result<ResultOut> {
  let engine = state.engine();
  engine.validate(session)?;
  if !session.is_complete() {
    warn!(target: "quiz", session = %session.id, position = session.position, total = session.total(), "Result requested before completion");
    return Err(QuizError::InvalidSession(format!(
      "quiz not complete: {}/{} answered",
      session.position,
      session.total()
    )));
  }
  let result = build_result(state, session.scores.clamped(), None)?;
  info!(target: "quiz", session = %session.id, labels = ?result.labels, "Result served");
  Ok(result)
}

fn override_result(state: &AppState, rule: &OverrideRule) -> Result<ResultOut> {
  let mut raw = ScoreVector::zeroed(state.bank.traits());
  for (trait_key, v) in &rule.scores {
    let slot = raw
      .get_mut(trait_key)
      .ok_or_else(|| QuizError::unknown_trait(trait_key, format!("override '{}'", rule.name)))?;
    *slot = *v;
  }
  build_result(state, raw.clamped(), Some(rule.label.clone()))
}

fn build_result(state: &AppState, scores: FinalScores, forced_label: Option<String>) -> Result<ResultOut> {
  let bank = &state.bank;
  let overridden = forced_label.is_some();
  let labels = match forced_label {
    Some(label) => vec![label],
    None => classify(&scores, bank.meta_rules(), bank.fallback_label(), bank.max_meta_labels())?,
  };
  let chart = plot(bank.chart(), &scores)?;
  Ok(ResultOut { labels, scores, chart, overridden })
}
