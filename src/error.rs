//! Error kinds shared by the quiz engine, the classifier and bank loading.
//!
//! `InvalidConfiguration` and `UnknownTrait` are setup defects and abort startup.
//! `InvalidAnswer` and `InvalidSession` are caller mistakes and only reject the
//! single call that caused them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuizError {
  #[error("invalid configuration: {0}")]
  InvalidConfiguration(String),

  #[error("unknown trait '{trait_key}' referenced by {context}")]
  UnknownTrait { trait_key: String, context: String },

  #[error("invalid answer: {0}")]
  InvalidAnswer(String),

  #[error("invalid session: {0}")]
  InvalidSession(String),
}

impl QuizError {
  pub fn unknown_trait(trait_key: impl Into<String>, context: impl Into<String>) -> Self {
    QuizError::UnknownTrait { trait_key: trait_key.into(), context: context.into() }
  }

  /// Stable snake_case tag used in API error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      QuizError::InvalidConfiguration(_) => "invalid_configuration",
      QuizError::UnknownTrait { .. } => "unknown_trait",
      QuizError::InvalidAnswer(_) => "invalid_answer",
      QuizError::InvalidSession(_) => "invalid_session",
    }
  }

  /// Configuration defects are fatal; everything else is the caller's problem.
  pub fn is_fatal(&self) -> bool {
    matches!(self, QuizError::InvalidConfiguration(_) | QuizError::UnknownTrait { .. })
  }
}

pub type Result<T> = std::result::Result<T, QuizError>;
