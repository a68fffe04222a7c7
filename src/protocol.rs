//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chart::ChartPoint;
use crate::domain::FinalScores;
use crate::engine::{CurrentQuestion, Session};
use crate::error::{QuizError, Result};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Start {
        #[serde(default)]
        name: Option<String>,
    },
    Answer {
        answer: String,
    },
    Result,
    Reset,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Question {
        question: QuestionOut,
    },
    Finished {
        total: usize,
    },
    Result {
        result: ResultOut,
    },
    Reset,
    Error {
        kind: String,
        message: String,
    },
}

/// DTO used by both WS and HTTP for question delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionOut {
    pub id: String,
    pub number: usize,
    pub total: usize,
    pub text: String,
    /// Display line, e.g. "Q3/24: ...".
    pub prompt: String,
}

pub fn to_out(c: &CurrentQuestion<'_>) -> QuestionOut {
    QuestionOut {
        id: c.question.id.clone(),
        number: c.number,
        total: c.total,
        text: c.question.text.clone(),
        prompt: c.prompt(),
    }
}

/// What follows an answer.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOut {
    Question { question: QuestionOut },
    Finished { total: usize },
}

/// Final, display-ready result.
#[derive(Debug, Serialize)]
pub struct ResultOut {
    pub labels: Vec<String>,
    /// Clamped to [0, 1].
    pub scores: FinalScores,
    /// Polygon vertices on the background image, in axis order.
    pub chart: Vec<ChartPoint>,
    /// True when a name override skipped the questions.
    pub overridden: bool,
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct QuizInfoOut {
    pub traits: Vec<String>,
    pub answers: Vec<String>,
    pub question_count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartIn {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartOut {
    InProgress { session: Session, question: QuestionOut },
    Overridden { result: ResultOut },
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub session: Session,
    pub answer: String,
}

impl AnswerIn {
    /// Field-by-field decode so a bad session and a missing selection map to quiz errors.
    pub fn from_value(mut body: Value) -> Result<Self> {
        let session = session_from(&mut body)?;
        let answer = match body.get_mut("answer").map(Value::take) {
            Some(Value::String(a)) => a,
            Some(Value::Null) | None => return Err(QuizError::InvalidAnswer("no answer selected".into())),
            Some(other) => {
                return Err(QuizError::InvalidAnswer(format!("answer must be a label string, got {}", other)))
            }
        };
        Ok(Self { session, answer })
    }
}

#[derive(Serialize)]
pub struct AnswerOut {
    pub session: Session,
    pub next: StepOut,
}

#[derive(Deserialize)]
pub struct ResultIn {
    pub session: Session,
}

impl ResultIn {
    pub fn from_value(mut body: Value) -> Result<Self> {
        Ok(Self { session: session_from(&mut body)? })
    }
}

fn session_from(body: &mut Value) -> Result<Session> {
    match body.get_mut("session").map(Value::take) {
        Some(Value::Null) | None => Err(QuizError::InvalidSession("missing session".into())),
        Some(v) => serde_json::from_value(v).map_err(|e| QuizError::InvalidSession(format!("malformed session: {}", e))),
    }
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: &'static str,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn session_json() -> Value {
        json!({
            "id": "3f1c2a9e-5b7d-4e2a-9c1f-0a1b2c3d4e5f",
            "question_order": ["q0"],
            "position": 0,
            "scores": { "clown": 0.0 }
        })
    }

    #[test]
    fn null_or_missing_answer_is_an_invalid_answer() {
        let err = AnswerIn::from_value(json!({ "session": session_json(), "answer": null })).unwrap_err();
        assert!(matches!(err, QuizError::InvalidAnswer(_)));
        let err = AnswerIn::from_value(json!({ "session": session_json() })).unwrap_err();
        assert!(matches!(err, QuizError::InvalidAnswer(_)));
        let err = AnswerIn::from_value(json!({ "session": session_json(), "answer": 3 })).unwrap_err();
        assert!(matches!(err, QuizError::InvalidAnswer(_)));
    }

    #[test]
    fn malformed_session_is_an_invalid_session() {
        let mut bad = session_json();
        bad["id"] = json!("not-a-uuid");
        let err = AnswerIn::from_value(json!({ "session": bad, "answer": "Agree" })).unwrap_err();
        assert!(matches!(err, QuizError::InvalidSession(_)));
        assert!(matches!(ResultIn::from_value(json!({})), Err(QuizError::InvalidSession(_))));
    }

    #[test]
    fn well_formed_body_decodes() {
        let body = AnswerIn::from_value(json!({ "session": session_json(), "answer": "Agree" })).unwrap();
        assert_eq!(body.answer, "Agree");
        assert_eq!(body.session.question_order, vec!["q0"]);
    }
}
