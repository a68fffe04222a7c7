//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! The quiz session travels in every request/response body; nothing is kept server-side.

use std::sync::Arc;
use axum::{extract::{rejection::JsonRejection, State}, http::StatusCode, Json, response::{IntoResponse, Response}};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::error::QuizError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

/// JSON error body with a status derived from the error kind.
pub struct ApiError(pub QuizError);

impl From<QuizError> for ApiError {
  fn from(e: QuizError) -> Self { ApiError(e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = if self.0.is_fatal() {
      error!(target: "brainrot_quiz", error = %self.0, "Configuration defect surfaced in a request");
      StatusCode::INTERNAL_SERVER_ERROR
    } else {
      StatusCode::BAD_REQUEST
    };
    (status, Json(ErrorOut { error: self.0.kind(), message: self.0.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(quiz_info(&state))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_start(
  State(state): State<Arc<AppState>>,
  body: Option<Json<StartIn>>,
) -> Result<Json<StartOut>, ApiError> {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let out = start_quiz(&state, body.name.as_deref())?;
  match &out {
    StartOut::InProgress { session, .. } => info!(target: "quiz", session = %session.id, "HTTP quiz started"),
    StartOut::Overridden { result } => info!(target: "quiz", labels = ?result.labels, "HTTP quiz overridden"),
  }
  Ok(Json(out))
}

/// Body as raw JSON; shape errors become quiz errors instead of axum's plain-text 422.
fn json_body(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
  body
    .map(|Json(v)| v)
    .map_err(|e| ApiError(QuizError::InvalidSession(format!("request body is not JSON: {}", e.body_text()))))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnswerOut>, ApiError> {
  let AnswerIn { mut session, answer } = AnswerIn::from_value(json_body(body)?)?;
  let next = submit_answer(&state, &mut session, &answer)?;
  info!(target: "quiz", session = %session.id, position = session.position, "HTTP answer recorded");
  Ok(Json(AnswerOut { session, next }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_result(
  State(state): State<Arc<AppState>>,
  body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ResultOut>, ApiError> {
  let body = ResultIn::from_value(json_body(body)?)?;
  Ok(Json(finish_quiz(&state, &body.session)?))
}
