//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! The connection task owns the player's session; it is dropped on disconnect.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::engine::{phase_of, Phase, Session};
use crate::error::QuizError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage, StartOut, StepOut};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "brainrot_quiz", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "brainrot_quiz", "WebSocket connected");
  let mut session: Option<Session> = None;
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match parse_client_ws(&txt) {
          Ok(incoming) => {
            debug!(target: "brainrot_quiz", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut session)
          }
          Err(reply) => reply,
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "kind": "serialization", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "brainrot_quiz", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "brainrot_quiz", "WebSocket disconnected");
}

fn error_msg(e: QuizError) -> ServerWsMessage {
  if e.is_fatal() {
    error!(target: "brainrot_quiz", error = %e, "Configuration defect surfaced on WebSocket");
  }
  ServerWsMessage::Error { kind: e.kind().into(), message: e.to_string() }
}

/// Decode a client frame. An `answer` message without a usable label is an
/// invalid answer, not a JSON error.
pub fn parse_client_ws(txt: &str) -> Result<ClientWsMessage, ServerWsMessage> {
  let value: serde_json::Value = serde_json::from_str(txt)
    .map_err(|e| ServerWsMessage::Error { kind: "invalid_json".into(), message: format!("Invalid JSON: {}", e) })?;
  let is_answer = value.get("type").and_then(|t| t.as_str()) == Some("answer");
  serde_json::from_value::<ClientWsMessage>(value).map_err(|e| {
    if is_answer {
      error_msg(QuizError::InvalidAnswer("answer must be one of the answer labels".into()))
    } else {
      ServerWsMessage::Error { kind: "invalid_json".into(), message: format!("Invalid message: {}", e) }
    }
  })
}

/// Dispatch one client message against the connection's session.
pub fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: &mut Option<Session>) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    // Start (or start over) always replaces the previous session.
    ClientWsMessage::Start { name } => match start_quiz(state, name.as_deref()) {
      Ok(StartOut::InProgress { session: fresh, question }) => {
        info!(target: "quiz", session = %fresh.id, "WS quiz started");
        *session = Some(fresh);
        ServerWsMessage::Question { question }
      }
      Ok(StartOut::Overridden { result }) => {
        *session = None;
        ServerWsMessage::Result { result }
      }
      Err(e) => error_msg(e),
    },

    ClientWsMessage::Answer { answer } => match (phase_of(session.as_ref()), session.as_mut()) {
      (Phase::InProgress, Some(s)) => match submit_answer(state, s, &answer) {
        Ok(StepOut::Question { question }) => ServerWsMessage::Question { question },
        Ok(StepOut::Finished { total }) => ServerWsMessage::Finished { total },
        Err(e) => error_msg(e),
      },
      _ => error_msg(QuizError::InvalidAnswer("quiz is not in progress".into())),
    },

    ClientWsMessage::Result => match session.as_ref() {
      Some(s) => match finish_quiz(state, s) {
        Ok(result) => ServerWsMessage::Result { result },
        Err(e) => error_msg(e),
      },
      None => error_msg(QuizError::InvalidSession("no quiz started".into())),
    },

    ClientWsMessage::Reset => {
      if let Some(s) = session.take() {
        info!(target: "quiz", session = %s.id, "WS session discarded");
      }
      ServerWsMessage::Reset
    }
  }
}
