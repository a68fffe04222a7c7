//! Brainrot Personality Quiz · Backend
//!
//! - Axum HTTP + WebSocket API over the quiz engine and meta classifier
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   QUIZ_CONFIG_PATH : path to TOML quiz bank (built-in bank when unset)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use brainrot_quiz::routes::build_router;
use brainrot_quiz::state::AppState;
use brainrot_quiz::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // A broken quiz bank is fatal: refuse to serve.
  let state = match AppState::new() {
    Ok(s) => Arc::new(s),
    Err(e) => {
      error!(target: "brainrot_quiz", error = %e, "Quiz bank rejected; aborting startup");
      return Err(e.into());
    }
  };

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "brainrot_quiz", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
