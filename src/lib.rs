//! Brainrot personality quiz: engine, meta-type classifier and the HTTP/WS API around them.

pub mod bank;
pub mod chart;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logic;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod telemetry;
pub mod util;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{QuizError, Result};
