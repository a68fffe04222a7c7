//! Application state: the validated quiz bank shared by every request.
//!
//! Sessions are NOT stored here. HTTP clients carry their session in each request and
//! each WebSocket connection owns its session in its own task.

use std::{collections::BTreeMap, sync::Arc};

use tracing::{info, instrument};

use crate::bank::QuizBank;
use crate::config::{build_bank, load_quiz_config_from_env};
use crate::engine::QuizEngine;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct AppState {
    pub bank: Arc<QuizBank>,
}

impl AppState {
    /// Build state from env: load config (if any) and validate the bank.
    /// Any configuration defect is returned and should abort startup.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Result<Self> {
        let cfg = load_quiz_config_from_env()?;
        if cfg.is_none() {
            info!(target: "brainrot_quiz", "QUIZ_CONFIG_PATH not set; using built-in quiz bank");
        }
        Ok(Self::from_bank(build_bank(cfg)?))
    }

    pub fn from_bank(bank: QuizBank) -> Self {
        // Inventory summary: how many questions touch each trait.
        let mut per_trait: BTreeMap<&str, usize> = bank.traits().iter().map(|t| (t.as_str(), 0)).collect();
        for q in bank.questions() {
            for c in &q.contributions {
                *per_trait.entry(c.trait_key.as_str()).or_default() += 1;
            }
        }
        for (trait_key, questions) in &per_trait {
            info!(target: "quiz", %trait_key, questions, "Startup trait inventory");
        }
        info!(
            target: "brainrot_quiz",
            questions = bank.questions().len(),
            meta_rules = bank.meta_rules().len(),
            normalization = bank.normalization(),
            "Quiz bank ready"
        );

        Self { bank: Arc::new(bank) }
    }

    pub fn engine(&self) -> QuizEngine<'_> {
        QuizEngine::new(&self.bank)
    }
}
