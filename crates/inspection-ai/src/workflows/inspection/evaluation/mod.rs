//! Scoring of submitted inspection answers.
//!
//! [`InspectionEvaluator`] never fails: the model-backed strategy recovers every transport,
//! timeout, and parse failure by scoring the same answers with the keyword heuristic.

mod gemini;
mod heuristic;
mod model;

pub use gemini::GeminiClient;
pub use heuristic::{HeuristicEvaluator, Rating, NEGATIVE_KEYWORDS, POSITIVE_KEYWORDS};
pub use model::{
    build_prompt, parse_model_response, GenerationError, ModelEvaluator, ResponseParseError,
    TextGenerator,
};

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::domain::{Answers, EvaluationResult};
use crate::config::EvaluatorConfig;

enum Strategy {
    Heuristic(HeuristicEvaluator),
    Model(ModelEvaluator),
}

/// Evaluator selected once at startup and shared by every submission.
pub struct InspectionEvaluator {
    strategy: Strategy,
}

impl InspectionEvaluator {
    pub fn heuristic() -> Self {
        Self {
            strategy: Strategy::Heuristic(HeuristicEvaluator),
        }
    }

    pub fn model_backed(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            strategy: Strategy::Model(ModelEvaluator::new(generator, timeout)),
        }
    }

    /// Uses the Gemini client when a credential is configured, the heuristic otherwise.
    pub fn from_config(config: &EvaluatorConfig) -> Self {
        let Some(api_key) = config.api_key.clone() else {
            info!("no model credential configured; using heuristic evaluation");
            return Self::heuristic();
        };

        match GeminiClient::new(config, api_key) {
            Ok(client) => {
                info!(model = %config.model, "model-backed evaluation enabled");
                Self::model_backed(Arc::new(client), config.timeout)
            }
            Err(err) => {
                warn!(error = %err, "model client unavailable; using heuristic evaluation");
                Self::heuristic()
            }
        }
    }

    pub fn strategy_label(&self) -> &'static str {
        match self.strategy {
            Strategy::Heuristic(_) => "heuristic",
            Strategy::Model(_) => "model",
        }
    }

    pub async fn evaluate(&self, answers: &Answers) -> EvaluationResult {
        match &self.strategy {
            Strategy::Heuristic(evaluator) => evaluator.evaluate(answers),
            Strategy::Model(evaluator) => evaluator.evaluate(answers).await,
        }
    }
}
