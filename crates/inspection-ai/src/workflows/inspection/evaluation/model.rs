use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::super::domain::{Answers, EvaluationResult};
use super::heuristic::HeuristicEvaluator;

/// Outbound seam for the generative text service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Transport-level failure talking to the generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation client could not be built: {0}")]
    Client(String),
    #[error("generation request failed: {0}")]
    Transport(String),
    #[error("generation service answered with status {0}")]
    Status(u16),
    #[error("generation response carried no text")]
    EmptyResponse,
}

/// Distinct ways a model reply can fail to yield a usable evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseParseError {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),
    #[error("response is missing field '{0}'")]
    MissingField(&'static str),
    #[error("response field '{0}' has the wrong type")]
    WrongType(&'static str),
}

/// Internal failure absorbed by the model evaluator before falling back.
#[derive(Debug, thiserror::Error)]
enum EvaluationFailure {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),
    #[error(transparent)]
    Parse(#[from] ResponseParseError),
}

/// Delegates scoring to a generative model and recovers every failure heuristically.
pub struct ModelEvaluator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    fallback: HeuristicEvaluator,
}

impl ModelEvaluator {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            generator,
            timeout,
            fallback: HeuristicEvaluator,
        }
    }

    pub async fn evaluate(&self, answers: &Answers) -> EvaluationResult {
        match self.request_evaluation(answers).await {
            Ok(result) => {
                debug!(score = result.score, "model evaluation succeeded");
                result
            }
            Err(failure) => {
                warn!(%failure, "model evaluation failed; using heuristic scoring");
                self.fallback.evaluate(answers)
            }
        }
    }

    async fn request_evaluation(
        &self,
        answers: &Answers,
    ) -> Result<EvaluationResult, EvaluationFailure> {
        let prompt = build_prompt(answers);
        let reply = tokio::time::timeout(self.timeout, self.generator.generate(&prompt))
            .await
            .map_err(|_| EvaluationFailure::TimedOut(self.timeout))??;
        Ok(parse_model_response(&reply)?)
    }
}

/// Prompt asking the model for a strict JSON verdict over the submitted answers.
pub fn build_prompt(answers: &Answers) -> String {
    let payload = serde_json::to_string_pretty(answers).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are a food safety and hygiene auditor reviewing a hotel kitchen inspection checklist.\n\
         Score the inspection from 0 to 100 and write a short summary for a reviewing manager.\n\
         Critical safety findings (pests, mold, expired food, fridge or food held at the wrong \
         temperature) must result in a score below 60.\n\
         Respond with strict JSON only, exactly in the form \
         {{\"score\": <integer 0-100>, \"summary\": \"<one paragraph>\"}}.\n\n\
         Inspection answers:\n{payload}\n"
    )
}

/// Decodes the first balanced JSON object in a model reply.
pub fn parse_model_response(raw: &str) -> Result<EvaluationResult, ResponseParseError> {
    let candidate = extract_json_object(raw)
        .ok_or_else(|| ResponseParseError::NotJson("no JSON object found".to_string()))?;
    let value: Value = serde_json::from_str(candidate)
        .map_err(|err| ResponseParseError::NotJson(err.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ResponseParseError::NotJson("expected a JSON object".to_string()))?;

    let score = object
        .get("score")
        .ok_or(ResponseParseError::MissingField("score"))?
        .as_f64()
        .ok_or(ResponseParseError::WrongType("score"))?;
    let summary = object
        .get("summary")
        .ok_or(ResponseParseError::MissingField("summary"))?
        .as_str()
        .ok_or(ResponseParseError::WrongType("summary"))?;

    Ok(EvaluationResult {
        score: clamp_score(score),
        summary: summary.trim().to_string(),
    })
}

fn clamp_score(score: f64) -> u8 {
    // `as` saturates for floats; the clamp keeps the result inside 0..=100.
    score.round().clamp(0.0, 100.0) as u8
}

/// Returns the first `{...}` block whose braces balance, ignoring braces inside strings.
///
/// An opening brace that never closes is skipped and the scan resumes at the next one.
fn extract_json_object(raw: &str) -> Option<&str> {
    raw.match_indices('{')
        .find_map(|(start, _)| balanced_object_at(raw, start))
}

fn balanced_object_at(raw: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json() {
        let reply = "```json\n{\"score\": 42, \"summary\": \"Rodent droppings near storage.\"}\n```";
        let result = parse_model_response(reply).expect("fenced reply parses");
        assert_eq!(result.score, 42);
        assert_eq!(result.summary, "Rodent droppings near storage.");
    }

    #[test]
    fn tolerates_prose_and_braces_inside_strings() {
        let reply = "Here is my verdict: {\"score\": 88.6, \"summary\": \"Mostly fine {minor}\"} Thanks!";
        let result = parse_model_response(reply).expect("reply parses");
        assert_eq!(result.score, 89);
        assert_eq!(result.summary, "Mostly fine {minor}");
    }

    #[test]
    fn skips_an_opening_brace_that_never_closes() {
        let reply = "Shape: { score, summary. Verdict: {\"score\": 55, \"summary\": \"Fridge at 12C.\"}";
        let result = parse_model_response(reply).expect("later object parses");
        assert_eq!(result.score, 55);
        assert_eq!(result.summary, "Fridge at 12C.");

        assert_eq!(extract_json_object("{ never closed"), None);
        assert_eq!(extract_json_object("{ {\"a\": 1}"), Some("{\"a\": 1}"));
    }

    #[test]
    fn scores_outside_range_are_clamped() {
        let high = parse_model_response(r#"{"score": 150, "summary": "x"}"#).expect("parses");
        assert_eq!(high.score, 100);
        let low = parse_model_response(r#"{"score": -4, "summary": "x"}"#).expect("parses");
        assert_eq!(low.score, 0);
    }

    #[test]
    fn distinguishes_parse_failures() {
        assert!(matches!(
            parse_model_response("I am unable to score this inspection."),
            Err(ResponseParseError::NotJson(_))
        ));
        assert!(matches!(
            parse_model_response("{\"score\": 40, \"summary\": "),
            Err(ResponseParseError::NotJson(_))
        ));
        assert_eq!(
            parse_model_response(r#"{"summary": "no score"}"#),
            Err(ResponseParseError::MissingField("score"))
        );
        assert_eq!(
            parse_model_response(r#"{"score": "high", "summary": "text"}"#),
            Err(ResponseParseError::WrongType("score"))
        );
        assert_eq!(
            parse_model_response(r#"{"score": 70}"#),
            Err(ResponseParseError::MissingField("summary"))
        );
        assert_eq!(
            parse_model_response(r#"{"score": 70, "summary": ["a"]}"#),
            Err(ResponseParseError::WrongType("summary"))
        );
    }

    #[test]
    fn prompt_embeds_answers_and_contract() {
        let mut answers = Answers::new();
        answers.insert("pest_check".to_string(), "Rat droppings found".to_string());

        let prompt = build_prompt(&answers);
        assert!(prompt.contains("\"pest_check\": \"Rat droppings found\""));
        assert!(prompt.contains("below 60"));
        assert!(prompt.contains("strict JSON"));
    }
}
