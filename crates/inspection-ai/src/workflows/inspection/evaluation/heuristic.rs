use super::super::domain::{Answers, EvaluationResult};

/// Terms that each cost `NEGATIVE_PENALTY` points when present anywhere in the answers.
pub const NEGATIVE_KEYWORDS: [&str; 9] = [
    "dirty",
    "expired",
    "pest",
    "mold",
    "cold",
    "violation",
    "fail",
    "poor",
    "bad",
];

/// Terms that each earn `POSITIVE_BONUS` points when present anywhere in the answers.
pub const POSITIVE_KEYWORDS: [&str; 8] = [
    "clean",
    "fresh",
    "proper",
    "sanitized",
    "pass",
    "good",
    "excellent",
    "compliant",
];

const BASE_SCORE: i32 = 100;
const NEGATIVE_PENALTY: i32 = 10;
const POSITIVE_BONUS: i32 = 5;
const MAX_SCORE: i32 = 100;

/// Coarse band reported in the summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Good,
    Average,
    Poor,
}

impl Rating {
    pub const fn from_score(score: u8) -> Self {
        if score >= 80 {
            Rating::Good
        } else if score >= 60 {
            Rating::Average
        } else {
            Rating::Poor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rating::Good => "Good",
            Rating::Average => "Average",
            Rating::Poor => "Poor",
        }
    }
}

/// Deterministic keyword scorer; also the fallback for every model failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator;

impl HeuristicEvaluator {
    pub fn evaluate(&self, answers: &Answers) -> EvaluationResult {
        let text = answer_text(answers);

        let mut score = BASE_SCORE;
        let mut issues = Vec::new();

        // Presence only: a keyword repeated in the text still counts once.
        for keyword in NEGATIVE_KEYWORDS {
            if text.contains(keyword) {
                score -= NEGATIVE_PENALTY;
                issues.push(format!("Found issue related to '{keyword}'"));
            }
        }

        for keyword in POSITIVE_KEYWORDS {
            if text.contains(keyword) {
                score += POSITIVE_BONUS;
            }
        }

        let score = u8::try_from(score.clamp(0, MAX_SCORE)).unwrap_or(0);
        let findings = if issues.is_empty() {
            "No obvious issues detected in text.".to_string()
        } else {
            format!("Issues detected: {}", issues.join(", "))
        };

        EvaluationResult {
            score,
            summary: format!(
                "AI Evaluation: {}. Score: {}/100. {}",
                Rating::from_score(score).label(),
                score,
                findings
            ),
        }
    }
}

/// Lowercased JSON rendering of the whole mapping, keys included.
fn answer_text(answers: &Answers) -> String {
    serde_json::to_string(answers)
        .unwrap_or_else(|_| {
            answers
                .iter()
                .map(|(key, value)| format!("{key} {value}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .to_lowercase()
}
