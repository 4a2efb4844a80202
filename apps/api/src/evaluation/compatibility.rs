//! Compatibility scoring: rates a candidate's résumé and answers against a posting.
//!
//! Scores are always clamped into [0, 100]; absent or non-numeric scores become 50.
//! This operation must never abort the application workflow.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evaluation::prompts::{COMPATIBILITY_PROMPT_TEMPLATE, COMPATIBILITY_SYSTEM};
use crate::evaluation::{lenient_integer, lenient_list, truncate_chars, EvaluationEngine};
use crate::llm_client::outcome::{ModelFailure, Outcome};
use crate::llm_client::prompts::{render, JSON_ONLY_INSTRUCTION};

/// Only this many résumé characters are included in the scoring prompt.
pub const COMPATIBILITY_CHAR_LIMIT: usize = 3000;
pub const NEUTRAL_SCORE: u8 = 50;

/// A screening question together with the candidate's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityEvaluation {
    /// Overall assessment of the candidate, 0–100.
    pub score: u8,
    /// Fit with this specific posting, 0–100.
    pub compatibility: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl CompatibilityEvaluation {
    /// Neutral result used when scoring is unavailable.
    pub fn neutral() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            compatibility: NEUTRAL_SCORE,
            strengths: vec!["Candidate shows potential".to_string()],
            weaknesses: vec!["Requires manual review".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    compatibility: Option<Value>,
    #[serde(default)]
    strengths: Option<Value>,
    #[serde(default)]
    weaknesses: Option<Value>,
}

impl From<RawEvaluation> for CompatibilityEvaluation {
    fn from(raw: RawEvaluation) -> Self {
        Self {
            score: clamp_score(raw.score.as_ref()),
            compatibility: clamp_score(raw.compatibility.as_ref()),
            strengths: lenient_list(raw.strengths.as_ref()),
            weaknesses: lenient_list(raw.weaknesses.as_ref()),
        }
    }
}

/// Missing or unreadable → 50, otherwise rounded and clamped into [0, 100].
fn clamp_score(value: Option<&Value>) -> u8 {
    value
        .and_then(lenient_integer)
        .unwrap_or(i64::from(NEUTRAL_SCORE))
        .clamp(0, 100) as u8
}

/// Renders answers as a readable list for the prompt.
fn format_answers(answers: &[AnswerPair]) -> String {
    if answers.is_empty() {
        return "(no answers provided)".to_string();
    }

    answers
        .iter()
        .map(|pair| {
            let question = non_blank_or(&pair.question, "N/A");
            let answer = non_blank_or(&pair.answer, "N/A");
            format!("- {question}\n  Answer: {answer}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_blank_or<'a>(s: &'a str, default: &'a str) -> &'a str {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        default
    } else {
        trimmed
    }
}

/// Everything the scorer needs about one application.
#[derive(Debug, Clone)]
pub struct CompatibilityRequest<'a> {
    pub resume_text: &'a str,
    pub answers: &'a [AnswerPair],
    pub title: &'a str,
    pub required_skills: &'a [String],
    pub min_experience: u32,
}

impl EvaluationEngine {
    /// Scores a candidate. On any failure returns `CompatibilityEvaluation::neutral()`.
    pub async fn evaluate_compatibility(
        &self,
        request: &CompatibilityRequest<'_>,
    ) -> Outcome<CompatibilityEvaluation> {
        let attempt = self.try_evaluate_compatibility(request).await;
        Outcome::resolve(
            attempt,
            "evaluate_compatibility",
            CompatibilityEvaluation::neutral,
        )
    }

    async fn try_evaluate_compatibility(
        &self,
        request: &CompatibilityRequest<'_>,
    ) -> Result<CompatibilityEvaluation, ModelFailure> {
        let skills = request.required_skills.join(", ");
        let min_experience = request.min_experience.to_string();
        let answers = format_answers(request.answers);
        let prompt = render(
            COMPATIBILITY_PROMPT_TEMPLATE,
            &[
                ("title", request.title),
                ("skills", skills.as_str()),
                ("min_experience", min_experience.as_str()),
                (
                    "resume_text",
                    truncate_chars(request.resume_text, COMPATIBILITY_CHAR_LIMIT),
                ),
                ("answers", answers.as_str()),
                ("json_only", JSON_ONLY_INSTRUCTION),
            ],
        );

        let raw: RawEvaluation = self.complete_json(COMPATIBILITY_SYSTEM, &prompt).await?;
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn engine(model: Arc<ScriptedModel>) -> EvaluationEngine {
        EvaluationEngine::new(model, Duration::from_secs(5))
    }

    fn answers() -> Vec<AnswerPair> {
        vec![
            AnswerPair {
                question: "Years with Rust?".to_string(),
                answer: "Five".to_string(),
            },
            AnswerPair {
                question: "Worked with Kafka?".to_string(),
                answer: "".to_string(),
            },
        ]
    }

    async fn evaluate(reply: &str) -> Outcome<CompatibilityEvaluation> {
        let model = Arc::new(ScriptedModel::new().reply(reply));
        let answers = answers();
        let skills = vec!["Rust".to_string()];
        engine(model)
            .evaluate_compatibility(&CompatibilityRequest {
                resume_text: "Senior Rust developer",
                answers: &answers,
                title: "Backend Engineer",
                required_skills: &skills,
                min_experience: 3,
            })
            .await
    }

    #[tokio::test]
    async fn test_in_range_scores_pass_through() {
        let outcome = evaluate(
            r#"{"score": 85, "compatibility": 78, "strengths": ["Rust"], "weaknesses": ["Kafka"]}"#,
        )
        .await;

        assert!(!outcome.is_fallback());
        let eval = outcome.into_value();
        assert_eq!(eval.score, 85);
        assert_eq!(eval.compatibility, 78);
        assert_eq!(eval.strengths, vec!["Rust"]);
        assert_eq!(eval.weaknesses, vec!["Kafka"]);
    }

    #[tokio::test]
    async fn test_out_of_range_scores_are_clamped() {
        let eval = evaluate(r#"{"score": 150, "compatibility": -5}"#)
            .await
            .into_value();
        assert_eq!(eval.score, 100);
        assert_eq!(eval.compatibility, 0);
    }

    #[tokio::test]
    async fn test_missing_scores_default_to_fifty() {
        let outcome = evaluate(r#"{"strengths": [], "weaknesses": []}"#).await;
        assert!(!outcome.is_fallback());
        let eval = outcome.into_value();
        assert_eq!(eval.score, 50);
        assert_eq!(eval.compatibility, 50);
    }

    #[tokio::test]
    async fn test_loose_lists_keep_the_scores() {
        let outcome = evaluate(
            r#"{"score": 91, "compatibility": 88, "strengths": "Strong Rust", "weaknesses": [null, "No Kafka", {"x": 1}]}"#,
        )
        .await;

        assert!(!outcome.is_fallback());
        let eval = outcome.into_value();
        assert_eq!(eval.score, 91);
        assert_eq!(eval.compatibility, 88);
        assert_eq!(eval.strengths, vec!["Strong Rust"]);
        assert_eq!(eval.weaknesses, vec!["No Kafka"]);
    }

    #[tokio::test]
    async fn test_model_failure_returns_neutral() {
        let model = Arc::new(ScriptedModel::failing());
        let outcome = engine(model)
            .evaluate_compatibility(&CompatibilityRequest {
                resume_text: "",
                answers: &[],
                title: "Backend Engineer",
                required_skills: &[],
                min_experience: 0,
            })
            .await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_value(), CompatibilityEvaluation::neutral());
    }

    #[tokio::test]
    async fn test_prompt_contains_answers_and_truncated_resume() {
        let model = Arc::new(ScriptedModel::new().reply("{}"));
        let resume = format!("{}TAIL_MARKER", "r".repeat(COMPATIBILITY_CHAR_LIMIT));
        let answers = answers();
        let skills = vec!["Rust".to_string(), "Kafka".to_string()];
        engine(model.clone())
            .evaluate_compatibility(&CompatibilityRequest {
                resume_text: &resume,
                answers: &answers,
                title: "Backend Engineer",
                required_skills: &skills,
                min_experience: 3,
            })
            .await;

        let input = &model.calls()[0].input;
        assert!(input.contains("- Years with Rust?\n  Answer: Five"));
        assert!(input.contains("- Worked with Kafka?\n  Answer: N/A"));
        assert!(input.contains("Required skills: Rust, Kafka"));
        assert!(!input.contains("TAIL_MARKER"));
    }

    #[test]
    fn test_clamp_score_property() {
        for raw in [json!(-1000), json!(-5), json!(0), json!(49.5), json!(100), json!(150)] {
            let score = clamp_score(Some(&raw));
            assert!(score <= 100, "raw {raw} gave {score}");
        }
        assert_eq!(clamp_score(None), 50);
        assert_eq!(clamp_score(Some(&json!("n/a"))), 50);
        assert_eq!(clamp_score(Some(&json!("72"))), 72);
    }

    #[test]
    fn test_format_answers_empty() {
        assert_eq!(format_answers(&[]), "(no answers provided)");
    }
}
