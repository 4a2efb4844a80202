//! Question generation: screening questions for a job posting, under a strict output schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::evaluation::prompts::{QUESTIONS_PROMPT_TEMPLATE, QUESTIONS_SYSTEM};
use crate::evaluation::EvaluationEngine;
use crate::llm_client::outcome::{ModelFailure, Outcome};
use crate::llm_client::prompts::{render, JSON_ONLY_INSTRUCTION};

pub const MIN_QUESTIONS: usize = 3;
pub const MAX_QUESTIONS: usize = 7;

/// Answer format a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Open,
    YesNo,
    Scale,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Open => "open",
            QuestionKind::YesNo => "yes_no",
            QuestionKind::Scale => "scale",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(QuestionKind::Open),
            "yes_no" => Ok(QuestionKind::YesNo),
            "scale" => Ok(QuestionKind::Scale),
            other => Err(format!("unknown question kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub question: String,
    pub kind: QuestionKind,
}

impl QuestionSpec {
    fn new(question: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            question: question.into(),
            kind,
        }
    }
}

/// What the model needs to know about the posting.
#[derive(Debug, Clone)]
pub struct JobBrief<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub required_skills: &'a [String],
    pub min_experience: u32,
}

impl EvaluationEngine {
    /// Generates 5–7 screening questions. Always yields 3..=7 questions with valid kinds;
    /// on any model or parse failure the 3-item fallback is returned without another call.
    pub async fn generate_questions(&self, job: &JobBrief<'_>) -> Outcome<Vec<QuestionSpec>> {
        let attempt = self.try_generate_questions(job).await;
        let outcome = Outcome::resolve(attempt, "generate_questions", || {
            fallback_questions(job.required_skills, job.min_experience)
        });
        info!(
            "Generated {} questions for '{}' (fallback: {})",
            outcome.value().len(),
            job.title,
            outcome.is_fallback()
        );
        outcome
    }

    async fn try_generate_questions(
        &self,
        job: &JobBrief<'_>,
    ) -> Result<Vec<QuestionSpec>, ModelFailure> {
        let skills = job.required_skills.join(", ");
        let min_experience = job.min_experience.to_string();
        let prompt = render(
            QUESTIONS_PROMPT_TEMPLATE,
            &[
                ("title", job.title),
                ("description", job.description),
                ("skills", skills.as_str()),
                ("min_experience", min_experience.as_str()),
                ("json_only", JSON_ONLY_INSTRUCTION),
            ],
        );

        let questions: Vec<QuestionSpec> = self.complete_json(QUESTIONS_SYSTEM, &prompt).await?;
        validate_questions(questions)
    }
}

/// Enforces the output contract: trimmed, non-blank text, at least `MIN_QUESTIONS`,
/// and anything past `MAX_QUESTIONS` dropped. Unknown kinds already fail deserialization.
fn validate_questions(questions: Vec<QuestionSpec>) -> Result<Vec<QuestionSpec>, ModelFailure> {
    let mut questions: Vec<QuestionSpec> = questions
        .into_iter()
        .map(|q| QuestionSpec::new(q.question.trim(), q.kind))
        .collect();

    if questions.iter().any(|q| q.question.is_empty()) {
        return Err(ModelFailure::Rejected(
            "question with blank text".to_string(),
        ));
    }

    if questions.len() < MIN_QUESTIONS {
        return Err(ModelFailure::Rejected(format!(
            "expected at least {MIN_QUESTIONS} questions, got {}",
            questions.len()
        )));
    }

    questions.truncate(MAX_QUESTIONS);
    Ok(questions)
}

/// Deterministic questions used when the model is unavailable.
pub fn fallback_questions(required_skills: &[String], min_experience: u32) -> Vec<QuestionSpec> {
    let skill = required_skills
        .first()
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("the required technologies");

    vec![
        QuestionSpec::new(
            format!("What is your experience with {skill}?"),
            QuestionKind::Open,
        ),
        QuestionSpec::new(
            "Can you describe a relevant project you have worked on?",
            QuestionKind::Open,
        ),
        QuestionSpec::new(
            format!("Do you have at least {min_experience} years of experience in this field?"),
            QuestionKind::YesNo,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use std::sync::Arc;
    use std::time::Duration;

    fn skills() -> Vec<String> {
        vec!["Rust".to_string(), "PostgreSQL".to_string()]
    }

    fn engine(model: Arc<ScriptedModel>) -> EvaluationEngine {
        EvaluationEngine::new(model, Duration::from_secs(5))
    }

    fn brief(skills: &[String]) -> JobBrief<'_> {
        JobBrief {
            title: "Backend Engineer",
            description: "Build and operate our payments API.",
            required_skills: skills,
            min_experience: 3,
        }
    }

    fn question_json(n: usize) -> String {
        let items: Vec<String> = (0..n)
            .map(|i| {
                let kind = ["open", "yes_no", "scale"][i % 3];
                format!(r#"{{"question": "Question {i}?", "kind": "{kind}"}}"#)
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn test_model_questions_are_returned() {
        let model = Arc::new(ScriptedModel::new().reply(question_json(6)));
        let skills = skills();
        let outcome = engine(model.clone()).generate_questions(&brief(&skills)).await;

        assert!(!outcome.is_fallback());
        let questions = outcome.into_value();
        assert_eq!(questions.len(), 6);
        assert_eq!(questions[1].kind, QuestionKind::YesNo);
        assert_eq!(questions[2].kind, QuestionKind::Scale);
    }

    #[tokio::test]
    async fn test_prompt_interpolates_posting() {
        let model = Arc::new(ScriptedModel::new().reply(question_json(5)));
        let skills = skills();
        engine(model.clone()).generate_questions(&brief(&skills)).await;

        let call = &model.calls()[0];
        assert_eq!(call.system, QUESTIONS_SYSTEM);
        assert!(call.input.contains("Title: Backend Engineer"));
        assert!(call.input.contains("Required skills: Rust, PostgreSQL"));
        assert!(call.input.contains("Minimum experience: 3 years"));
        assert!(call.input.contains(r#""kind": "open""#));
        assert!(call.history.is_empty());
    }

    #[tokio::test]
    async fn test_fenced_reply_is_accepted() {
        let reply = format!("```json\n{}\n```", question_json(5));
        let model = Arc::new(ScriptedModel::new().reply(reply));
        let skills = skills();
        let outcome = engine(model).generate_questions(&brief(&skills)).await;

        assert!(!outcome.is_fallback());
        assert_eq!(outcome.value().len(), 5);
    }

    #[tokio::test]
    async fn test_more_than_seven_questions_are_truncated() {
        let model = Arc::new(ScriptedModel::new().reply(question_json(10)));
        let skills = skills();
        let questions = engine(model)
            .generate_questions(&brief(&skills))
            .await
            .into_value();

        assert_eq!(questions.len(), MAX_QUESTIONS);
        assert_eq!(questions[0].question, "Question 0?");
    }

    #[tokio::test]
    async fn test_too_few_questions_use_fallback() {
        let model = Arc::new(ScriptedModel::new().reply(question_json(2)));
        let skills = skills();
        let outcome = engine(model).generate_questions(&brief(&skills)).await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.value().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_kind_uses_fallback() {
        let reply = r#"[
            {"question": "A?", "kind": "open"},
            {"question": "B?", "kind": "multiple_choice"},
            {"question": "C?", "kind": "scale"}
        ]"#;
        let model = Arc::new(ScriptedModel::new().reply(reply));
        let skills = skills();
        let outcome = engine(model).generate_questions(&brief(&skills)).await;

        assert!(outcome.is_fallback());
    }

    #[tokio::test]
    async fn test_model_failure_returns_exact_fallback_template() {
        let model = Arc::new(ScriptedModel::failing());
        let skills = skills();
        let outcome = engine(model.clone()).generate_questions(&brief(&skills)).await;

        assert!(outcome.is_fallback());
        assert_eq!(model.call_count(), 1);
        assert_eq!(outcome.into_value(), fallback_questions(&skills, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_fallback() {
        let model = Arc::new(ScriptedModel::hanging());
        let skills = skills();
        let outcome = engine(model).generate_questions(&brief(&skills)).await;

        assert!(matches!(
            outcome,
            Outcome::Fallback {
                reason: ModelFailure::Invocation(crate::llm_client::LlmError::Timeout(_)),
                ..
            }
        ));
    }

    #[test]
    fn test_fallback_uses_first_skill_and_experience() {
        let questions = fallback_questions(&skills(), 4);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question, "What is your experience with Rust?");
        assert_eq!(questions[0].kind, QuestionKind::Open);
        assert_eq!(questions[1].kind, QuestionKind::Open);
        assert!(questions[2].question.contains("at least 4 years"));
        assert_eq!(questions[2].kind, QuestionKind::YesNo);
    }

    #[test]
    fn test_fallback_without_skills_is_generic() {
        let questions = fallback_questions(&[], 0);
        assert_eq!(
            questions[0].question,
            "What is your experience with the required technologies?"
        );
    }

    #[test]
    fn test_blank_question_is_rejected() {
        let questions = vec![
            QuestionSpec::new("A?", QuestionKind::Open),
            QuestionSpec::new("   ", QuestionKind::Open),
            QuestionSpec::new("C?", QuestionKind::Scale),
        ];
        assert!(validate_questions(questions).is_err());
    }

    #[test]
    fn test_question_kind_round_trips_through_str() {
        for kind in [QuestionKind::Open, QuestionKind::YesNo, QuestionKind::Scale] {
            assert_eq!(kind.as_str().parse::<QuestionKind>().unwrap(), kind);
        }
        assert!("abierta".parse::<QuestionKind>().is_err());
    }
}
