//! Résumé analysis: extracts skills, experience, education and a summary from plain text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::evaluation::prompts::{RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM};
use crate::evaluation::{lenient_integer, lenient_list, lenient_text, truncate_chars, EvaluationEngine};
use crate::llm_client::outcome::{ModelFailure, Outcome};
use crate::llm_client::prompts::{render, JSON_ONLY_INSTRUCTION};

/// Only this many characters of the résumé are sent to the model; the rest is dropped.
pub const RESUME_ANALYSIS_CHAR_LIMIT: usize = 4000;

pub const UNSPECIFIED_EDUCATION: &str = "Unspecified";
pub const ANALYSIS_ERROR_SUMMARY: &str = "Error analyzing résumé";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub skills: Vec<String>,
    pub years_experience: u32,
    pub education: Option<String>,
    pub summary: String,
}

impl ResumeAnalysis {
    /// Returned whenever the model cannot produce an analysis.
    pub fn sentinel() -> Self {
        Self {
            skills: Vec::new(),
            years_experience: 0,
            education: Some(UNSPECIFIED_EDUCATION.to_string()),
            summary: ANALYSIS_ERROR_SUMMARY.to_string(),
        }
    }
}

/// Model output as received: every field optional and loosely typed.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    skills: Option<Value>,
    #[serde(default)]
    years_experience: Option<Value>,
    #[serde(default)]
    education: Option<Value>,
    #[serde(default)]
    summary: Option<Value>,
}

impl From<RawAnalysis> for ResumeAnalysis {
    fn from(raw: RawAnalysis) -> Self {
        let years_experience = raw
            .years_experience
            .as_ref()
            .and_then(lenient_integer)
            .map(|years| years.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0);

        Self {
            skills: lenient_list(raw.skills.as_ref()),
            years_experience,
            education: lenient_text(raw.education.as_ref()),
            summary: lenient_text(raw.summary.as_ref()).unwrap_or_default(),
        }
    }
}

impl EvaluationEngine {
    /// Extracts structured facts from résumé text. Never fails: a blank résumé or any
    /// model/parse failure yields `ResumeAnalysis::sentinel()`.
    pub async fn analyze_resume(&self, resume_text: &str) -> Outcome<ResumeAnalysis> {
        let attempt = if resume_text.trim().is_empty() {
            Err(ModelFailure::Rejected("résumé text is empty".to_string()))
        } else {
            self.try_analyze_resume(resume_text).await
        };
        Outcome::resolve(attempt, "analyze_resume", ResumeAnalysis::sentinel)
    }

    async fn try_analyze_resume(&self, resume_text: &str) -> Result<ResumeAnalysis, ModelFailure> {
        let limited = truncate_chars(resume_text, RESUME_ANALYSIS_CHAR_LIMIT);
        if limited.len() < resume_text.len() {
            debug!(
                "Résumé truncated to {RESUME_ANALYSIS_CHAR_LIMIT} characters ({} bytes dropped)",
                resume_text.len() - limited.len()
            );
        }

        let prompt = render(
            RESUME_PROMPT_TEMPLATE,
            &[
                ("resume_text", limited),
                ("json_only", JSON_ONLY_INSTRUCTION),
            ],
        );

        let raw: RawAnalysis = self.complete_json(RESUME_SYSTEM, &prompt).await?;
        Ok(raw.into())
    }
}
