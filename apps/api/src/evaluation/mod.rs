// Evaluation Engine: question generation, résumé analysis, compatibility scoring.
// Each operation makes one model call and degrades to a deterministic fallback on any failure.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod compatibility;
pub mod prompts;
pub mod questions;
pub mod resume;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::llm_client::outcome::ModelFailure;
use crate::llm_client::parser::parse_model_json;
use crate::llm_client::{invoke_with_timeout, ChatModel, EVALUATION_PARAMS};

/// Stateless front-end over the hosted model for the three evaluation operations.
/// Cheap to clone; carried in `AppState`.
#[derive(Clone)]
pub struct EvaluationEngine {
    model: Arc<dyn ChatModel>,
    timeout: Duration,
}

impl EvaluationEngine {
    pub fn new(model: Arc<dyn ChatModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// The inner "attempt" step shared by every operation: one bounded model call, then parse.
    async fn complete_json<T: DeserializeOwned>(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<T, ModelFailure> {
        let text = invoke_with_timeout(
            self.model.as_ref(),
            self.timeout,
            system,
            &[],
            prompt,
            EVALUATION_PARAMS,
        )
        .await?;

        Ok(parse_model_json(&text)?)
    }
}

/// Returns at most the first `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Reads an integer out of a loosely typed model value: numbers are rounded,
/// numeric strings are parsed, anything else is `None`.
fn lenient_integer(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then(|| number.round() as i64)
}

/// Reads a list of strings out of a loosely typed model value. String elements are
/// trimmed and kept, blanks and non-strings are skipped, and a bare string is a
/// one-item list. Anything else is empty.
fn lenient_list(value: Option<&Value>) -> Vec<String> {
    let items: Vec<&str> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => vec![s.as_str()],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads free text: a string as-is, an array of strings joined with "; ".
/// Blank results and other shapes are `None`.
fn lenient_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(_) => lenient_list(value).join("; "),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
