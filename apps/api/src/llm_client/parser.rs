//! Response parser: turns raw model text into a typed value, tolerating markdown code fences.
//!
//! Retry and fallback policy belong to the caller; this module only parses.

use serde::de::DeserializeOwned;
use thiserror::Error;

const EXCERPT_CHARS: usize = 200;

/// The model text could not be parsed as the expected JSON shape, even after fence stripping.
#[derive(Debug, Error)]
#[error("malformed model output: {source} (excerpt: {excerpt:?})")]
pub struct MalformedModelOutput {
    #[source]
    pub source: serde_json::Error,
    pub excerpt: String,
}

/// Parses `text` as JSON into `T`. Tries the raw text first, then the fence-stripped body.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, MalformedModelOutput> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_str(strip_json_fences(text)).map_err(|source| {
            MalformedModelOutput {
                source,
                excerpt: text.chars().take(EXCERPT_CHARS).collect(),
            }
        }),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// Text that is not wrapped in a complete fence is returned trimmed but otherwise untouched.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };

    let body = match body.split_once('\n') {
        Some((opening, rest)) if is_language_tag(opening.trim()) => rest,
        _ => body,
    };

    body.trim()
}

fn is_language_tag(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
}
