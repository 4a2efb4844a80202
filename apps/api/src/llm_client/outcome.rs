//! Typed result of a "call the model, then parse" attempt.
//!
//! Model-backed operations never surface failures to their callers. Instead they
//! return `Outcome::Fallback`, which carries both the deterministic substitute and
//! the reason it was needed, so tests and logs can still see the failure path.

use thiserror::Error;
use tracing::warn;

use super::parser::MalformedModelOutput;
use super::LlmError;

#[derive(Debug, Error)]
pub enum ModelFailure {
    #[error("model invocation failed: {0}")]
    Invocation(#[from] LlmError),

    #[error(transparent)]
    Malformed(#[from] MalformedModelOutput),

    /// Parsed fine, but violates the output contract (counts, blank fields).
    #[error("model output rejected: {0}")]
    Rejected(String),
}

#[derive(Debug)]
pub enum Outcome<T> {
    Model(T),
    Fallback { value: T, reason: ModelFailure },
}

impl<T> Outcome<T> {
    /// Resolves an attempt, substituting `fallback()` on failure and logging why.
    pub fn resolve(
        attempt: Result<T, ModelFailure>,
        operation: &str,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match attempt {
            Ok(value) => Outcome::Model(value),
            Err(reason) => {
                warn!("{operation}: using fallback ({reason})");
                Outcome::Fallback {
                    value: fallback(),
                    reason,
                }
            }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Model(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Model(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }

    /// Why the fallback was used, if it was.
    pub fn fallback_reason(&self) -> Option<&ModelFailure> {
        match self {
            Outcome::Model(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_success_keeps_model_value() {
        let outcome = Outcome::resolve(Ok(7), "op", || 0);
        assert!(!outcome.is_fallback());
        assert!(outcome.fallback_reason().is_none());
        assert_eq!(outcome.into_value(), 7);
    }

    #[test]
    fn test_resolve_failure_uses_fallback_and_keeps_reason() {
        let outcome = Outcome::resolve(
            Err(ModelFailure::Rejected("too few items".to_string())),
            "op",
            || 42,
        );
        assert!(outcome.is_fallback());
        assert!(matches!(
            outcome.fallback_reason(),
            Some(ModelFailure::Rejected(_))
        ));
        assert_eq!(*outcome.value(), 42);
        match outcome {
            Outcome::Fallback { reason, .. } => {
                assert!(reason.to_string().contains("too few items"))
            }
            Outcome::Model(_) => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_fallback_closure_not_called_on_success() {
        let outcome = Outcome::resolve(Ok("model"), "op", || panic!("must not run"));
        assert_eq!(outcome.into_value(), "model");
    }
}
