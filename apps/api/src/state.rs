use std::sync::Arc;

use sqlx::PgPool;

use crate::documents::DocumentStore;
use crate::evaluation::EvaluationEngine;
use crate::extract::TextExtractor;
use crate::interview::ConversationManager;
use crate::notify::Notifier;

/// Shared application state injected into all route handlers via Axum extractors.
/// External collaborators sit behind traits so tests can swap them out.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub evaluator: EvaluationEngine,
    pub interviews: ConversationManager,
    pub documents: Arc<dyn DocumentStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub notifier: Arc<dyn Notifier>,
}
