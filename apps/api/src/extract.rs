//! Text Extractor: turns an uploaded résumé into plain text.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document contains no extractable text")]
    Empty,

    #[error("could not read PDF: {0}")]
    Pdf(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError>;
}

/// Extracts text with `pdf-extract`. Parsing is CPU-bound and runs on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError> {
        let size = document.len();
        // pdf-extract panics on some malformed files; the join error catches it.
        let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&document))
            .await
            .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))?
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;

        let text = normalize_text(&raw)?;
        debug!("Extracted {} characters from {size}-byte PDF", text.chars().count());
        Ok(text)
    }
}

/// Trims extracted text, dropping blank lines and trailing spaces. Whitespace-only input
/// is `ExtractError::Empty`.
pub fn normalize_text(raw: &str) -> Result<String, ExtractError> {
    let text = raw
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}
