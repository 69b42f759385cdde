// Extractor module
// Thin document loading: reads plain-text formats and normalizes whitespace


use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::{Result, RetrievalError};

/// Load a document from disk as a single normalized string.
///
/// Supported formats are `.txt` and `.md`; anything else fails with
/// [`RetrievalError::UnsupportedFormat`]. Runs of whitespace are collapsed to
/// single spaces and the ends are trimmed. A document that is empty after
/// normalization fails with [`RetrievalError::Extraction`].
#[inline]
pub fn load_document(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match extension.as_str() {
        "txt" | "md" => fs::read_to_string(path).map_err(|e| {
            RetrievalError::Extraction(format!("failed to read {}: {e}", path.display()))
        })?,
        _ => return Err(RetrievalError::UnsupportedFormat(path.display().to_string())),
    };

    let content = normalize_whitespace(&raw);
    if content.is_empty() {
        warn!("No content extracted from {}", path.display());
        return Err(RetrievalError::Extraction(format!(
            "document is empty: {}",
            path.display()
        )));
    }

    info!("Loaded document: {}", path.display());
    Ok(content)
}

/// Collapse runs of whitespace to single spaces and trim the ends
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
