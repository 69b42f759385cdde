// Chunker module
// Splits normalized text into fixed-size, overlapping, deduplicated word windows


use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Result, RetrievalError};

/// A window of words cut from a source document, ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the emitted (deduplicated) sequence
    pub ordinal: usize,
    /// The chunk text, words joined by single spaces
    pub text: String,
    /// Identifier of the originating document
    pub source_document: String,
}

/// Window geometry for chunking, in words
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingOptions {
    /// Number of words per chunk
    pub window: usize,
    /// Number of words shared between adjacent chunks
    pub overlap: usize,
}

impl Default for ChunkingOptions {
    #[inline]
    fn default() -> Self {
        Self {
            window: 50,
            overlap: 10,
        }
    }
}

/// Split `text` into overlapping word windows, dropping exact-text duplicates.
///
/// The window must be strictly larger than the overlap, and `text` must
/// contain at least one word; both violations fail with
/// [`RetrievalError::InvalidConfiguration`]. Text shorter than one window
/// yields exactly one chunk.
#[inline]
pub fn chunk(text: &str, options: &ChunkingOptions, source_document: &str) -> Result<Vec<Chunk>> {
    if options.window <= options.overlap {
        return Err(RetrievalError::InvalidConfiguration(format!(
            "chunk window ({}) must be larger than overlap ({})",
            options.window, options.overlap
        )));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Err(RetrievalError::InvalidConfiguration(
            "cannot chunk empty text".to_string(),
        ));
    }

    let step = options.window - options.overlap;
    let mut raw = Vec::with_capacity(words.len() / step + 1);
    let mut start = 0;
    loop {
        let end = (start + options.window).min(words.len());
        raw.push(words[start..end].join(" "));
        start += step;
        // A window starting inside the final overlap region is a suffix of
        // its predecessor.
        if start >= words.len().saturating_sub(options.overlap) {
            break;
        }
    }

    let chunks: Vec<Chunk> = raw
        .into_iter()
        .unique()
        .enumerate()
        .map(|(ordinal, text)| Chunk {
            ordinal,
            text,
            source_document: source_document.to_string(),
        })
        .collect();

    debug!(
        "Chunked {} words from '{}' into {} unique chunks",
        words.len(),
        source_document,
        chunks.len()
    );

    Ok(chunks)
}
