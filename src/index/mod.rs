// Index module
// Record types and the HTTP client for the remote vector index service

pub mod client;

use serde::{Deserialize, Serialize};

pub use client::{IndexClient, IndexDescription, IndexStatus, UpsertReport};

/// Metadata stored alongside each vector in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// The chunk text this vector was computed from
    pub text: String,
    /// Identifier of the source document
    pub document: String,
}

/// A vector with its identity and metadata, as stored in the remote index.
/// Ids are deterministic per (document, ordinal), so re-ingesting a document
/// overwrites its prior entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedEntry {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// A ranked match from similarity search. The score is in the index's
/// configured metric (cosine similarity here), higher is more similar.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub text: String,
    pub document: String,
    pub score: f32,
}
