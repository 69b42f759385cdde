// Retriever module
// Composes the chunker, embedding gateway, and index client into
// document ingestion and similarity query operations


use tracing::{debug, info};

use crate::chunker::{self, ChunkingOptions};
use crate::config::Config;
use crate::embeddings::EmbeddingClient;
use crate::index::{ChunkMetadata, IndexClient, IndexedEntry, SearchResult};
use crate::{Result, RetrievalError};

pub struct Retriever {
    embeddings: EmbeddingClient,
    index: IndexClient,
    chunking: ChunkingOptions,
    dimension: usize,
}

impl Retriever {
    /// Build a retriever from configuration, making sure the backing index
    /// exists before the first operation.
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let embeddings = EmbeddingClient::new(&config.embedder)?;
        let index = IndexClient::new(&config.index)?;
        index.ensure_ready()?;

        Ok(Self::from_parts(
            embeddings,
            index,
            config.chunking.clone(),
            config.index.dimension as usize,
        ))
    }

    /// Assemble a retriever from already-built parts. The caller is
    /// responsible for index lifecycle.
    #[inline]
    pub fn from_parts(
        embeddings: EmbeddingClient,
        index: IndexClient,
        chunking: ChunkingOptions,
        dimension: usize,
    ) -> Self {
        Self {
            embeddings,
            index,
            chunking,
            dimension,
        }
    }

    /// Chunk, embed, and store one document. Returns the number of stored
    /// entries.
    ///
    /// Entry ids are derived from the document id and chunk ordinal, and
    /// batches are submitted strictly in chunk order, so re-ingesting
    /// identical text overwrites the same entries.
    #[inline]
    pub fn ingest(&self, document_id: &str, text: &str) -> Result<usize> {
        let chunks = chunker::chunk(text, &self.chunking, document_id)?;
        info!(
            "Ingesting {} chunks from document '{}'",
            chunks.len(),
            document_id
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embeddings.embed_batch(&texts)?;

        let entries: Vec<IndexedEntry> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, values)| {
                if values.len() != self.dimension {
                    return Err(RetrievalError::Embedding(format!(
                        "embedder returned a {}-dimensional vector, index expects {}",
                        values.len(),
                        self.dimension
                    )));
                }
                Ok(IndexedEntry {
                    id: entry_id(document_id, chunk.ordinal),
                    values,
                    metadata: ChunkMetadata {
                        text: chunk.text.clone(),
                        document: chunk.source_document.clone(),
                    },
                })
            })
            .collect::<Result<_>>()?;

        let report = self.index.upsert(&entries)?;
        info!(
            "Stored {} entries from document '{}'",
            report.upserted, document_id
        );
        Ok(report.upserted)
    }

    /// Embed a query and return the ranked matches, best first.
    ///
    /// An empty result means the index confirmed no matches; this never
    /// fabricates a result.
    #[inline]
    pub fn query(&self, text: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        debug!("Running query (length: {})", text.len());
        let vector = self.embeddings.embed_one(text)?;
        self.index.search(&vector, top_k)
    }
}

/// Deterministic entry id: `{document}_chunk_{ordinal}`
fn entry_id(document: &str, ordinal: usize) -> String {
    format!("{document}_chunk_{ordinal}")
}
