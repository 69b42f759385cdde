// Embeddings module
// Blocking HTTP gateway to the external embedder service


use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::EmbedderConfig;
use crate::{Result, RetrievalError};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Client for the embedder service. Stateless pass-through: no caching and
/// no retries; a failed call propagates as [`RetrievalError::Embedding`].
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    base_url: Url,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingClient {
    #[inline]
    pub fn new(config: &EmbedderConfig) -> Result<Self> {
        let base_url = config
            .url()
            .map_err(|e| RetrievalError::InvalidConfiguration(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.model.clone(),
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    /// Check that the embedder service is reachable
    #[inline]
    pub fn ping(&self) -> Result<()> {
        let url = self
            .base_url
            .join("/api/tags")
            .map_err(|e| RetrievalError::Embedding(format!("failed to build ping URL: {e}")))?;

        debug!("Pinging embedder at {}", url);

        self.agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RetrievalError::Embedding(format!("embedder ping failed: {e}")))?;

        Ok(())
    }

    /// Embed a batch of already-normalized texts.
    ///
    /// Output order matches input order and output length matches input
    /// length; a shape mismatch from the service is an embedding error.
    #[inline]
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Requesting embeddings for {} texts", texts.len());

        let url = self
            .base_url
            .join("/api/embed")
            .map_err(|e| RetrievalError::Embedding(format!("failed to build embed URL: {e}")))?;

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| RetrievalError::Embedding(format!("failed to serialize request: {e}")))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RetrievalError::Embedding(format!("embedder request failed: {e}")))?;

        let response: EmbedResponse = serde_json::from_str(&response_text).map_err(|e| {
            RetrievalError::Embedding(format!("failed to parse embedder response: {e}"))
        })?;

        if response.embeddings.len() != texts.len() {
            return Err(RetrievalError::Embedding(format!(
                "embedder returned {} vectors for {} inputs",
                response.embeddings.len(),
                texts.len()
            )));
        }

        debug!("Received {} embeddings", response.embeddings.len());
        Ok(response.embeddings)
    }

    /// Embed a single query, normalizing case and surrounding whitespace first
    #[inline]
    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let normalized = normalize_query(text);
        let mut embeddings = self.embed_batch(&[normalized])?;
        embeddings.pop().ok_or_else(|| {
            RetrievalError::Embedding("embedder returned no vector for query".to_string())
        })
    }
}

fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}
