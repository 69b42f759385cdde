
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{ChunkMetadata, IndexedEntry, SearchResult};
use crate::config::IndexConfig;
use crate::{Result, RetrievalError};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
/// Entries per upsert request
const UPSERT_BATCH_SIZE: usize = 100;
/// Readiness polls before giving up on a freshly created index
const READINESS_ATTEMPTS: u32 = 5;
/// Pause between readiness polls
const READINESS_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Upper bound on ids collected by a filtered delete scan
const DELETE_SCAN_LIMIT: usize = 1000;

/// Client for the vector index service: index lifecycle, batched upsert,
/// similarity query, and metadata-filtered delete. This is the only code
/// that speaks the index service protocol.
#[derive(Debug, Clone)]
pub struct IndexClient {
    base_url: Url,
    name: String,
    dimension: usize,
    metric: String,
    cloud: String,
    region: String,
    strict_readiness: bool,
    poll_interval: Duration,
    agent: ureq::Agent,
}

/// Outcome of a successful upsert call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertReport {
    /// Entries submitted across all batches
    pub upserted: usize,
    /// Number of batch requests issued
    pub batches: usize,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: CloudSpec<'a>,
}

#[derive(Debug, Serialize)]
struct CloudSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListIndexesResponse {
    #[serde(default)]
    indexes: Vec<IndexSummary>,
}

#[derive(Debug, Deserialize)]
struct IndexSummary {
    name: String,
}

/// Index configuration and readiness as reported by the service
#[derive(Debug, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub status: IndexStatus,
}

#[derive(Debug, Deserialize)]
pub struct IndexStatus {
    pub ready: bool,
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexedEntry],
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<MetadataFilter<'a>>,
}

#[derive(Debug, Serialize)]
struct MetadataFilter<'a> {
    document: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<ChunkMetadata>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
}

impl IndexClient {
    #[inline]
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let base_url = config
            .url()
            .map_err(|e| RetrievalError::InvalidConfiguration(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            name: config.name.clone(),
            dimension: config.dimension as usize,
            metric: config.metric.clone(),
            cloud: config.cloud.clone(),
            region: config.region.clone(),
            strict_readiness: config.strict_readiness,
            poll_interval: READINESS_POLL_INTERVAL,
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

    #[inline]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Make sure the backing index exists, creating it if necessary.
    ///
    /// An index that already exists is trusted as-is; its dimension and
    /// metric are not re-validated. A freshly created index is polled for
    /// readiness a bounded number of times. When the bound is exhausted the
    /// client proceeds anyway and early operations may fail transiently,
    /// unless `strict_readiness` is configured, in which case this returns
    /// an error instead.
    #[inline]
    pub fn ensure_ready(&self) -> Result<()> {
        if self.exists()? {
            debug!("Index '{}' already exists", self.name);
            return Ok(());
        }

        info!(
            "Creating index '{}' ({} dimensions, {} metric)",
            self.name, self.dimension, self.metric
        );
        self.create()?;

        for attempt in 1..=READINESS_ATTEMPTS {
            match self.describe() {
                Ok(description) if description.status.ready => {
                    info!("Index '{}' is ready", self.name);
                    return Ok(());
                }
                Ok(_) => debug!(
                    "Index '{}' not ready yet (attempt {}/{})",
                    self.name, attempt, READINESS_ATTEMPTS
                ),
                Err(e) => warn!(
                    "Waiting for index '{}' (attempt {}/{}): {}",
                    self.name, attempt, READINESS_ATTEMPTS, e
                ),
            }
            std::thread::sleep(self.poll_interval);
        }

        if self.strict_readiness {
            return Err(RetrievalError::Index(format!(
                "index '{}' did not become ready after {} attempts",
                self.name, READINESS_ATTEMPTS
            )));
        }

        warn!(
            "Index '{}' still not ready after {} attempts, proceeding anyway",
            self.name, READINESS_ATTEMPTS
        );
        Ok(())
    }

    /// Whether an index with the configured name exists on the service
    #[inline]
    pub fn exists(&self) -> Result<bool> {
        let url = self.endpoint("/indexes")?;
        let response_text = self
            .get_text(&url)
            .map_err(|e| RetrievalError::Index(format!("failed to list indexes: {e}")))?;

        let listing: ListIndexesResponse = serde_json::from_str(&response_text)
            .map_err(|e| RetrievalError::Index(format!("failed to parse index listing: {e}")))?;

        Ok(listing.indexes.iter().any(|index| index.name == self.name))
    }

    /// Fetch the index description, including readiness state
    #[inline]
    pub fn describe(&self) -> Result<IndexDescription> {
        let url = self.endpoint(&format!("/indexes/{}", self.name))?;
        let response_text = self
            .get_text(&url)
            .map_err(|e| RetrievalError::Index(format!("failed to describe index: {e}")))?;

        serde_json::from_str(&response_text)
            .map_err(|e| RetrievalError::Index(format!("failed to parse index description: {e}")))
    }

    fn create(&self) -> Result<()> {
        let url = self.endpoint("/indexes")?;
        let request = CreateIndexRequest {
            name: &self.name,
            dimension: self.dimension,
            metric: &self.metric,
            spec: CloudSpec {
                cloud: &self.cloud,
                region: &self.region,
            },
        };
        let request_json = serde_json::to_string(&request).map_err(|e| {
            RetrievalError::Index(format!("failed to serialize create request: {e}"))
        })?;

        self.post_text(&url, &request_json)
            .map_err(|e| RetrievalError::Index(format!("failed to create index: {e}")))?;

        Ok(())
    }

    /// Store entries, partitioned into fixed-size batches submitted in order.
    ///
    /// A batch failure aborts the remaining batches; entries from earlier
    /// batches stay committed, and the returned [`RetrievalError::IndexWrite`]
    /// carries exactly how many were.
    #[inline]
    pub fn upsert(&self, entries: &[IndexedEntry]) -> Result<UpsertReport> {
        if entries.is_empty() {
            debug!("No entries to upsert");
            return Ok(UpsertReport {
                upserted: 0,
                batches: 0,
            });
        }

        let url = self.endpoint(&format!("/indexes/{}/vectors/upsert", self.name))?;

        let mut upserted = 0;
        let mut batches = 0;
        for batch in entries.chunks(UPSERT_BATCH_SIZE) {
            let request = UpsertRequest { vectors: batch };
            let request_json = serde_json::to_string(&request).map_err(|e| {
                RetrievalError::IndexWrite {
                    committed: upserted,
                    message: format!("failed to serialize upsert batch: {e}"),
                }
            })?;

            self.post_text(&url, &request_json)
                .map_err(|e| RetrievalError::IndexWrite {
                    committed: upserted,
                    message: format!("upsert batch of {} entries failed: {e}", batch.len()),
                })?;

            upserted += batch.len();
            batches += 1;
            debug!("Upserted batch of {} entries ({} total)", batch.len(), upserted);
        }

        info!(
            "Upserted {} entries into index '{}' in {} batches",
            upserted, self.name, batches
        );
        Ok(UpsertReport { upserted, batches })
    }

    /// Similarity search, returning up to `top_k` matches in the order the
    /// index ranked them.
    ///
    /// `Ok` with an empty vector means the index confirmed no matches; an
    /// infrastructure failure is an `Err`, so the two are distinguishable.
    #[inline]
    pub fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if query_vector.len() != self.dimension {
            return Err(RetrievalError::InvalidConfiguration(format!(
                "query vector has {} dimensions, index '{}' expects {}",
                query_vector.len(),
                self.name,
                self.dimension
            )));
        }

        debug!("Searching index '{}' with top_k {}", self.name, top_k);

        let response = self.query(&QueryRequest {
            vector: query_vector,
            top_k,
            include_metadata: true,
            filter: None,
        })?;

        let results = parse_matches(response.matches);
        if results.is_empty() {
            warn!("No matching entries found in index '{}'", self.name);
        }
        Ok(results)
    }

    /// Delete every entry whose metadata names `document`.
    ///
    /// Scan-then-delete: collects up to [`DELETE_SCAN_LIMIT`] matching ids
    /// with a filtered query, then deletes them in one call. Entries
    /// inserted for the same document during the scan window can be missed.
    /// Returns whether anything was deleted.
    #[inline]
    pub fn delete_by_document(&self, document: &str) -> Result<bool> {
        debug!(
            "Scanning index '{}' for entries from document '{}'",
            self.name, document
        );

        let zero_vector = vec![0.0; self.dimension];
        let scan = self.query(&QueryRequest {
            vector: &zero_vector,
            top_k: DELETE_SCAN_LIMIT,
            include_metadata: false,
            filter: Some(MetadataFilter { document }),
        })?;

        let ids: Vec<String> = scan.matches.into_iter().map(|m| m.id).collect();
        if ids.is_empty() {
            warn!("No entries found for document '{}'", document);
            return Ok(false);
        }

        let url = self.endpoint(&format!("/indexes/{}/vectors/delete", self.name))?;
        let request = DeleteRequest { ids: &ids };
        let request_json = serde_json::to_string(&request).map_err(|e| {
            RetrievalError::Index(format!("failed to serialize delete request: {e}"))
        })?;

        self.post_text(&url, &request_json)
            .map_err(|e| RetrievalError::Index(format!("failed to delete entries: {e}")))?;

        info!("Deleted {} entries for document '{}'", ids.len(), document);
        Ok(true)
    }

    fn query(&self, request: &QueryRequest<'_>) -> Result<QueryResponse> {
        let url = self.endpoint(&format!("/indexes/{}/query", self.name))?;
        let request_json = serde_json::to_string(request)
            .map_err(|e| RetrievalError::Index(format!("failed to serialize query: {e}")))?;

        let response_text = self
            .post_text(&url, &request_json)
            .map_err(|e| RetrievalError::Index(format!("query failed: {e}")))?;

        serde_json::from_str(&response_text)
            .map_err(|e| RetrievalError::Index(format!("failed to parse query response: {e}")))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RetrievalError::Index(format!("failed to build index URL: {e}")))
    }

    fn get_text(&self, url: &Url) -> std::result::Result<String, ureq::Error> {
        self.agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
    }

    fn post_text(&self, url: &Url, body: &str) -> std::result::Result<String, ureq::Error> {
        self.agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
    }
}

/// Flatten raw matches into caller-facing results. Entries missing metadata
/// keep their rank with placeholder fields.
fn parse_matches(matches: Vec<QueryMatch>) -> Vec<SearchResult> {
    matches
        .into_iter()
        .map(|m| {
            let metadata = m.metadata.unwrap_or_else(|| ChunkMetadata {
                text: "No text".to_string(),
                document: "Unknown".to_string(),
            });
            SearchResult {
                text: metadata.text,
                document: metadata.document,
                score: m.score,
            }
        })
        .collect()
}
