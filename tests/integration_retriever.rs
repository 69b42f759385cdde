#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end ingest/query tests against mock embedder and index services

use docvec::RetrievalError;
use docvec::chunker::ChunkingOptions;
use docvec::config::{EmbedderConfig, IndexConfig};
use docvec::embeddings::EmbeddingClient;
use docvec::index::IndexClient;
use docvec::retriever::Retriever;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_DIMENSION: usize = 4;

/// Both mock services live on one wiremock server; the paths don't overlap.
fn test_retriever(server: &MockServer) -> Retriever {
    let url = Url::parse(&server.uri()).expect("mock server uri should parse");
    let host = url
        .host_str()
        .expect("mock server uri has a host")
        .to_string();
    let port = url.port().expect("mock server uri has a port");

    let embedder = EmbedderConfig {
        host: host.clone(),
        port,
        ..EmbedderConfig::default()
    };
    let index = IndexConfig {
        host,
        port,
        dimension: TEST_DIMENSION as u32,
        ..IndexConfig::default()
    };

    Retriever::from_parts(
        EmbeddingClient::new(&embedder).expect("embedding client should build"),
        IndexClient::new(&index).expect("index client should build"),
        ChunkingOptions {
            window: 4,
            overlap: 2,
        },
        TEST_DIMENSION,
    )
}

async fn mount_embedder(server: &MockServer, embeddings: Value) {
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embeddings": embeddings})),
        )
        .mount(server)
        .await;
}

async fn upsert_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .filter(|r| r.url.path().ends_with("/vectors/upsert"))
        .map(|r| serde_json::from_slice(&r.body).expect("body should be JSON"))
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn ingest_chunks_embeds_and_stores() {
    let server = MockServer::start().await;
    mount_embedder(
        &server,
        json!([[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/indexes/document-retrieval/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let retriever = test_retriever(&server);
    let stored = retriever
        .ingest("doc1", "one two three four five six")
        .expect("ingest should succeed");
    assert_eq!(stored, 2);

    let bodies = upsert_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let vectors = bodies[0]["vectors"].as_array().expect("vectors array");
    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0]["id"], "doc1_chunk_0");
    assert_eq!(vectors[0]["metadata"]["text"], "one two three four");
    assert_eq!(vectors[0]["metadata"]["document"], "doc1");
    assert_eq!(vectors[1]["id"], "doc1_chunk_1");
    assert_eq!(vectors[1]["metadata"]["text"], "three four five six");
}

#[tokio::test(flavor = "multi_thread")]
async fn reingestion_overwrites_the_same_ids() {
    let server = MockServer::start().await;
    mount_embedder(
        &server,
        json!([[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/indexes/document-retrieval/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let retriever = test_retriever(&server);
    let text = "one two three four five six";

    let first = retriever.ingest("doc1", text).expect("ingest should succeed");
    let second = retriever.ingest("doc1", text).expect("ingest should succeed");
    assert_eq!(first, second);

    let bodies = upsert_bodies(&server).await;
    assert_eq!(bodies.len(), 2);

    let ids = |body: &Value| -> Vec<String> {
        body["vectors"]
            .as_array()
            .expect("vectors array")
            .iter()
            .map(|v| v["id"].as_str().expect("id string").to_string())
            .collect()
    };
    assert_eq!(ids(&bodies[0]), ids(&bodies[1]));
}

#[tokio::test(flavor = "multi_thread")]
async fn query_returns_the_ingested_document() {
    let server = MockServer::start().await;
    mount_embedder(&server, json!([[1.0, 0.0, 0.0, 0.0]])).await;
    Mock::given(method("POST"))
        .and(path("/indexes/document-retrieval/query"))
        .and(body_partial_json(json!({"top_k": 1, "include_metadata": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [{
                "id": "doc1_chunk_0",
                "score": 0.99,
                "metadata": {"text": "one two three four", "document": "doc1"}
            }]
        })))
        .mount(&server)
        .await;

    let retriever = test_retriever(&server);
    let results = retriever
        .query("One Two Three Four", 1)
        .expect("query should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document, "doc1");
    assert!(results[0].score > 0.9);
}

#[tokio::test(flavor = "multi_thread")]
async fn query_with_no_matches_returns_empty() {
    let server = MockServer::start().await;
    mount_embedder(&server, json!([[0.0, 0.0, 1.0, 0.0]])).await;
    Mock::given(method("POST"))
        .and(path("/indexes/document-retrieval/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matches": []})))
        .mount(&server)
        .await;

    let retriever = test_retriever(&server);
    let results = retriever
        .query("nothing indexed yet", 1)
        .expect("query should succeed");
    assert!(results.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_text_fails_fast_without_network_calls() {
    let server = MockServer::start().await;

    let retriever = test_retriever(&server);
    let result = retriever.ingest("doc1", "   ");
    assert!(matches!(
        result,
        Err(RetrievalError::InvalidConfiguration(_))
    ));

    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert!(requests.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn dimension_mismatch_aborts_before_any_write() {
    let server = MockServer::start().await;
    // Three-dimensional vectors against a four-dimensional index.
    mount_embedder(&server, json!([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])).await;
    Mock::given(method("POST"))
        .and(path("/indexes/document-retrieval/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let retriever = test_retriever(&server);
    let result = retriever.ingest("doc1", "one two three four five six");
    assert!(matches!(result, Err(RetrievalError::Embedding(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn search_infrastructure_failure_propagates() {
    let server = MockServer::start().await;
    mount_embedder(&server, json!([[1.0, 0.0, 0.0, 0.0]])).await;
    Mock::given(method("POST"))
        .and(path("/indexes/document-retrieval/query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let retriever = test_retriever(&server);
    let result = retriever.query("anything", 1);
    assert!(matches!(result, Err(RetrievalError::Index(_))));
}
