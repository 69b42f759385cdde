// Responder module
// Stand-in for a real answer-generation model


use tracing::debug;

use crate::index::SearchResult;

/// Minimum similarity score for a result to be treated as usable context
const RELEVANCE_THRESHOLD: f32 = 0.5;
/// Longest context excerpt included in a generated response
const CONTEXT_EXCERPT_CHARS: usize = 300;

/// Formats a canned response from a query and the top-ranked search result.
#[derive(Debug, Clone)]
pub struct MockResponder {
    model_name: String,
}

/// Generated response plus generation metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub response: String,
    pub model: String,
    pub context_relevance: f32,
}

impl Default for MockResponder {
    #[inline]
    fn default() -> Self {
        Self::new("default")
    }
}

impl MockResponder {
    #[inline]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }

    /// Produce a context-grounded response when the result clears the
    /// relevance threshold, and a refinement hint otherwise.
    #[inline]
    pub fn generate_response(&self, query: &str, context: &SearchResult) -> Response {
        let response = if context.score > RELEVANCE_THRESHOLD {
            let excerpt: String = context.text.chars().take(CONTEXT_EXCERPT_CHARS).collect();
            format!(
                "Based on the context from '{}', here's a focused response to: {}\n\n\
                 Context: {}...\n\n\
                 Response: [Simulated context-aware response]",
                context.document, query, excerpt
            )
        } else {
            "The provided context doesn't seem sufficiently relevant. \
             Consider refining your query or providing more specific information."
                .to_string()
        };

        debug!(
            "Response generated | Query Length: {} | Context Relevance: {:.2}",
            query.len(),
            context.score
        );

        Response {
            response,
            model: self.model_name.clone(),
            context_relevance: context.score,
        }
    }
}
