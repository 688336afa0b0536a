//! Query pipeline: gate → normalize → embed → retrieve → synthesize
//!
//! Each query runs the five stages strictly in order. The two-stage gate
//! short-circuits on a cheap first-pass "no" so the stricter (and costlier)
//! second classifier only runs for plausibly relevant queries. Any model or
//! index failure after the gate yields [`QueryOutcome::Failed`]; callers
//! surface a generic apology, never internal detail.

use std::sync::Arc;

use crate::config::Config;
use crate::index::VectorIndex;
use crate::prompts::{
    DEEP_FILTER_PROMPT, FINAL_ANSWER_PROMPT, IMPROVE_QUERY_PROMPT, QUICK_FILTER_PROMPT,
};
use crate::providers::LanguageModel;
use crate::Result;

/// Terminal state of one query run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// A grounded answer was produced
    Answered(String),
    /// The relevance gate rejected the query; no retrieval cost was spent
    Rejected,
    /// A pipeline stage failed; the full error was logged internally
    Failed,
}

/// Orchestrates the per-query stages against the model and index services
pub struct QueryPipeline {
    model: Arc<dyn LanguageModel>,
    index: Arc<dyn VectorIndex>,
    collection: String,
    chat_model: String,
    filter_model: String,
    top_k: usize,
}

impl QueryPipeline {
    /// Create a pipeline from configuration and service clients
    #[must_use]
    pub fn new(config: &Config, model: Arc<dyn LanguageModel>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            model,
            index,
            collection: config.collection.clone(),
            chat_model: config.chat_model.clone(),
            filter_model: config.filter_model.clone(),
            top_k: config.top_k,
        }
    }

    /// Run one query to a terminal outcome
    pub async fn run(&self, user_text: &str) -> QueryOutcome {
        match self.gate(user_text).await {
            Ok(false) => return QueryOutcome::Rejected,
            Ok(true) => {}
            Err(e) => {
                tracing::error!(error = %e, "relevance gate failed");
                return QueryOutcome::Failed;
            }
        }

        match self.answer(user_text).await {
            Ok(answer) => QueryOutcome::Answered(answer),
            Err(e) => {
                tracing::error!(error = %e, "query pipeline failed");
                QueryOutcome::Failed
            }
        }
    }

    /// Two-stage relevance gate
    ///
    /// A normalized first-stage "no" rejects immediately without invoking
    /// the second classifier; otherwise only an exact normalized "yes"
    /// from the second stage passes.
    async fn gate(&self, user_text: &str) -> Result<bool> {
        let quick = self
            .model
            .chat(&self.filter_model, QUICK_FILTER_PROMPT, user_text)
            .await?;
        let quick = normalize_gate_answer(&quick);

        if quick == "no" {
            tracing::info!(query = %user_text, first = %quick, "gate rejected at first stage");
            return Ok(false);
        }

        let deep = self
            .model
            .chat(&self.filter_model, DEEP_FILTER_PROMPT, user_text)
            .await?;
        let deep = normalize_gate_answer(&deep);

        tracing::info!(query = %user_text, first = %quick, second = %deep, "gate audit");
        Ok(deep == "yes")
    }

    /// Stages 2–5: normalize, embed, retrieve, synthesize
    async fn answer(&self, user_text: &str) -> Result<String> {
        // Rewriting failures propagate; there is no silent fallback to the
        // raw query
        let improved = self
            .model
            .chat(&self.chat_model, IMPROVE_QUERY_PROMPT, user_text)
            .await?;
        tracing::info!(improved = %improved, "query normalized");

        let embedding = self.model.embed(&improved).await?;
        tracing::debug!(dimension = embedding.len(), "query embedded");

        let payloads = self
            .index
            .search(&self.collection, &embedding, self.top_k)
            .await?;
        let chunks: Vec<String> = payloads.iter().map(chunk_from_payload).collect();
        tracing::info!(hits = chunks.len(), "retrieved chunks");

        // Synthesis sees the original user text, not the rewritten query
        let context = label_chunks(&chunks);
        let prompt_input = format!("Query: {user_text}\n\nRetrieved:\n{context}");
        self.model
            .chat(&self.chat_model, FINAL_ANSWER_PROMPT, &prompt_input)
            .await
    }
}

/// Normalize a classifier reply for exact comparison
fn normalize_gate_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Extract the chunk text from a hit payload, falling back to raw JSON
fn chunk_from_payload(payload: &serde_json::Value) -> String {
    payload["chunk"]
        .as_str()
        .map_or_else(|| payload.to_string(), ToString::to_string)
}

/// Label retrieved chunks by rank for the synthesis prompt
fn label_chunks(chunks: &[String]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("Partner {}: {chunk}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_gate_answer() {
        assert_eq!(normalize_gate_answer("  Yes\n"), "yes");
        assert_eq!(normalize_gate_answer("NO"), "no");
        assert_eq!(normalize_gate_answer("Yes."), "yes.");
    }

    #[test]
    fn test_chunk_from_payload_prefers_chunk_field() {
        let payload = json!({"companyName": "Acme", "chunk": "Partner: Acme"});
        assert_eq!(chunk_from_payload(&payload), "Partner: Acme");
    }

    #[test]
    fn test_chunk_from_payload_falls_back_to_json() {
        let payload = json!({"companyName": "Acme"});
        assert_eq!(chunk_from_payload(&payload), payload.to_string());
    }

    #[test]
    fn test_label_chunks_ranks_from_one() {
        let chunks = vec!["a".to_string(), "b".to_string()];
        assert_eq!(label_chunks(&chunks), "Partner 1: a\nPartner 2: b");
    }
}
