//! Index synchronization: partner chunks → vector collection
//!
//! Reconciles the collection schema against the embedding dimensionality
//! actually being produced, then upserts one point per partner. Point ids
//! are deterministic, upserts wait for durability, and re-running against
//! unchanged data is a no-op on index contents.

use std::sync::Arc;

use crate::aggregate::RowAggregator;
use crate::chunk::build_chunk;
use crate::index::{IndexPoint, PointPayload, VectorIndex};
use crate::providers::LanguageModel;
use crate::resolver::UNKNOWN_PARTNER;
use crate::{Error, Result};

/// Scroll window used when auditing index contents
const SCROLL_LIMIT: usize = 2000;

/// Outcome of one ingestion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Partners written to the index
    pub upserted: usize,
    /// Partners skipped after a validation or upsert failure
    pub skipped: usize,
}

/// Two-way difference between store partners and index payloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Partners present in the document store but missing from the index
    pub store_only: Vec<String>,
    /// Partners present in the index but no longer in the document store
    pub index_only: Vec<String>,
}

impl SyncReport {
    /// True when both systems hold the same partner set
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.store_only.is_empty() && self.index_only.is_empty()
    }
}

/// Keeps the vector collection consistent with the current aggregation
pub struct IndexSynchronizer {
    aggregator: RowAggregator,
    model: Arc<dyn LanguageModel>,
    index: Arc<dyn VectorIndex>,
    collection: String,
}

impl IndexSynchronizer {
    /// Create a synchronizer over the given collaborators
    #[must_use]
    pub fn new(
        aggregator: RowAggregator,
        model: Arc<dyn LanguageModel>,
        index: Arc<dyn VectorIndex>,
        collection: String,
    ) -> Self {
        Self {
            aggregator,
            model,
            index,
            collection,
        }
    }

    /// Run a full ingestion pass
    ///
    /// Aggregates all rows, probes the embedding dimensionality from the
    /// first indexable chunk, heals the collection schema, then upserts
    /// partners in aggregation order. Validation and upsert failures skip
    /// that partner only; aggregation, probe, and schema failures abort
    /// the pass.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the pass as a whole fails
    pub async fn run(&self) -> Result<IngestReport> {
        let groups = self.aggregator.aggregate().await?;

        // Sentinel groups and empty renderings are never indexed
        let chunks: Vec<(String, String)> = groups
            .iter()
            .filter(|(name, _)| !name.is_empty() && name.as_str() != UNKNOWN_PARTNER)
            .map(|(name, rows)| (name.clone(), build_chunk(name, rows)))
            .filter(|(_, chunk)| !chunk.trim().is_empty())
            .collect();

        let Some((first_name, first_chunk)) = chunks.first() else {
            tracing::warn!("no indexable partner groups; nothing to ingest");
            return Ok(IngestReport::default());
        };

        // The first successfully embedded chunk fixes the dimensionality
        // for the whole pass
        let probe = self.model.embed(first_chunk).await?;
        let dimension = probe.len();
        tracing::info!(partner = %first_name, dimension, "probed embedding dimensionality");

        self.ensure_collection(dimension).await?;

        let mut report = IngestReport::default();
        for (name, chunk) in &chunks {
            match self.upsert_partner(name, chunk, dimension).await {
                Ok(()) => {
                    report.upserted += 1;
                    if report.upserted % 10 == 0 {
                        tracing::info!(upserted = report.upserted, "ingestion progress");
                    }
                }
                Err(e @ (Error::Validation(_) | Error::Upsert(_))) => {
                    tracing::warn!(partner = %name, error = %e, "skipping partner");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            upserted = report.upserted,
            skipped = report.skipped,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Reconcile the collection schema against the expected dimensionality
    ///
    /// Missing collection, missing named vector, or mismatched size all
    /// lead to destroy-and-recreate; a matching schema is a no-op. Must run
    /// before any upsert of a pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Index`] if any schema operation fails
    pub async fn ensure_collection(&self, expected_dim: usize) -> Result<()> {
        match self.index.collection_schema(&self.collection).await? {
            Some(schema) if schema.text_size == Some(expected_dim) => {
                tracing::debug!(collection = %self.collection, "collection schema already correct");
                Ok(())
            }
            Some(schema) => {
                tracing::info!(
                    collection = %self.collection,
                    found = ?schema.text_size,
                    expected = expected_dim,
                    "collection schema mismatch, recreating"
                );
                self.index.delete_collection(&self.collection).await?;
                self.index
                    .create_collection(&self.collection, expected_dim)
                    .await
            }
            None => {
                tracing::info!(collection = %self.collection, "collection absent, creating");
                self.index
                    .create_collection(&self.collection, expected_dim)
                    .await
            }
        }
    }

    /// Embed, validate, and upsert one partner chunk
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed embedding or payload,
    /// [`Error::Upsert`] for a rejected write, [`Error::Model`] for an
    /// embedding call failure
    pub async fn upsert_partner(
        &self,
        partner_name: &str,
        chunk: &str,
        expected_dim: usize,
    ) -> Result<()> {
        let embedding = self.model.embed(chunk).await?;
        validate_embedding(&embedding, expected_dim)?;

        let payload = PointPayload {
            company_name: partner_name.to_string(),
            chunk: chunk.to_string(),
        };
        serde_json::to_string(&payload)
            .map_err(|e| Error::Validation(format!("payload not serializable: {e}")))?;

        let point = IndexPoint {
            id: point_id(partner_name),
            vector: embedding,
            payload,
        };

        self.index.upsert_point(&self.collection, point).await?;
        tracing::debug!(partner = %partner_name, "partner upserted");
        Ok(())
    }

    /// Compare partner names in the store against index payloads
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aggregation`] or [`Error::Index`] when either side
    /// cannot be listed
    pub async fn check_sync(&self) -> Result<SyncReport> {
        let groups = self.aggregator.aggregate().await?;
        let store_names: Vec<String> = groups
            .keys()
            .filter(|name| !name.is_empty() && name.as_str() != UNKNOWN_PARTNER)
            .cloned()
            .collect();

        let payloads = self
            .index
            .scroll_payloads(&self.collection, SCROLL_LIMIT)
            .await?;
        let mut index_names: Vec<String> = Vec::new();
        for payload in &payloads {
            if let Some(name) = payload["companyName"].as_str() {
                if !name.is_empty() && !index_names.iter().any(|n| n == name) {
                    index_names.push(name.to_string());
                }
            }
        }

        let store_only = store_names
            .iter()
            .filter(|name| !index_names.contains(name))
            .cloned()
            .collect();
        let index_only = index_names
            .iter()
            .filter(|name| !store_names.contains(name))
            .cloned()
            .collect();

        Ok(SyncReport {
            store_only,
            index_only,
        })
    }
}

/// Derive the deterministic point id for a partner name
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`, so re-ingesting the
/// same partner overwrites its point instead of duplicating it.
#[must_use]
pub fn point_id(partner_name: &str) -> String {
    let sanitized: String = partner_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("company_{sanitized}")
}

/// Check an embedding has the expected length and only finite values
fn validate_embedding(embedding: &[f32], expected_dim: usize) -> Result<()> {
    if embedding.len() != expected_dim {
        return Err(Error::Validation(format!(
            "embedding length {} does not match expected {expected_dim}",
            embedding.len()
        )));
    }
    if let Some(position) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(Error::Validation(format!(
            "embedding contains a non-finite value at position {position}"
        )));
    }
    Ok(())
}
