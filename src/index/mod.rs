//! Vector index abstraction
//!
//! The vector index is the only durable state in the system: one collection
//! with a single named vector field (`text`, cosine distance) and one point
//! per partner. Consumed through the [`VectorIndex`] trait so ingestion and
//! retrieval can be tested against an in-memory fake.

pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use qdrant::QdrantIndex;

/// Name of the single named vector field
pub const VECTOR_FIELD: &str = "text";

/// Declared schema of an existing collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    /// Dimensionality of the named `text` vector; `None` when the
    /// collection exists but lacks that named vector
    pub text_size: Option<usize>,
}

/// A point to upsert: deterministic id, named vector, grounding payload
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPoint {
    /// Deterministic id derived from the partner name
    pub id: String,
    /// Embedding for the `text` named vector
    pub vector: Vec<f32>,
    /// Payload kept for grounding and auditing
    pub payload: PointPayload,
}

/// Payload stored with every point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayload {
    /// Partner display name
    #[serde(rename = "companyName")]
    pub company_name: String,
    /// Canonical chunk text the vector was embedded from
    pub chunk: String,
}

/// A vector index service holding one collection of partner points
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Read the schema of a collection; `Ok(None)` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Index`] if the inspect call fails
    async fn collection_schema(&self, collection: &str) -> Result<Option<CollectionSchema>>;

    /// Create a collection with a named `text` vector of the given size,
    /// cosine distance
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Index`] if creation fails
    async fn create_collection(&self, collection: &str, text_size: usize) -> Result<()>;

    /// Delete a collection
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Index`] if deletion fails
    async fn delete_collection(&self, collection: &str) -> Result<()>;

    /// Upsert a single point, waiting for the index to confirm persistence
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Upsert`] if the write is rejected
    async fn upsert_point(&self, collection: &str, point: IndexPoint) -> Result<()>;

    /// Nearest-neighbor search over the `text` vector; returns hit payloads
    /// in rank order
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Index`] if the search fails
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<serde_json::Value>>;

    /// Scroll point payloads without a query vector (for sync auditing)
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Index`] if the scroll fails
    async fn scroll_payloads(&self, collection: &str, limit: usize)
        -> Result<Vec<serde_json::Value>>;
}
