//! Qdrant vector index client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{CollectionSchema, IndexPoint, VectorIndex, VECTOR_FIELD};
use crate::{Error, Result};

/// Qdrant REST client
#[derive(Debug, Clone)]
pub struct QdrantIndex {
    client: Client,
    base_url: String,
}

impl QdrantIndex {
    /// Create a client against the given base URL
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{collection}", self.base_url)
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn collection_schema(&self, collection: &str) -> Result<Option<CollectionSchema>> {
        let response = self
            .client
            .get(self.collection_url(collection))
            .send()
            .await
            .map_err(|e| Error::Index(format!("collection inspect failed: {e}")))?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Index(format!(
                "collection inspect error: {status} - {body}"
            )));
        }

        let parsed: CollectionInfoResponse = response
            .json()
            .await
            .map_err(|e| Error::Index(format!("collection inspect parse error: {e}")))?;

        let text_size = parsed.result.config.params.vectors[VECTOR_FIELD]["size"]
            .as_u64()
            .map(|size| size as usize);

        Ok(Some(CollectionSchema { text_size }))
    }

    async fn create_collection(&self, collection: &str, text_size: usize) -> Result<()> {
        let body = json!({
            "vectors": { VECTOR_FIELD: { "size": text_size, "distance": "Cosine" } }
        });

        let response = self
            .client
            .put(self.collection_url(collection))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Index(format!("collection create failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Index(format!(
                "collection create error: {status} - {body}"
            )));
        }

        tracing::info!(collection, size = text_size, "collection created");
        Ok(())
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.collection_url(collection))
            .send()
            .await
            .map_err(|e| Error::Index(format!("collection delete failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Index(format!(
                "collection delete error: {status} - {body}"
            )));
        }

        tracing::info!(collection, "collection deleted");
        Ok(())
    }

    async fn upsert_point(&self, collection: &str, point: IndexPoint) -> Result<()> {
        let url = format!("{}/points?wait=true", self.collection_url(collection));

        let body = json!({
            "points": [{
                "id": point.id,
                "vector": { VECTOR_FIELD: point.vector },
                "payload": point.payload,
            }]
        });

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upsert(format!("point upsert failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upsert(format!(
                "point upsert error: {status} - {body}"
            )));
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/points/search", self.collection_url(collection));

        let body = json!({
            "vector": { "name": VECTOR_FIELD, "vector": vector },
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Index(format!("search failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Index(format!("search error: {status} - {body}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Index(format!("search parse error: {e}")))?;

        Ok(parsed.result.into_iter().map(|hit| hit.payload).collect())
    }

    async fn scroll_payloads(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/points/scroll", self.collection_url(collection));

        let body = json!({ "limit": limit, "with_payload": true });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Index(format!("scroll failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Index(format!("scroll error: {status} - {body}")));
        }

        let parsed: ScrollResponse = response
            .json()
            .await
            .map_err(|e| Error::Index(format!("scroll parse error: {e}")))?;

        Ok(parsed
            .result
            .points
            .into_iter()
            .map(|point| point.payload)
            .collect())
    }
}

/// GET /collections/{name} response
#[derive(Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(Deserialize)]
struct CollectionInfo {
    config: CollectionConfig,
}

#[derive(Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Deserialize)]
struct CollectionParams {
    #[serde(default)]
    vectors: serde_json::Value,
}

/// POST /points/search response
#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default)]
    payload: serde_json::Value,
}

/// POST /points/scroll response
#[derive(Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Deserialize)]
struct ScrollResult {
    #[serde(default)]
    points: Vec<ScrollPoint>,
}

#[derive(Deserialize)]
struct ScrollPoint {
    #[serde(default)]
    payload: serde_json::Value,
}
