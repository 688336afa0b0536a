//! Notion document store client
//!
//! Thin REST client for the database that holds partner offer rows. Listing
//! errors map to [`Error::Aggregation`] (fatal to a pass), page retrieval
//! errors map to [`Error::Resolution`] (degraded to a sentinel upstream).

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DocumentStore, Row, RowPage};
use crate::{Error, Result};

/// Notion API base URL
const API_BASE: &str = "https://api.notion.com/v1";

/// Notion API version header value
const API_VERSION: &str = "2022-06-28";

/// Notion document store client
#[derive(Debug, Clone)]
pub struct NotionStore {
    client: Client,
    api_key: String,
    database_id: String,
    base_url: String,
}

impl NotionStore {
    /// Create a client for the given integration key and database
    #[must_use]
    pub fn new(api_key: String, database_id: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            database_id,
            base_url: API_BASE.to_string(),
        }
    }

    /// Create a client against a custom base URL (for local stand-ins)
    #[must_use]
    pub fn with_base_url(api_key: String, database_id: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            database_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for NotionStore {
    async fn query_rows(&self, cursor: Option<&str>, page_size: usize) -> Result<RowPage> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);

        let request = QueryRequest {
            start_cursor: cursor,
            page_size,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Aggregation(format!("database query failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Aggregation(format!(
                "database query error: {status} - {body}"
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::Aggregation(format!("database query parse error: {e}")))?;

        let rows = parsed
            .results
            .iter()
            .map(|page| Row::from_properties(&page.properties))
            .collect();

        let next_cursor = if parsed.has_more {
            parsed.next_cursor
        } else {
            None
        };

        Ok(RowPage { rows, next_cursor })
    }

    async fn page_title(&self, page_id: &str) -> Result<Option<String>> {
        let url = format!("{}/pages/{page_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| Error::Resolution(format!("page fetch failed for {page_id}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Resolution(format!(
                "page fetch error for {page_id}: {status}"
            )));
        }

        let page: PageResponse = response
            .json()
            .await
            .map_err(|e| Error::Resolution(format!("page parse error for {page_id}: {e}")))?;

        Ok(extract_title(&page.properties))
    }
}

/// First non-empty title property's plain text, if any
fn extract_title(properties: &serde_json::Value) -> Option<String> {
    let map = properties.as_object()?;
    for property in map.values() {
        if property["type"].as_str() == Some("title") {
            if let Some(text) = property["title"][0]["plain_text"].as_str() {
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
    }
    None
}

/// Database query request body
#[derive(Serialize)]
struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
    page_size: usize,
}

/// Database query response
#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<PageResponse>,
    has_more: bool,
    next_cursor: Option<String>,
}

/// A page object; only the property map is consumed
#[derive(Deserialize)]
struct PageResponse {
    #[serde(default)]
    properties: serde_json::Value,
}
