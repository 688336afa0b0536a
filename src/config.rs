//! Configuration management for the partner-scout gateway
//!
//! Everything is environment-driven. Service URLs default to the local
//! development stack; credentials have no defaults and are validated at the
//! point of use (`require_*` helpers) so read-only commands can run without
//! a bot token and vice versa.

use crate::{Error, Result};

/// Default model service URL (Ollama)
const DEFAULT_MODEL_URL: &str = "http://localhost:11434";

/// Default vector index URL (Qdrant)
const DEFAULT_INDEX_URL: &str = "http://localhost:6333";

/// Default vector collection name
const DEFAULT_COLLECTION: &str = "lpm_partners_demo";

/// Partner-scout gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store integration token (`NOTION_API_KEY`)
    pub store_api_key: Option<String>,

    /// Document store database id (`NOTION_DATABASE_ID`)
    pub store_database_id: Option<String>,

    /// Model service base URL (`OLLAMA_URL`)
    pub model_url: String,

    /// Generation model for query rewriting and answer synthesis
    pub chat_model: String,

    /// Cheaper classifier model for the relevance gate
    pub filter_model: String,

    /// Embedding model; must match between ingestion and query time
    pub embed_model: String,

    /// Vector index base URL (`QDRANT_URL`)
    pub index_url: String,

    /// Vector collection name (`SCOUT_COLLECTION`)
    pub collection: String,

    /// Telegram bot token (`TELEGRAM_BOT_TOKEN`)
    pub telegram_token: Option<String>,

    /// Number of neighbors retrieved per query (`SCOUT_TOP_K`)
    pub top_k: usize,
}

impl Config {
    /// Load configuration from the environment
    #[must_use]
    pub fn from_env() -> Self {
        let top_k = std::env::var("SCOUT_TOP_K")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3);

        Self {
            store_api_key: std::env::var("NOTION_API_KEY").ok(),
            store_database_id: std::env::var("NOTION_DATABASE_ID").ok(),
            model_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| DEFAULT_MODEL_URL.to_string()),
            chat_model: std::env::var("SCOUT_CHAT_MODEL")
                .unwrap_or_else(|_| "gemma3:27b".to_string()),
            filter_model: std::env::var("SCOUT_FILTER_MODEL")
                .unwrap_or_else(|_| "gemma3:12b".to_string()),
            embed_model: std::env::var("SCOUT_EMBED_MODEL")
                .unwrap_or_else(|_| "mxbai-embed-large".to_string()),
            index_url: std::env::var("QDRANT_URL")
                .unwrap_or_else(|_| DEFAULT_INDEX_URL.to_string()),
            collection: std::env::var("SCOUT_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string()),
            telegram_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            top_k,
        }
    }

    /// Document store credentials, required for ingestion and sync checks
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key or database id is unset
    pub fn require_store(&self) -> Result<(&str, &str)> {
        let key = self
            .store_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("NOTION_API_KEY is not set".to_string()))?;
        let db = self
            .store_database_id
            .as_deref()
            .ok_or_else(|| Error::Config("NOTION_DATABASE_ID is not set".to_string()))?;
        Ok((key, db))
    }

    /// Telegram bot token, required for serving
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is unset
    pub fn require_telegram_token(&self) -> Result<&str> {
        self.telegram_token
            .as_deref()
            .ok_or_else(|| Error::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))
    }
}
