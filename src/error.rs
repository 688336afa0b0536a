//! Error types for the partner-scout gateway

use thiserror::Error;

/// Result type alias for partner-scout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the partner-scout gateway
///
/// Two failure policies coexist on the ingestion path: unit-of-work failures
/// ([`Error::Resolution`], [`Error::Validation`], [`Error::Upsert`]) are
/// isolated by their callers, logged, and degrade or skip, while
/// pass-integrity failures ([`Error::Aggregation`]) abort the whole pass.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Relation title lookup failed; callers degrade to a sentinel
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Row listing or paging failed; aborts the whole aggregation pass
    #[error("aggregation error: {0}")]
    Aggregation(String),

    /// Embedding or payload failed validation; that item is skipped
    #[error("validation error: {0}")]
    Validation(String),

    /// Index write rejected; that item is skipped
    #[error("upsert error: {0}")]
    Upsert(String),

    /// Model service (chat or embedding) error
    #[error("model error: {0}")]
    Model(String),

    /// Vector index service error
    #[error("index error: {0}")]
    Index(String),

    /// Messaging channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
