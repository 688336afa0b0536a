//! Model service abstraction
//!
//! Chat completion and text embedding are consumed through the
//! [`LanguageModel`] trait so the pipeline and synchronizer can be tested
//! against scripted fakes.

pub mod ollama;

use async_trait::async_trait;

use crate::Result;

pub use ollama::OllamaClient;

/// A model service exposing chat completion and text embedding
///
/// The embedding model is fixed per client instance; it must match between
/// ingestion and query time or retrieval quality silently degrades. Chat
/// calls name their model explicitly because gating and generation use
/// different ones.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run a chat completion and return the trimmed assistant reply
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Model`] if the call fails
    async fn chat(&self, model: &str, system_prompt: &str, user_content: &str) -> Result<String>;

    /// Embed a text into a fixed-length vector
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Model`] if the call fails
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
