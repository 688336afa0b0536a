//! Partner Scout - Retrieval-augmented Telegram gateway for partner discovery
//!
//! This library provides the core functionality for the gateway:
//! - Aggregation of document store rows into per-partner chunks
//! - Idempotent synchronization of chunks into a vector index
//! - The query pipeline: gate, rewrite, embed, retrieve, synthesize
//! - Delivery adapters (Telegram bot, CLI harness)
//!
//! # Architecture
//!
//! ```text
//! write path:
//!   Document Store ──▶ Row Aggregator ──▶ Chunk Builder ──▶ Index Synchronizer ──▶ Vector Index
//!
//! read path:
//!   Telegram / CLI ──▶ Query Pipeline ──▶ Model Service + Vector Index ──▶ grounded answer
//! ```
//!
//! The two paths are coupled only through the shared chunk/embedding
//! contract: the same chunk text is embedded at ingestion time and grounds
//! the generated answer at query time.

pub mod aggregate;
pub mod channels;
pub mod chunk;
pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod resolver;
pub mod store;

pub use aggregate::{PartnerGroups, RowAggregator};
pub use channels::TelegramBot;
pub use chunk::build_chunk;
pub use config::Config;
pub use error::{Error, Result};
pub use index::{CollectionSchema, IndexPoint, PointPayload, QdrantIndex, VectorIndex};
pub use ingest::{point_id, IndexSynchronizer, IngestReport, SyncReport};
pub use pipeline::{QueryOutcome, QueryPipeline};
pub use providers::{LanguageModel, OllamaClient};
pub use resolver::{RelationResolver, UNKNOWN_PARTNER, UNKNOWN_RELATED_PAGE};
pub use store::{DocumentStore, NotionStore, Row, RowPage};
