//! Shared test fakes for the document store, model service, and vector index

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use partner_scout::index::{CollectionSchema, IndexPoint, VectorIndex};
use partner_scout::prompts::{
    DEEP_FILTER_PROMPT, FINAL_ANSWER_PROMPT, IMPROVE_QUERY_PROMPT, QUICK_FILTER_PROMPT,
};
use partner_scout::providers::LanguageModel;
use partner_scout::store::{DocumentStore, Row, RowPage};
use partner_scout::{Error, Result};

/// In-memory document store fake
///
/// Serves a fixed row list in pages and resolves relation titles from a
/// fixed map; an id missing from the map resolves to "no title".
pub struct FakeStore {
    pub rows: Vec<Row>,
    pub titles: HashMap<String, String>,
}

impl FakeStore {
    pub fn new(rows: Vec<Row>, titles: &[(&str, &str)]) -> Self {
        Self {
            rows,
            titles: titles
                .iter()
                .map(|(id, title)| ((*id).to_string(), (*title).to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn query_rows(&self, cursor: Option<&str>, page_size: usize) -> Result<RowPage> {
        let start: usize = cursor.map_or(0, |c| c.parse().unwrap_or(0));
        let end = (start + page_size).min(self.rows.len());
        let rows = self.rows[start..end].to_vec();
        let next_cursor = if end < self.rows.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok(RowPage { rows, next_cursor })
    }

    async fn page_title(&self, page_id: &str) -> Result<Option<String>> {
        Ok(self.titles.get(page_id).cloned())
    }
}

/// Scripted model service fake
///
/// Chat replies are routed by system prompt: the two gate prompts return
/// the configured answers, query rewriting echoes the input, and answer
/// synthesis echoes its full input so tests can assert on the grounding
/// context. Embeddings come from [`embed_text`].
pub struct FakeModel {
    pub quick_answer: String,
    pub deep_answer: String,
    /// Substring that poisons an embedding with NaN when present
    pub nan_trigger: Option<String>,
    /// System prompts of every chat call, in order
    pub chat_prompts: Mutex<Vec<String>>,
    /// Texts of every embed call, in order
    pub embed_texts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn new(quick_answer: &str, deep_answer: &str) -> Self {
        Self {
            quick_answer: quick_answer.to_string(),
            deep_answer: deep_answer.to_string(),
            nan_trigger: None,
            chat_prompts: Mutex::new(Vec::new()),
            embed_texts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_nan_trigger(mut self, trigger: &str) -> Self {
        self.nan_trigger = Some(trigger.to_string());
        self
    }

    pub fn chat_prompts(&self) -> Vec<String> {
        self.chat_prompts.lock().unwrap().clone()
    }

    pub fn embed_texts(&self) -> Vec<String> {
        self.embed_texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn chat(&self, _model: &str, system_prompt: &str, user_content: &str) -> Result<String> {
        self.chat_prompts
            .lock()
            .unwrap()
            .push(system_prompt.to_string());

        if system_prompt == QUICK_FILTER_PROMPT {
            return Ok(self.quick_answer.clone());
        }
        if system_prompt == DEEP_FILTER_PROMPT {
            return Ok(self.deep_answer.clone());
        }
        if system_prompt == IMPROVE_QUERY_PROMPT {
            return Ok(user_content.to_string());
        }
        if system_prompt == FINAL_ANSWER_PROMPT {
            return Ok(format!("Based on:\n{user_content}"));
        }
        Err(Error::Model(format!("unexpected prompt: {system_prompt}")))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_texts.lock().unwrap().push(text.to_string());

        if let Some(trigger) = &self.nan_trigger {
            if text.contains(trigger.as_str()) {
                let mut poisoned = embed_text(text);
                poisoned[0] = f32::NAN;
                return Ok(poisoned);
            }
        }
        Ok(embed_text(text))
    }
}

/// Dimensionality of the fake embedding space
pub const EMBED_DIM: usize = 64;

/// Deterministic bag-of-words embedding over hash buckets
///
/// Texts sharing vocabulary land close under cosine similarity, so the
/// fake index ranks realistically without a real model.
pub fn embed_text(text: &str) -> Vec<f32> {
    let mut buckets = vec![0.0f32; EMBED_DIM];
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let hash: usize = word.bytes().fold(7usize, |acc, b| {
            acc.wrapping_mul(31).wrapping_add(b as usize)
        });
        buckets[hash % EMBED_DIM] += 1.0;
    }
    buckets
}

/// Cosine similarity; zero vectors compare as zero
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// One fake collection: declared size plus stored points by id
#[derive(Default)]
pub struct FakeCollection {
    pub text_size: usize,
    pub points: HashMap<String, (Vec<f32>, serde_json::Value)>,
}

/// In-memory vector index fake with real cosine ranking
#[derive(Default)]
pub struct FakeIndex {
    pub collections: Mutex<HashMap<String, FakeCollection>>,
    pub deletes: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<String>>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points stored in a collection
    pub fn point_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, |c| c.points.len())
    }

    /// Declared `text` vector size of a collection
    pub fn text_size(&self, collection: &str) -> Option<usize> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|c| c.text_size)
    }

    /// Payloads of a collection, sorted by point id for stable comparison
    pub fn payloads_sorted(&self, collection: &str) -> Vec<(String, serde_json::Value)> {
        let collections = self.collections.lock().unwrap();
        let mut payloads: Vec<(String, serde_json::Value)> = collections
            .get(collection)
            .map(|c| {
                c.points
                    .iter()
                    .map(|(id, (_, payload))| (id.clone(), payload.clone()))
                    .collect()
            })
            .unwrap_or_default();
        payloads.sort_by(|a, b| a.0.cmp(&b.0));
        payloads
    }

    /// Collections deleted so far
    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    /// Number of search calls so far
    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    /// Insert a point directly, bypassing the synchronizer
    pub fn inject_point(&self, collection: &str, id: &str, payload: serde_json::Value) {
        let mut collections = self.collections.lock().unwrap();
        let entry = collections.entry(collection.to_string()).or_default();
        entry
            .points
            .insert(id.to_string(), (vec![0.0; entry.text_size.max(1)], payload));
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn collection_schema(&self, collection: &str) -> Result<Option<CollectionSchema>> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|c| CollectionSchema {
                text_size: Some(c.text_size),
            }))
    }

    async fn create_collection(&self, collection: &str, text_size: usize) -> Result<()> {
        self.collections.lock().unwrap().insert(
            collection.to_string(),
            FakeCollection {
                text_size,
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(collection.to_string());
        self.collections.lock().unwrap().remove(collection);
        Ok(())
    }

    async fn upsert_point(&self, collection: &str, point: IndexPoint) -> Result<()> {
        let mut collections = self.collections.lock().unwrap();
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| Error::Upsert(format!("collection {collection} does not exist")))?;
        if point.vector.len() != entry.text_size {
            return Err(Error::Upsert(format!(
                "vector length {} does not match collection size {}",
                point.vector.len(),
                entry.text_size
            )));
        }
        let payload = serde_json::to_value(&point.payload)?;
        entry.points.insert(point.id, (point.vector, payload));
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<serde_json::Value>> {
        self.searches.lock().unwrap().push(collection.to_string());

        let collections = self.collections.lock().unwrap();
        let entry = collections
            .get(collection)
            .ok_or_else(|| Error::Index(format!("collection {collection} does not exist")))?;

        let mut scored: Vec<(f32, serde_json::Value)> = entry
            .points
            .values()
            .map(|(point_vector, payload)| (cosine(vector, point_vector), payload.clone()))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, payload)| payload)
            .collect())
    }

    async fn scroll_payloads(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<serde_json::Value>> {
        let collections = self.collections.lock().unwrap();
        let entry = collections
            .get(collection)
            .ok_or_else(|| Error::Index(format!("collection {collection} does not exist")))?;
        Ok(entry
            .points
            .values()
            .take(limit)
            .map(|(_, payload)| payload.clone())
            .collect())
    }
}

/// A row linked to a partner relation id, with the given currencies
pub fn partner_row(partner_id: &str, offer: &str, currencies: &[&str]) -> Row {
    Row {
        offer_reference: offer.to_string(),
        partner_relation_ids: vec![partner_id.to_string()],
        currencies: currencies.iter().map(ToString::to_string).collect(),
        status: "Active".to_string(),
        ..Row::default()
    }
}

/// A row with no partner relation at all
pub fn orphan_row(offer: &str) -> Row {
    Row {
        offer_reference: offer.to_string(),
        ..Row::default()
    }
}

/// Convenience: everything wired for an ingestion test
pub fn synchronizer_over(
    store: FakeStore,
    model: Arc<FakeModel>,
    index: Arc<FakeIndex>,
) -> partner_scout::IndexSynchronizer {
    partner_scout::IndexSynchronizer::new(
        partner_scout::RowAggregator::new(Arc::new(store)),
        model,
        index,
        "partners_test".to_string(),
    )
}

/// Collection name used by [`synchronizer_over`]
pub const TEST_COLLECTION: &str = "partners_test";
