//! Document store abstraction and row model
//!
//! The document store is the source of truth for partner records. It is
//! consumed through the [`DocumentStore`] trait so the aggregation and
//! ingestion code can be exercised against in-memory fakes.

pub mod notion;

use async_trait::async_trait;

use crate::Result;

pub use notion::NotionStore;

/// One page of row listing results
#[derive(Debug, Clone, Default)]
pub struct RowPage {
    /// Rows in this page, in store order
    pub rows: Vec<Row>,
    /// Cursor for the next page; `None` when the listing is exhausted
    pub next_cursor: Option<String>,
}

/// A document store exposing paginated row listing and relation-title lookup
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one page of rows, at most `page_size` entries
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Aggregation`] if the listing request fails;
    /// callers must not treat a partial listing as usable.
    async fn query_rows(&self, cursor: Option<&str>, page_size: usize) -> Result<RowPage>;

    /// Fetch a referenced page and extract its title
    ///
    /// Returns `Ok(None)` when the page exists but carries no non-empty
    /// title property.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Resolution`] if the page cannot be fetched
    async fn page_title(&self, page_id: &str) -> Result<Option<String>>;
}

/// One raw partner record from the document store
///
/// Every field has a defined default so a row missing an expected property
/// renders as empty rather than failing. `countries` starts empty and is
/// filled by the aggregator after relation resolution; the row is not
/// shared outside the aggregation pass that created it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Offer reference title, empty when absent
    pub offer_reference: String,
    /// Partner relation page ids; only the first is honored
    pub partner_relation_ids: Vec<String>,
    /// Country relation page ids, each resolved independently
    pub country_relation_ids: Vec<String>,
    /// Resolved country names, filled during aggregation
    pub countries: Vec<String>,
    /// Accepted currency codes
    pub currencies: Vec<String>,
    /// Row status name, empty when absent
    pub status: String,
    /// Payment fee, rich-text preferred with numeric fallback
    pub payment_fee: String,
    /// Risk tags
    pub risk_types: Vec<String>,
    /// Number of related LPM entities
    pub lpm_count: usize,
}

impl Row {
    /// Build a row from a wire-format property map
    ///
    /// Extraction is defensive: a property that is missing, mistyped, or
    /// empty yields that field's default.
    #[must_use]
    pub fn from_properties(properties: &serde_json::Value) -> Self {
        Self {
            offer_reference: title_text(&properties["Offer Reference"]),
            partner_relation_ids: relation_ids(&properties["Partner name"]),
            country_relation_ids: relation_ids(&properties["Country"]),
            countries: Vec::new(),
            currencies: multi_select_names(&properties["*Currency"]),
            status: properties["Status"]["status"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            payment_fee: fee_text(&properties["*Payment fee %"]),
            risk_types: multi_select_names(&properties["*Type of Risk"]),
            lpm_count: properties["*For LPM"]["relation"]
                .as_array()
                .map_or(0, Vec::len),
        }
    }
}

/// Plain text of the first title fragment, empty when absent
fn title_text(property: &serde_json::Value) -> String {
    property["title"][0]["plain_text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Page ids of a relation property
fn relation_ids(property: &serde_json::Value) -> Vec<String> {
    property["relation"]
        .as_array()
        .map(|rels| {
            rels.iter()
                .filter_map(|rel| rel["id"].as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Option names of a multi-select property
fn multi_select_names(property: &serde_json::Value) -> Vec<String> {
    property["multi_select"]
        .as_array()
        .map(|opts| {
            opts.iter()
                .filter_map(|opt| opt["name"].as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Fee as text: rich-text content first, numeric value second, empty last
fn fee_text(property: &serde_json::Value) -> String {
    if let Some(text) = property["rich_text"][0]["plain_text"].as_str() {
        return text.to_string();
    }
    property["number"]
        .as_f64()
        .map(|n| {
            // Render integral fees without a trailing ".0"
            if n.fract() == 0.0 {
                format!("{}", n as i64)
            } else {
                format!("{n}")
            }
        })
        .unwrap_or_default()
}
