//! Row aggregation: document store rows grouped by resolved partner
//!
//! The write path starts here. All rows are fetched (cursor-paginated),
//! partner and country relations are resolved, and rows are grouped by
//! partner name in first-seen order. Paging failures abort the whole pass;
//! a partially aggregated partner set must never reach the index.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::resolver::{RelationResolver, UNKNOWN_PARTNER, UNKNOWN_RELATED_PAGE};
use crate::store::{DocumentStore, Row};
use crate::Result;

/// Maximum rows requested per listing page
const PAGE_SIZE: usize = 100;

/// Rows grouped by resolved partner name, first-seen order
pub type PartnerGroups = IndexMap<String, Vec<Row>>;

/// Aggregates document store rows into per-partner groups
pub struct RowAggregator {
    store: Arc<dyn DocumentStore>,
    partner_resolver: RelationResolver,
    country_resolver: RelationResolver,
}

impl RowAggregator {
    /// Create an aggregator with fresh resolver caches
    ///
    /// Partner and country resolution use separate caches and separate
    /// sentinels: an unresolvable partner files the row under `"Unknown"`,
    /// while an unresolvable country is dropped from the row's country list
    /// entirely. The asymmetry is deliberate.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            partner_resolver: RelationResolver::new(store.clone(), UNKNOWN_PARTNER),
            country_resolver: RelationResolver::new(store.clone(), UNKNOWN_RELATED_PAGE),
            store,
        }
    }

    /// Aggregate every row in the database by resolved partner name
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Aggregation`] if any listing page fails;
    /// no partial result is returned.
    pub async fn aggregate(&self) -> Result<PartnerGroups> {
        let rows = self.fetch_all_rows().await?;
        self.group_rows(rows).await
    }

    /// Aggregate only the first `n` rows of the listing
    ///
    /// Cheap variant for probing (e.g. embedding dimensionality) without
    /// paying for a full pass.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Aggregation`] if any listing page fails
    pub async fn aggregate_first_n(&self, n: usize) -> Result<PartnerGroups> {
        let rows = self.fetch_first_n_rows(n).await?;
        self.group_rows(rows).await
    }

    /// Fetch the complete row listing
    async fn fetch_all_rows(&self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.store.query_rows(cursor.as_deref(), PAGE_SIZE).await?;
            rows.extend(page.rows);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(count = rows.len(), "fetched all rows");
        Ok(rows)
    }

    /// Fetch at most `n` rows, stopping the cursor walk early
    async fn fetch_first_n_rows(&self, n: usize) -> Result<Vec<Row>> {
        let mut rows: Vec<Row> = Vec::new();
        let mut cursor: Option<String> = None;

        while rows.len() < n {
            let remaining = n - rows.len();
            let page = self
                .store
                .query_rows(cursor.as_deref(), remaining.min(PAGE_SIZE))
                .await?;
            rows.extend(page.rows);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        rows.truncate(n);
        Ok(rows)
    }

    /// Resolve relations and group rows by partner name
    async fn group_rows(&self, rows: Vec<Row>) -> Result<PartnerGroups> {
        let mut groups: PartnerGroups = IndexMap::new();

        for mut row in rows {
            // Only the first partner relation is honored; rows with
            // multiple partner links are not supported
            let name = match row.partner_relation_ids.first() {
                Some(id) => self.partner_resolver.resolve(id).await,
                None => UNKNOWN_PARTNER.to_string(),
            };

            row.countries = self.resolve_countries(&row.country_relation_ids).await;
            groups.entry(name).or_default().push(row);
        }

        tracing::debug!(partners = groups.len(), "aggregated rows by partner");
        Ok(groups)
    }

    /// Resolve every country relation, dropping failures silently
    async fn resolve_countries(&self, relation_ids: &[String]) -> Vec<String> {
        let mut countries = Vec::with_capacity(relation_ids.len());
        for id in relation_ids {
            let name = self.country_resolver.resolve(id).await;
            if name != self.country_resolver.sentinel() {
                countries.push(name);
            }
        }
        countries
    }
}
