//! Count + cursor-chained page queries.
//!
//! The backing store only supports forward continuation ("strictly after a
//! given row"), so page N is reached through the boundary of page N-1. The
//! pager keeps an explicit map from (filter fingerprint, page) to the
//! boundary cursor recorded when that page was last fetched: revisiting a
//! page jumps straight to its stored boundary, while an unvisited page is
//! derived by walking forward from the nearest known boundary.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::models::Resource;
use crate::query::PredicateSet;
use crate::store::{Cursor, ResourceStore, StoreError};

/// Executes the count and page queries for one request.
pub struct Pager {
    store: Arc<dyn ResourceStore>,
    /// (filter fingerprint, page) -> boundary cursor after that page.
    boundaries: DashMap<(String, u32), Cursor>,
}

impl Pager {
    /// Create a pager over the given store.
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            boundaries: DashMap::new(),
        }
    }

    /// Exact count of rows matching the predicate set.
    ///
    /// Always computed, even when fetching page > 1, so total-page display
    /// stays accurate.
    pub async fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError> {
        self.store.count(predicates).await
    }

    /// One page of rows, created-ascending, at most `limit` long.
    ///
    /// Pages are 1-based. Requesting a page past the end of the result set
    /// returns an empty page.
    pub async fn fetch_page(
        &self,
        predicates: &PredicateSet,
        limit: u32,
        page: u32,
    ) -> Result<Vec<Resource>, StoreError> {
        if page <= 1 {
            let rows = self.store.fetch_ordered(predicates, limit, None).await?;
            self.record_boundary(predicates, 1, &rows);
            return Ok(rows);
        }

        let Some(after) = self.boundary_before(predicates, page, limit).await? else {
            // Derivation walked off the end of the result set.
            return Ok(Vec::new());
        };

        let rows = self
            .store
            .fetch_ordered(predicates, limit, Some(&after))
            .await?;
        self.record_boundary(predicates, page, &rows);
        Ok(rows)
    }

    /// Boundary cursor after page `page - 1`.
    ///
    /// Walks forward from the nearest earlier known boundary, fetching
    /// intermediate pages at the same limit and recording each boundary on
    /// the way. Returns `None` when the result set is exhausted before the
    /// requested page.
    async fn boundary_before(
        &self,
        predicates: &PredicateSet,
        page: u32,
        limit: u32,
    ) -> Result<Option<Cursor>, StoreError> {
        let fingerprint = predicates.fingerprint();

        let mut known_page = 0;
        let mut cursor: Option<Cursor> = None;
        for earlier in (1..page).rev() {
            if let Some(found) = self.boundaries.get(&(fingerprint.clone(), earlier)) {
                known_page = earlier;
                cursor = Some(*found);
                break;
            }
        }

        if known_page + 1 < page {
            debug!(
                page,
                from = known_page,
                "deriving boundary cursors sequentially"
            );
        }

        for intermediate in (known_page + 1)..page {
            let rows = self
                .store
                .fetch_ordered(predicates, limit, cursor.as_ref())
                .await?;
            let Some(last) = rows.last() else {
                return Ok(None);
            };
            cursor = Some(Cursor::after(last));
            self.boundaries
                .insert((fingerprint.clone(), intermediate), Cursor::after(last));
        }

        Ok(cursor)
    }

    fn record_boundary(&self, predicates: &PredicateSet, page: u32, rows: &[Resource]) {
        if let Some(last) = rows.last() {
            self.boundaries
                .insert((predicates.fingerprint(), page), Cursor::after(last));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, SourceFilter, SourceType};
    use crate::query::planner;
    use crate::store::memory::MemoryStore;
    use uuid::Uuid;

    fn resource(category_id: Uuid, created: i64) -> Resource {
        Resource {
            id: Uuid::now_v7(),
            catalog: Catalog::Symptom,
            category_id,
            source: SourceType::Article,
            created,
            payload: serde_json::json!({}),
        }
    }

    fn seeded(category_id: Uuid, n: i64) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for created in 1..=n {
            store.insert_resource(resource(category_id, created));
        }
        store
    }

    #[tokio::test]
    async fn first_page_is_created_ascending() {
        let category = Uuid::now_v7();
        let store = seeded(category, 5);
        let pager = Pager::new(store);
        let predicates = planner::plan(Catalog::Symptom, category, SourceFilter::All);

        let rows = pager.fetch_page(&predicates, 2, 1).await.unwrap();
        let created: Vec<i64> = rows.iter().map(|r| r.created).collect();
        assert_eq!(created, vec![1, 2]);
    }

    #[tokio::test]
    async fn second_page_continues_after_boundary() {
        let category = Uuid::now_v7();
        let store = seeded(category, 5);
        let pager = Pager::new(store);
        let predicates = planner::plan(Catalog::Symptom, category, SourceFilter::All);

        let rows = pager.fetch_page(&predicates, 2, 2).await.unwrap();
        let created: Vec<i64> = rows.iter().map(|r| r.created).collect();
        assert_eq!(created, vec![3, 4]);
    }

    #[tokio::test]
    async fn deep_page_derives_intermediate_boundaries() {
        let category = Uuid::now_v7();
        let store = seeded(category, 7);
        let pager = Pager::new(Arc::clone(&store) as Arc<dyn ResourceStore>);
        let predicates = planner::plan(Catalog::Symptom, category, SourceFilter::All);

        let rows = pager.fetch_page(&predicates, 2, 4).await.unwrap();
        let created: Vec<i64> = rows.iter().map(|r| r.created).collect();
        assert_eq!(created, vec![7]);
        // Pages 1..3 were each fetched once to derive their boundaries.
        assert_eq!(store.resource_queries(), 4);
    }

    #[tokio::test]
    async fn revisit_uses_recorded_boundary() {
        let category = Uuid::now_v7();
        let store = seeded(category, 6);
        let pager = Pager::new(Arc::clone(&store) as Arc<dyn ResourceStore>);
        let predicates = planner::plan(Catalog::Symptom, category, SourceFilter::All);

        pager.fetch_page(&predicates, 2, 1).await.unwrap();
        pager.fetch_page(&predicates, 2, 2).await.unwrap();
        let before = store.resource_queries();

        // Page 2 again: its boundary source (page 1) is already recorded,
        // so exactly one query is issued.
        let rows = pager.fetch_page(&predicates, 2, 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(store.resource_queries(), before + 1);

        // Page 3 continues from page 2's recorded boundary.
        let rows = pager.fetch_page(&predicates, 2, 3).await.unwrap();
        let created: Vec<i64> = rows.iter().map(|r| r.created).collect();
        assert_eq!(created, vec![5, 6]);
        assert_eq!(store.resource_queries(), before + 2);
    }

    #[tokio::test]
    async fn page_past_end_is_empty() {
        let category = Uuid::now_v7();
        let store = seeded(category, 3);
        let pager = Pager::new(store);
        let predicates = planner::plan(Catalog::Symptom, category, SourceFilter::All);

        let rows = pager.fetch_page(&predicates, 2, 5).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn boundaries_are_scoped_by_fingerprint() {
        let category = Uuid::now_v7();
        let other = Uuid::now_v7();
        let store = Arc::new(MemoryStore::new());
        for created in 1..=4 {
            store.insert_resource(resource(category, created));
            store.insert_resource(resource(other, created + 100));
        }
        let pager = Pager::new(Arc::clone(&store) as Arc<dyn ResourceStore>);

        let ours = planner::plan(Catalog::Symptom, category, SourceFilter::All);
        let theirs = planner::plan(Catalog::Symptom, other, SourceFilter::All);

        pager.fetch_page(&ours, 2, 1).await.unwrap();
        let rows = pager.fetch_page(&theirs, 2, 2).await.unwrap();
        let created: Vec<i64> = rows.iter().map(|r| r.created).collect();
        assert_eq!(created, vec![103, 104]);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let category = Uuid::now_v7();
        let store = seeded(category, 3);
        store.fail_resource_queries(true);
        let pager = Pager::new(Arc::clone(&store) as Arc<dyn ResourceStore>);
        let predicates = planner::plan(Catalog::Symptom, category, SourceFilter::All);

        assert!(pager.fetch_page(&predicates, 2, 1).await.is_err());
        assert!(pager.count(&predicates).await.is_err());
    }
}
