//! Per-page like aggregation.
//!
//! For every resource in a fetched page the aggregator resolves the total
//! like count and the requesting user's own like row. The primary path is a
//! single in-set query over the page's resource ids; when the store reports
//! no in-set capability, one lookup per resource is issued concurrently and
//! joined at a barrier. Either way the aggregation is all-or-nothing: a
//! single failed lookup fails the page.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future;
use tracing::debug;
use uuid::Uuid;

use crate::models::{LikeRelation, LikeSummary, Resource};
use crate::store::{LikeStore, StoreError};

/// Resolves like summaries for one page of resources.
pub struct LikeAggregator {
    store: Arc<dyn LikeStore>,
}

impl LikeAggregator {
    /// Create an aggregator over the given relation store.
    pub fn new(store: Arc<dyn LikeStore>) -> Self {
        Self { store }
    }

    /// Like summaries for every resource in the page, keyed by resource id.
    ///
    /// Every page item gets an entry, including items with zero likes. The
    /// ownership scan is skipped when `user_id` is absent.
    pub async fn aggregate(
        &self,
        page: &[Resource],
        user_id: Option<Uuid>,
    ) -> Result<HashMap<Uuid, LikeSummary>, StoreError> {
        let ids: Vec<Uuid> = page.iter().map(|r| r.id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        if let Some(rows) = self.store.likes_for_page(&ids).await? {
            debug!(items = ids.len(), "aggregated likes via in-set lookup");
            return Ok(summarize_batch(&ids, rows, user_id));
        }

        // Fan-out fallback: one lookup per page item, all in flight at once,
        // settled at a join barrier or failed on the first error.
        let lookups = ids.iter().map(|id| {
            let id = *id;
            let store = Arc::clone(&self.store);
            async move { store.likes_for(id).await.map(|rows| (id, rows)) }
        });
        let fetched = future::try_join_all(lookups).await?;
        debug!(items = ids.len(), "aggregated likes via per-item fan-out");

        let mut summaries = HashMap::with_capacity(ids.len());
        for (id, rows) in fetched {
            summaries.insert(id, LikeSummary::from_rows(&rows, user_id));
        }
        Ok(summaries)
    }
}

/// Group batch rows by resource, filling zero-like entries for ids the
/// batch returned nothing for.
fn summarize_batch(
    ids: &[Uuid],
    rows: Vec<LikeRelation>,
    user_id: Option<Uuid>,
) -> HashMap<Uuid, LikeSummary> {
    let mut grouped: HashMap<Uuid, Vec<LikeRelation>> = HashMap::new();
    for row in rows {
        grouped.entry(row.resource_id).or_default().push(row);
    }

    let mut summaries = HashMap::with_capacity(ids.len());
    for id in ids {
        let rows = grouped.remove(id).unwrap_or_default();
        summaries.insert(*id, LikeSummary::from_rows(&rows, user_id));
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, SourceType};
    use crate::store::memory::MemoryStore;

    fn resource(created: i64) -> Resource {
        Resource {
            id: Uuid::now_v7(),
            catalog: Catalog::Symptom,
            category_id: Uuid::now_v7(),
            source: SourceType::Article,
            created,
            payload: serde_json::json!({}),
        }
    }

    fn like(resource_id: Uuid, user_id: Uuid) -> LikeRelation {
        LikeRelation {
            id: Uuid::now_v7(),
            resource_id,
            user_id,
            created: 0,
        }
    }

    fn seed_page(store: &MemoryStore) -> (Vec<Resource>, Uuid) {
        let page = vec![resource(1), resource(2), resource(3)];
        let user = Uuid::now_v7();

        // First item: two strangers plus the requesting user.
        store.insert_like(like(page[0].id, Uuid::now_v7()));
        store.insert_like(like(page[0].id, Uuid::now_v7()));
        store.insert_like(like(page[0].id, user));
        // Second item: one stranger. Third item: no likes at all.
        store.insert_like(like(page[1].id, Uuid::now_v7()));

        (page, user)
    }

    #[tokio::test]
    async fn batch_path_summarizes_page() {
        let store = MemoryStore::new();
        let (page, user) = seed_page(&store);
        let aggregator = LikeAggregator::new(Arc::new(store));

        let summaries = aggregator.aggregate(&page, Some(user)).await.unwrap();

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[&page[0].id].number_of_likes, 3);
        assert!(summaries[&page[0].id].is_liked());
        assert_eq!(summaries[&page[1].id].number_of_likes, 1);
        assert!(!summaries[&page[1].id].is_liked());
        assert_eq!(summaries[&page[2].id], LikeSummary::default());
    }

    #[tokio::test]
    async fn batch_is_one_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let (page, user) = seed_page(&store);
        let aggregator = LikeAggregator::new(Arc::clone(&store) as Arc<dyn LikeStore>);

        aggregator.aggregate(&page, Some(user)).await.unwrap();
        assert_eq!(store.like_queries(), 1);
    }

    #[tokio::test]
    async fn fan_out_matches_batch_results() {
        let batch_store = MemoryStore::new();
        let (page, user) = seed_page(&batch_store);

        let fanout_store = Arc::new(MemoryStore::without_batch_likes());
        for l in [
            like(page[0].id, Uuid::now_v7()),
            like(page[0].id, Uuid::now_v7()),
            like(page[0].id, user),
            like(page[1].id, Uuid::now_v7()),
        ] {
            // Same shape as seed_page, minus the row ids.
            fanout_store.insert_like(l);
        }

        let batched = LikeAggregator::new(Arc::new(batch_store))
            .aggregate(&page, Some(user))
            .await
            .unwrap();
        let fanned = LikeAggregator::new(Arc::clone(&fanout_store) as Arc<dyn LikeStore>)
            .aggregate(&page, Some(user))
            .await
            .unwrap();

        assert_eq!(fanout_store.like_queries(), page.len());
        for id in page.iter().map(|r| r.id) {
            assert_eq!(batched[&id].number_of_likes, fanned[&id].number_of_likes);
            assert_eq!(batched[&id].is_liked(), fanned[&id].is_liked());
        }
    }

    #[tokio::test]
    async fn anonymous_user_skips_ownership() {
        let store = MemoryStore::new();
        let (page, _user) = seed_page(&store);
        let aggregator = LikeAggregator::new(Arc::new(store));

        let summaries = aggregator.aggregate(&page, None).await.unwrap();

        assert_eq!(summaries[&page[0].id].number_of_likes, 3);
        for summary in summaries.values() {
            assert!(!summary.is_liked());
            assert_eq!(summary.liked_id, None);
        }
    }

    #[tokio::test]
    async fn single_failed_lookup_fails_the_page() {
        let store = Arc::new(MemoryStore::without_batch_likes());
        let (page, user) = seed_page(&store);
        store.fail_likes_for(page[1].id);
        let aggregator = LikeAggregator::new(Arc::clone(&store) as Arc<dyn LikeStore>);

        assert!(aggregator.aggregate(&page, Some(user)).await.is_err());
    }

    #[tokio::test]
    async fn empty_page_is_empty_map() {
        let aggregator = LikeAggregator::new(Arc::new(MemoryStore::new()));
        let summaries = aggregator.aggregate(&[], None).await.unwrap();
        assert!(summaries.is_empty());
    }
}
