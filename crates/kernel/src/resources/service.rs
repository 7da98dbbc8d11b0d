//! Resource query service: auth gate, keyed page cache, refetch.
//!
//! One `fetch_resource_page` call is a single logical sequence: count query,
//! page query (with boundary derivation as needed), like aggregation, merge.
//! Successful results land in a bounded in-process cache keyed by the
//! request's filter axis and page; revalidation is explicit via `refetch` —
//! nothing refetches implicitly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::QueryError;
use crate::identity::Identity;
use crate::likes::LikeAggregator;
use crate::models::{Catalog, PageRequest, PageResponse, SourceFilter};
use crate::query::{Pager, planner};
use crate::resources::view_adapter;
use crate::store::{LikeStore, ResourceStore};

/// Cache key for one page fetch.
///
/// The limit is deliberately absent: it is assumed fixed for the lifetime
/// of a session, as is the requesting user (the original consumer kept one
/// cache per app session).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PageKey {
    catalog: Catalog,
    category_id: Uuid,
    source: SourceFilter,
    page: u32,
}

impl From<&PageRequest> for PageKey {
    fn from(request: &PageRequest) -> Self {
        Self {
            catalog: request.catalog,
            category_id: request.category_id,
            source: request.source,
            page: request.page,
        }
    }
}

/// A cached page with staleness metadata.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub response: PageResponse,
    pub fetched_at: DateTime<Utc>,
}

/// Orchestrates the paginated, filtered, like-augmented resource query.
pub struct ResourceQueryService {
    pager: Pager,
    aggregator: LikeAggregator,
    cache: Cache<PageKey, CachedPage>,
    /// The last request routed through the pipeline; `refetch` replays it.
    current: Mutex<Option<PageRequest>>,
    max_limit: u32,
}

impl ResourceQueryService {
    /// Create a service over the given stores.
    ///
    /// `cache_capacity` bounds the number of cached pages; `max_limit` caps
    /// the per-page length a caller may request.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        likes: Arc<dyn LikeStore>,
        cache_capacity: u64,
        max_limit: u32,
    ) -> Self {
        Self {
            pager: Pager::new(resources),
            aggregator: LikeAggregator::new(likes),
            cache: Cache::builder().max_capacity(cache_capacity).build(),
            current: Mutex::new(None),
            max_limit,
        }
    }

    /// Fetch one page of resources with aggregated like state.
    ///
    /// Unauthenticated callers get the last cached value for the key (or
    /// the zero state) without any store access. Authenticated callers get
    /// the cached page on a hit, or the full pipeline on a miss.
    pub async fn fetch_resource_page(
        &self,
        request: &PageRequest,
        identity: &Identity,
    ) -> Result<PageResponse, QueryError> {
        let request = self.normalized(request);
        let key = PageKey::from(&request);

        if !identity.authenticated {
            debug!(
                category = %request.category_id,
                page = request.page,
                "unauthenticated fetch, serving cached state"
            );
            return Ok(self.cached_or_zero(&key));
        }

        *self.current.lock() = Some(request.clone());

        if let Some(entry) = self.cache.get(&key) {
            debug!(
                category = %request.category_id,
                page = request.page,
                "page cache hit"
            );
            return Ok(entry.response);
        }

        let response = self.run_pipeline(&request, identity).await?;
        self.store_cached(key, &response);
        Ok(response)
    }

    /// Re-execute the pipeline for the current key, bypassing the cache.
    ///
    /// On success the cached entry is overwritten; on failure the previous
    /// entry is retained unchanged (stale-while-error). Returns `None` when
    /// no fetch has been issued yet.
    pub async fn refetch(&self, identity: &Identity) -> Result<Option<PageResponse>, QueryError> {
        let Some(request) = self.current.lock().clone() else {
            return Ok(None);
        };
        let key = PageKey::from(&request);

        if !identity.authenticated {
            debug!(page = request.page, "unauthenticated refetch, serving cached state");
            return Ok(Some(self.cached_or_zero(&key)));
        }

        let response = self.run_pipeline(&request, identity).await?;
        self.store_cached(key, &response);
        Ok(Some(response))
    }

    /// The cached entry for the given request, if any. Exposes the
    /// fetched-at staleness metadata to callers that want to display it.
    pub fn cached(&self, request: &PageRequest) -> Option<CachedPage> {
        self.cache.get(&PageKey::from(&self.normalized(request)))
    }

    async fn run_pipeline(
        &self,
        request: &PageRequest,
        identity: &Identity,
    ) -> Result<PageResponse, QueryError> {
        let predicates = planner::plan(request.catalog, request.category_id, request.source);

        let count = self
            .pager
            .count(&predicates)
            .await
            .map_err(QueryError::StoreUnavailable)?;
        let rows = self
            .pager
            .fetch_page(&predicates, request.limit, request.page)
            .await
            .map_err(QueryError::StoreUnavailable)?;

        let summaries = self
            .aggregator
            .aggregate(&rows, identity.user_id)
            .await
            .map_err(QueryError::Aggregation)?;

        let results = view_adapter::merge_views(rows, &summaries);
        debug!(count, results = results.len(), page = request.page, "page assembled");

        Ok(PageResponse { count, results })
    }

    fn store_cached(&self, key: PageKey, response: &PageResponse) {
        self.cache.insert(
            key,
            CachedPage {
                response: response.clone(),
                fetched_at: Utc::now(),
            },
        );
    }

    fn cached_or_zero(&self, key: &PageKey) -> PageResponse {
        self.cache
            .get(key)
            .map(|entry| entry.response)
            .unwrap_or_else(PageResponse::empty)
    }

    /// Clamp the requested page and limit to valid ranges.
    fn normalized(&self, request: &PageRequest) -> PageRequest {
        let mut request = request.clone();
        if request.limit > self.max_limit {
            warn!(
                requested = request.limit,
                capped = self.max_limit,
                "page limit exceeds maximum, capping"
            );
            request.limit = self.max_limit;
        }
        // Pages are 1-based and limits positive.
        request.limit = request.limit.max(1);
        request.page = request.page.max(1);
        request
    }
}
