//! Embedded in-memory store.
//!
//! Backs tests and local development without a database. Failures can be
//! injected per collection, and query counters expose how many round trips
//! a pipeline actually issued.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::{LikeRelation, Resource};
use crate::query::{Field, FilterValue, Predicate, PredicateSet};
use crate::store::{Cursor, LikeStore, ResourceStore, StoreError};

/// Vector-backed store implementing both collection traits.
#[derive(Default)]
pub struct MemoryStore {
    resources: RwLock<Vec<Resource>>,
    likes: RwLock<Vec<LikeRelation>>,

    /// When false, `likes_for_page` reports no in-set capability.
    batch_likes: bool,

    fail_resources: AtomicBool,
    fail_likes: RwLock<HashSet<Uuid>>,

    resource_queries: AtomicUsize,
    like_queries: AtomicUsize,
}

impl MemoryStore {
    /// Store with in-set like lookups enabled.
    pub fn new() -> Self {
        Self {
            batch_likes: true,
            ..Self::default()
        }
    }

    /// Store without in-set like lookups, forcing per-resource fan-out.
    pub fn without_batch_likes() -> Self {
        Self::default()
    }

    pub fn insert_resource(&self, resource: Resource) {
        self.resources.write().push(resource);
    }

    pub fn insert_like(&self, like: LikeRelation) {
        self.likes.write().push(like);
    }

    /// Make every resource query fail until reset.
    pub fn fail_resource_queries(&self, fail: bool) {
        self.fail_resources.store(fail, Ordering::SeqCst);
    }

    /// Make like lookups touching the given resource fail.
    pub fn fail_likes_for(&self, resource_id: Uuid) {
        self.fail_likes.write().insert(resource_id);
    }

    /// Number of resource queries issued so far.
    pub fn resource_queries(&self) -> usize {
        self.resource_queries.load(Ordering::SeqCst)
    }

    /// Number of like queries issued so far (a batch counts as one).
    pub fn like_queries(&self) -> usize {
        self.like_queries.load(Ordering::SeqCst)
    }

    fn matching(&self, predicates: &PredicateSet) -> Vec<Resource> {
        let mut rows: Vec<Resource> = self
            .resources
            .read()
            .iter()
            .filter(|resource| predicates.iter().all(|p| matches(resource, p)))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.created, r.id));
        rows
    }
}

fn matches(resource: &Resource, predicate: &Predicate) -> bool {
    match (predicate.field, &predicate.value) {
        (Field::Catalog, FilterValue::Text(text)) => resource.catalog.as_str() == *text,
        (Field::Source, FilterValue::Text(text)) => resource.source.as_str() == *text,
        (Field::CategoryId, FilterValue::Uuid(id)) => resource.category_id == *id,
        // A mistyped predicate matches nothing rather than everything.
        _ => false,
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError> {
        self.resource_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_resources.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected resource store failure".to_string(),
            ));
        }
        Ok(self.matching(predicates).len() as u64)
    }

    async fn fetch_ordered(
        &self,
        predicates: &PredicateSet,
        limit: u32,
        after: Option<&Cursor>,
    ) -> Result<Vec<Resource>, StoreError> {
        self.resource_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_resources.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected resource store failure".to_string(),
            ));
        }

        let rows = self
            .matching(predicates)
            .into_iter()
            .filter(|r| match after {
                Some(cursor) => (r.created, r.id) > (cursor.created, cursor.id),
                None => true,
            })
            .take(limit as usize)
            .collect();

        Ok(rows)
    }
}

#[async_trait]
impl LikeStore for MemoryStore {
    async fn likes_for(&self, resource_id: Uuid) -> Result<Vec<LikeRelation>, StoreError> {
        self.like_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_likes.read().contains(&resource_id) {
            return Err(StoreError::Unavailable(
                "injected like store failure".to_string(),
            ));
        }

        Ok(self
            .likes
            .read()
            .iter()
            .filter(|like| like.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn likes_for_page(
        &self,
        resource_ids: &[Uuid],
    ) -> Result<Option<Vec<LikeRelation>>, StoreError> {
        if !self.batch_likes {
            return Ok(None);
        }

        self.like_queries.fetch_add(1, Ordering::SeqCst);
        if resource_ids
            .iter()
            .any(|id| self.fail_likes.read().contains(id))
        {
            return Err(StoreError::Unavailable(
                "injected like store failure".to_string(),
            ));
        }

        Ok(Some(
            self.likes
                .read()
                .iter()
                .filter(|like| resource_ids.contains(&like.resource_id))
                .cloned()
                .collect(),
        ))
    }
}
