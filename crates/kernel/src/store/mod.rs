//! Store seam: capability traits over the backing document store.
//!
//! The kernel never talks to a database directly; it goes through
//! [`ResourceStore`] and [`LikeStore`], which expose exactly the capability
//! set the pipeline needs: equality filters, created-ascending order, result
//! limits, strictly-after cursor continuation, and (optionally) an in-set
//! filter for batched like lookups.
//!
//! Two implementations ship: [`postgres`] (sqlx + sea-query) and [`memory`]
//! (embedded, used by tests and local development).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LikeRelation, Resource};
use crate::query::PredicateSet;

/// Error from a backing store query.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed the query.
    #[error("store query failed")]
    Query(#[from] sqlx::Error),

    /// The backing store is unreachable or refused service.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Keyset position of a row in the created-ascending order.
///
/// Continuation is strictly-after: a query positioned at a cursor never
/// returns the cursor's own row again. Ties on `created` are broken by id,
/// which UUIDv7 ids keep monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub created: i64,
    pub id: Uuid,
}

impl Cursor {
    /// The position just after the given row.
    pub fn after(resource: &Resource) -> Self {
        Self {
            created: resource.created,
            id: resource.id,
        }
    }
}

/// Read capabilities over the resource collection.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Exact count of rows matching the predicate set, with no ordering or
    /// limit applied.
    async fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError>;

    /// Rows matching the predicate set, created-ascending, capped at
    /// `limit`, positioned strictly after `after` when given.
    async fn fetch_ordered(
        &self,
        predicates: &PredicateSet,
        limit: u32,
        after: Option<&Cursor>,
    ) -> Result<Vec<Resource>, StoreError>;
}

/// Read capabilities over the like relation collection.
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// All like rows for one resource.
    async fn likes_for(&self, resource_id: Uuid) -> Result<Vec<LikeRelation>, StoreError>;

    /// All like rows for a set of resources in one round trip.
    ///
    /// Returns `None` when the backing store has no in-set filter; callers
    /// fall back to per-resource lookups.
    async fn likes_for_page(
        &self,
        resource_ids: &[Uuid],
    ) -> Result<Option<Vec<LikeRelation>>, StoreError> {
        let _ = resource_ids;
        Ok(None)
    }
}
