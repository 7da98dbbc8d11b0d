//! PostgreSQL-backed stores using SeaQuery and sqlx.
//!
//! Expects a `resource` table (id uuid, catalog text, category_id uuid,
//! source text, created bigint, payload jsonb) and a `resource_like` table
//! (id uuid, resource_id uuid, user_id uuid, created bigint). Cursor
//! continuation uses a keyset comparison over `(created, id)`.

use async_trait::async_trait;
use sea_query::{Alias, Asterisk, Expr, ExprTrait, Order, PostgresQueryBuilder, Query,
    SelectStatement, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{LikeRelation, Resource};
use crate::query::{FilterValue, PredicateSet};
use crate::store::{Cursor, LikeStore, ResourceStore, StoreError};

const RESOURCE_TABLE: &str = "resource";
const LIKE_TABLE: &str = "resource_like";

/// Resource collection backed by PostgreSQL.
pub struct PgResourceStore {
    pool: PgPool,
}

impl PgResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Add the predicate set as WHERE conditions.
fn apply_predicates(query: &mut SelectStatement, predicates: &PredicateSet) {
    for predicate in predicates.iter() {
        let column = Expr::col((
            Alias::new(RESOURCE_TABLE),
            Alias::new(predicate.field.column()),
        ));
        match &predicate.value {
            FilterValue::Text(text) => query.and_where(column.eq(*text)),
            FilterValue::Uuid(id) => query.and_where(column.eq(*id)),
        };
    }
}

#[async_trait]
impl ResourceStore for PgResourceStore {
    async fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError> {
        let sql = {
            let mut query = Query::select();
            query
                .expr(Expr::col(Asterisk).count())
                .from(Alias::new(RESOURCE_TABLE));
            apply_predicates(&mut query, predicates);
            query.to_string(PostgresQueryBuilder)
        };
        let total: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;

        Ok(total.max(0) as u64)
    }

    async fn fetch_ordered(
        &self,
        predicates: &PredicateSet,
        limit: u32,
        after: Option<&Cursor>,
    ) -> Result<Vec<Resource>, StoreError> {
        let sql = {
            let mut query = Query::select();
            query
                .column((Alias::new(RESOURCE_TABLE), Asterisk))
                .from(Alias::new(RESOURCE_TABLE));
            apply_predicates(&mut query, predicates);

            if let Some(cursor) = after {
                query.and_where(Expr::cust_with_values(
                    "(created, id) > ($1, $2)",
                    [Value::from(cursor.created), Value::from(cursor.id)],
                ));
            }

            query
                .order_by((Alias::new(RESOURCE_TABLE), Alias::new("created")), Order::Asc)
                .order_by((Alias::new(RESOURCE_TABLE), Alias::new("id")), Order::Asc)
                .limit(u64::from(limit));

            query.to_string(PostgresQueryBuilder)
        };
        let rows = sqlx::query_as::<_, Resource>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

/// Like relation collection backed by PostgreSQL.
pub struct PgLikeStore {
    pool: PgPool,
}

impl PgLikeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn likes_for(&self, resource_id: Uuid) -> Result<Vec<LikeRelation>, StoreError> {
        let sql = Query::select()
            .column(Asterisk)
            .from(Alias::new(LIKE_TABLE))
            .and_where(Expr::col(Alias::new("resource_id")).eq(resource_id))
            .to_string(PostgresQueryBuilder);

        let rows = sqlx::query_as::<_, LikeRelation>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn likes_for_page(
        &self,
        resource_ids: &[Uuid],
    ) -> Result<Option<Vec<LikeRelation>>, StoreError> {
        if resource_ids.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let sql = Query::select()
            .column(Asterisk)
            .from(Alias::new(LIKE_TABLE))
            .and_where(Expr::col(Alias::new("resource_id")).is_in(resource_ids.iter().copied()))
            .to_string(PostgresQueryBuilder);

        let rows = sqlx::query_as::<_, LikeRelation>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(rows))
    }
}
