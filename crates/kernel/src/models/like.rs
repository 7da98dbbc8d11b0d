//! Like relation model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Like relation record.
///
/// Existence of a row for a (resource, user) pair means "liked". Rows are
/// created and deleted by an external like/unlike service; this kernel only
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LikeRelation {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// The liked resource.
    pub resource_id: Uuid,

    /// The user who liked it.
    pub user_id: Uuid,

    /// Unix timestamp when created.
    pub created: i64,
}

/// Aggregated like state for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikeSummary {
    /// Exact count of like rows referencing the resource.
    pub number_of_likes: u64,

    /// Id of the requesting user's like row, if any.
    pub liked_id: Option<Uuid>,
}

impl LikeSummary {
    /// Summarize the like rows of one resource.
    ///
    /// The ownership scan is skipped entirely when no user id is supplied.
    pub fn from_rows(rows: &[LikeRelation], user_id: Option<Uuid>) -> Self {
        Self {
            number_of_likes: rows.len() as u64,
            liked_id: user_id
                .and_then(|user| rows.iter().find(|row| row.user_id == user))
                .map(|row| row.id),
        }
    }

    /// Whether the requesting user has liked the resource.
    pub fn is_liked(&self) -> bool {
        self.liked_id.is_some()
    }
}
