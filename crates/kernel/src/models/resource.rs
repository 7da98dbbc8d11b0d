//! Resource model and page types.
//!
//! Resources are the content records served by paginated queries. They are
//! owned and mutated by external collaborators; this kernel only reads them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::like::LikeSummary;

/// Unknown tag value for [`Catalog`] or [`SourceType`].
#[derive(Debug, Error)]
#[error("unknown tag: {0}")]
pub struct ParseTagError(String);

/// Which resource shelf a category belongs to.
///
/// Resources attach either to a tracked symptom or to a work entry; the two
/// shelves are queried independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    Symptom,
    Work,
}

impl Catalog {
    /// Stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Catalog::Symptom => "symptom",
            Catalog::Work => "work",
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Catalog {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symptom" => Ok(Catalog::Symptom),
            "work" => Ok(Catalog::Work),
            other => Err(ParseTagError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Catalog {
    type Error = ParseTagError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Enumerated source tag for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Article,
    Video,
    Podcast,
}

impl SourceType {
    /// Stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Article => "article",
            SourceType::Video => "video",
            SourceType::Podcast => "podcast",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(SourceType::Article),
            "video" => Ok(SourceType::Video),
            "podcast" => Ok(SourceType::Podcast),
            other => Err(ParseTagError(other.to_string())),
        }
    }
}

impl TryFrom<String> for SourceType {
    type Error = ParseTagError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Source filter: one concrete source, or the All sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceFilter {
    #[default]
    All,
    Only(SourceType),
}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFilter::All => f.write_str("all"),
            SourceFilter::Only(source) => f.write_str(source.as_str()),
        }
    }
}

impl FromStr for SourceFilter {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SourceFilter::All),
            other => other.parse().map(SourceFilter::Only),
        }
    }
}

/// Resource record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Which shelf this resource belongs to.
    #[sqlx(try_from = "String")]
    pub catalog: Catalog,

    /// Owning category.
    pub category_id: Uuid,

    /// Source tag.
    #[sqlx(try_from = "String")]
    pub source: SourceType,

    /// Unix timestamp when created (the ordering key).
    pub created: i64,

    /// Opaque content payload (JSONB).
    pub payload: serde_json::Value,
}

/// View model for one resource in a page, with aggregated like state.
///
/// Constructed fresh per fetch and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceView {
    /// The underlying resource id.
    pub resource_id: Uuid,

    /// The resource payload, passed through untouched.
    pub payload: serde_json::Value,

    /// Exact count of like rows referencing this resource at query time.
    pub number_of_likes: u64,

    /// Whether the requesting user has liked this resource.
    pub is_liked: bool,

    /// Id of the requesting user's like row, if any.
    pub liked_id: Option<Uuid>,
}

impl ResourceView {
    /// Merge one resource with its like summary.
    ///
    /// `is_liked` is derived from `liked_id`, so the two can never disagree.
    pub fn new(resource: Resource, summary: LikeSummary) -> Self {
        Self {
            resource_id: resource.id,
            payload: resource.payload,
            number_of_likes: summary.number_of_likes,
            is_liked: summary.liked_id.is_some(),
            liked_id: summary.liked_id,
        }
    }
}

/// Parameters for one page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// Which shelf to query.
    pub catalog: Catalog,

    /// Category the resources belong to.
    pub category_id: Uuid,

    /// Source filter, `All` for no restriction.
    pub source: SourceFilter,

    /// Maximum page length (positive).
    pub limit: u32,

    /// Page number (1-based).
    pub page: u32,
}

/// Result of one page fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PageResponse {
    /// Total matching items across all pages.
    pub count: u64,

    /// One page of views, created-ascending, at most `limit` long.
    pub results: Vec<ResourceView>,
}

impl PageResponse {
    /// The zero state served before any successful fetch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of pages at the given page length.
    pub fn total_pages(&self, limit: u32) -> u32 {
        if limit == 0 {
            return 0;
        }
        self.count.div_ceil(u64::from(limit)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_filter_round_trip() {
        assert_eq!("all".parse::<SourceFilter>().ok(), Some(SourceFilter::All));
        assert_eq!(
            "video".parse::<SourceFilter>().ok(),
            Some(SourceFilter::Only(SourceType::Video))
        );
        assert_eq!(SourceFilter::Only(SourceType::Podcast).to_string(), "podcast");
        assert!("carousel".parse::<SourceFilter>().is_err());
    }

    #[test]
    fn catalog_round_trip() {
        assert_eq!("symptom".parse::<Catalog>().ok(), Some(Catalog::Symptom));
        assert_eq!(Catalog::Work.to_string(), "work");
        assert!("garden".parse::<Catalog>().is_err());
    }

    #[test]
    fn total_pages_rounds_up() {
        let response = PageResponse {
            count: 25,
            results: Vec::new(),
        };
        assert_eq!(response.total_pages(10), 3);
        assert_eq!(response.total_pages(25), 1);
        assert_eq!(response.total_pages(26), 1);
    }

    #[test]
    fn total_pages_zero_state() {
        assert_eq!(PageResponse::empty().total_pages(10), 0);
        let response = PageResponse {
            count: 5,
            results: Vec::new(),
        };
        assert_eq!(response.total_pages(0), 0);
    }

    #[test]
    fn view_derives_is_liked() {
        let resource = Resource {
            id: Uuid::now_v7(),
            catalog: Catalog::Symptom,
            category_id: Uuid::now_v7(),
            source: SourceType::Article,
            created: 1,
            payload: serde_json::json!({"title": "breathing exercises"}),
        };

        let liked = ResourceView::new(
            resource.clone(),
            LikeSummary {
                number_of_likes: 3,
                liked_id: Some(Uuid::now_v7()),
            },
        );
        assert!(liked.is_liked);

        let unliked = ResourceView::new(resource, LikeSummary::default());
        assert!(!unliked.is_liked);
        assert_eq!(unliked.liked_id, None);
        assert_eq!(unliked.number_of_likes, 0);
    }
}
