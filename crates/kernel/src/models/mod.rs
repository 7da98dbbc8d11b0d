//! Database models and page types.

pub mod like;
pub mod resource;

pub use like::{LikeRelation, LikeSummary};
pub use resource::{
    Catalog, PageRequest, PageResponse, ParseTagError, Resource, ResourceView, SourceFilter,
    SourceType,
};
