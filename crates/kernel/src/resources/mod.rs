//! Resource query orchestration.
//!
//! This module provides:
//! - ResourceQueryService: auth gate, keyed page cache, pipeline, refetch
//! - view_adapter: pure merge of page rows and like summaries

pub mod service;
pub mod view_adapter;

pub use service::{CachedPage, ResourceQueryService};
