//! Resource query engine.
//!
//! This module provides:
//! - planner: pure predicate-set construction for a page request
//! - Pager: count + cursor-chained page queries with a boundary map

pub mod pager;
pub mod planner;

pub use pager::Pager;
pub use planner::{Field, FilterValue, Predicate, PredicateSet};
