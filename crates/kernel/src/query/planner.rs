//! Predicate construction for resource queries.
//!
//! The planner is pure: it turns the filter axis of a page request into a
//! conjunction of equality predicates, and nothing else. Ordering, limits,
//! and cursors are the pager's concern.

use std::fmt;

use uuid::Uuid;

use crate::models::{Catalog, SourceFilter};

/// Filterable resource columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Catalog,
    CategoryId,
    Source,
}

impl Field {
    /// Stored column name.
    pub fn column(self) -> &'static str {
        match self {
            Field::Catalog => "catalog",
            Field::CategoryId => "category_id",
            Field::Source => "source",
        }
    }
}

/// Equality comparison value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(&'static str),
    Uuid(Uuid),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => f.write_str(s),
            FilterValue::Uuid(u) => write!(f, "{u}"),
        }
    }
}

/// A single equality predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: Field,
    pub value: FilterValue,
}

/// Conjunction of equality predicates for one query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    /// Iterate the predicates in planning order.
    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    /// Deterministic string form, used to key the boundary-cursor map.
    ///
    /// Planning order is fixed, so equal filter axes always produce equal
    /// fingerprints.
    pub fn fingerprint(&self) -> String {
        let parts: Vec<String> = self
            .predicates
            .iter()
            .map(|p| format!("{}={}", p.field.column(), p.value))
            .collect();
        parts.join("&")
    }
}

/// Build the predicate set for a page request's filter axis.
///
/// Always `catalog == C` and `category_id == X`; additionally `source == T`
/// when the filter is not [`SourceFilter::All`].
pub fn plan(catalog: Catalog, category_id: Uuid, source: SourceFilter) -> PredicateSet {
    let mut predicates = vec![
        Predicate {
            field: Field::Catalog,
            value: FilterValue::Text(catalog.as_str()),
        },
        Predicate {
            field: Field::CategoryId,
            value: FilterValue::Uuid(category_id),
        },
    ];

    if let SourceFilter::Only(source) = source {
        predicates.push(Predicate {
            field: Field::Source,
            value: FilterValue::Text(source.as_str()),
        });
    }

    PredicateSet { predicates }
}
