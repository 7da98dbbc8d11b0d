//! Merge page rows with like summaries into ordered view models.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{LikeSummary, Resource, ResourceView};

/// Combine each resource with its aggregation entry, preserving the page's
/// created-ascending order.
///
/// Pure: no I/O, no failure mode. A resource missing from the summary map
/// (the aggregator never produces one) merges with a zero summary.
pub fn merge_views(
    page: Vec<Resource>,
    summaries: &HashMap<Uuid, LikeSummary>,
) -> Vec<ResourceView> {
    page.into_iter()
        .map(|resource| {
            let summary = summaries.get(&resource.id).copied().unwrap_or_default();
            ResourceView::new(resource, summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, SourceType};

    fn resource(created: i64) -> Resource {
        Resource {
            id: Uuid::now_v7(),
            catalog: Catalog::Symptom,
            category_id: Uuid::now_v7(),
            source: SourceType::Article,
            created,
            payload: serde_json::json!({"created": created}),
        }
    }

    #[test]
    fn merge_preserves_page_order() {
        let page = vec![resource(1), resource(2), resource(3)];
        let ids: Vec<Uuid> = page.iter().map(|r| r.id).collect();

        // Summaries arrive keyed by id; completion order is irrelevant.
        let mut summaries = HashMap::new();
        summaries.insert(
            ids[2],
            LikeSummary {
                number_of_likes: 7,
                liked_id: None,
            },
        );
        summaries.insert(
            ids[0],
            LikeSummary {
                number_of_likes: 1,
                liked_id: Some(Uuid::now_v7()),
            },
        );

        let views = merge_views(page, &summaries);

        let view_ids: Vec<Uuid> = views.iter().map(|v| v.resource_id).collect();
        assert_eq!(view_ids, ids);
        assert_eq!(views[0].number_of_likes, 1);
        assert!(views[0].is_liked);
        assert_eq!(views[2].number_of_likes, 7);
    }

    #[test]
    fn missing_summary_merges_as_zero() {
        let page = vec![resource(1)];
        let views = merge_views(page, &HashMap::new());

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].number_of_likes, 0);
        assert!(!views[0].is_liked);
        assert_eq!(views[0].liked_id, None);
    }

    #[test]
    fn payload_passes_through() {
        let page = vec![resource(9)];
        let views = merge_views(page, &HashMap::new());
        assert_eq!(views[0].payload, serde_json::json!({"created": 9}));
    }
}
