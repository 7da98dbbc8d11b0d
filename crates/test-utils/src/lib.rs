//! Raccolta test utilities.
//!
//! Fixture builders for resources and like relations, used by the kernel's
//! integration tests together with the embedded memory store.

use serde_json::Value as JsonValue;
use uuid::Uuid;

use raccolta_kernel::models::{Catalog, LikeRelation, Resource, SourceType};

/// Create a test resource with default values.
pub fn test_resource(category_id: Uuid, created: i64) -> TestResource {
    TestResource {
        id: Uuid::now_v7(),
        catalog: Catalog::Symptom,
        category_id,
        source: SourceType::Article,
        created,
        payload: serde_json::json!({}),
    }
}

/// A test resource builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestResource {
    pub id: Uuid,
    pub catalog: Catalog,
    pub category_id: Uuid,
    pub source: SourceType,
    pub created: i64,
    pub payload: JsonValue,
}

impl TestResource {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Put the resource on the work shelf.
    pub fn on_work_shelf(mut self) -> Self {
        self.catalog = Catalog::Work;
        self
    }

    /// Set the source tag.
    pub fn with_source(mut self, source: SourceType) -> Self {
        self.source = source;
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload = payload;
        self
    }

    /// Add a title field to the payload.
    pub fn with_title(mut self, title: &str) -> Self {
        if let Some(obj) = self.payload.as_object_mut() {
            obj.insert("title".to_string(), JsonValue::String(title.to_string()));
        }
        self
    }

    /// Finish into a model record.
    pub fn build(self) -> Resource {
        Resource {
            id: self.id,
            catalog: self.catalog,
            category_id: self.category_id,
            source: self.source,
            created: self.created,
            payload: self.payload,
        }
    }
}

/// Create a like relation row.
pub fn test_like(resource_id: Uuid, user_id: Uuid, created: i64) -> LikeRelation {
    LikeRelation {
        id: Uuid::now_v7(),
        resource_id,
        user_id,
        created,
    }
}
