//! Resource listing API route.
//!
//! One read-only endpoint: a paginated, filtered page of resources with
//! aggregated like state. Identity arrives as trusted gateway headers (see
//! `crate::identity`); resource and like mutations live in other services.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::identity::Identity;
use crate::models::{Catalog, PageRequest, ResourceView, SourceFilter};
use crate::state::AppState;

/// Create the resources router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/resources", get(list_resources))
}

#[derive(Deserialize)]
struct ListParams {
    /// Resource shelf: "symptom" or "work".
    catalog: String,

    /// Owning category id.
    category: Uuid,

    /// Source filter: "all" (default), "article", "video", or "podcast".
    source: Option<String>,

    /// Page length; defaults to the configured page size.
    limit: Option<u32>,

    /// 1-based page number.
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 {
    1
}

#[derive(serde::Serialize)]
struct ListResponse {
    count: u64,
    total_pages: u32,
    results: Vec<ResourceView>,
}

/// List one page of resources for a category.
async fn list_resources(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListResponse>> {
    let catalog: Catalog = params
        .catalog
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown catalog: {}", params.catalog)))?;

    let source: SourceFilter = match &params.source {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown source: {raw}")))?,
        None => SourceFilter::All,
    };

    // Clamp here so total_pages below agrees with the limit the service uses.
    let limit = params
        .limit
        .unwrap_or(state.config().default_page_size)
        .clamp(1, state.config().max_page_size);
    let request = PageRequest {
        catalog,
        category_id: params.category,
        source,
        limit,
        page: params.page,
    };

    let response = state
        .resources()
        .fetch_resource_page(&request, &identity)
        .await?;

    Ok(Json(ListResponse {
        count: response.count,
        total_pages: response.total_pages(limit),
        results: response.results,
    }))
}
