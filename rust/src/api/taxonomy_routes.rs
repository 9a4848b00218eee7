//! Taxonomy browser endpoints

use std::collections::BTreeMap;

use axum::{
    extract::{RawQuery, State},
    response::Json,
    routing::get,
    Router,
};
use intervention_types::ApiResponse;
use serde::Serialize;

use super::{ApiError, AppState};
use crate::taxonomy::{Facet, Reference, TaxonomyEntry, TaxonomyQuery};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyView<'a> {
    pub total: usize,
    pub matched: usize,
    pub active_filters: usize,
    pub entries: Vec<EntryView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct EntryView<'a> {
    #[serde(flatten)]
    pub entry: &'a TaxonomyEntry,
    pub citations: Vec<Reference>,
}

/// GET /api/taxonomy?q=...&focus=...&platform=...
///
/// Facet keys may repeat, one value per selection.
async fn search_taxonomy(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let raw = raw.unwrap_or_default();
    let query = TaxonomyQuery::from_query_pairs(url::form_urlencoded::parse(raw.as_bytes()))
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let entries: Vec<EntryView<'_>> = state
        .catalog
        .filter(&query)
        .into_iter()
        .map(|entry| EntryView {
            entry,
            citations: entry.reference_list(),
        })
        .collect();

    let view = TaxonomyView {
        total: state.catalog.len(),
        matched: entries.len(),
        active_filters: query.active_filter_count(),
        entries,
    };
    let data = serde_json::to_value(&view).map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(ApiResponse::ok(data)))
}

/// GET /api/taxonomy/facets
async fn facet_options(State(state): State<AppState>) -> Json<ApiResponse<BTreeMap<Facet, Vec<String>>>> {
    Json(ApiResponse::ok(state.catalog.facet_options()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/taxonomy", get(search_taxonomy))
        .route("/api/taxonomy/facets", get(facet_options))
}
