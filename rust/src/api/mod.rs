//! REST API
//!
//! One router over one shared `AppState`:
//!
//! | route | purpose |
//! |---|---|
//! | `POST /api/interventions` | append contributor rows to the spreadsheet |
//! | `POST /api/contributions/validate` | validate CSV text without storing it |
//! | `GET /api/template` | blank contribution template |
//! | `GET /api/taxonomy` | faceted search over the published taxonomy |
//! | `GET /api/taxonomy/facets` | filter options per facet |
//! | `GET /api/health` | liveness |
//!
//! Every JSON answer uses the `ApiResponse` envelope except the validation
//! endpoint, which returns the `ValidationResult` itself.

pub mod intervention_routes;
pub mod taxonomy_routes;
pub mod template_routes;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use intervention_types::ApiResponse;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::sheets::SpreadsheetSink;
use crate::taxonomy::TaxonomyCatalog;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TaxonomyCatalog>,
    pub sink: Arc<dyn SpreadsheetSink>,
}

impl AppState {
    pub fn new(catalog: TaxonomyCatalog, sink: Arc<dyn SpreadsheetSink>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sink,
        }
    }
}

/// Error answer in the `ApiResponse` envelope
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::err(self.message))).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(intervention_routes::router())
        .merge(taxonomy_routes::router())
        .merge(template_routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// GET /api/health
async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::ok("OK".to_string()))
}
