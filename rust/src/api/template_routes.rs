//! Template API endpoint

use axum::{
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

use super::AppState;
use crate::template::{template_csv, TEMPLATE_FILENAME};

/// GET /api/template
async fn download_template() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{TEMPLATE_FILENAME}\""),
            ),
        ],
        template_csv(),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/template", get(download_template))
}
