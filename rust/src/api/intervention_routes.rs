//! Contribution endpoints

use axum::{
    body::Bytes,
    extract::State,
    response::Json,
    routing::post,
    Router,
};
use intervention_types::{ApiResponse, ValidationResult};
use serde_json::Value;

use super::{ApiError, AppState};
use crate::contribution::ContributionSession;

const NO_DATA: &str = "No data provided";

/// POST /api/interventions
///
/// Body must be a non-empty JSON array. Anything else, unparseable JSON
/// included, is a 400.
async fn append_interventions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, ApiError> {
    let rows = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Array(rows)) if !rows.is_empty() => rows,
        Ok(_) => return Err(ApiError::bad_request(NO_DATA)),
        Err(e) => {
            tracing::warn!(error = %e, "append body is not JSON");
            return Err(ApiError::bad_request(NO_DATA));
        }
    };

    match state.sink.append_rows(&rows).await {
        Ok(appended) => {
            tracing::info!(rows = appended, sink = %state.sink.describe(), "appended contributions");
            Ok(Json(ApiResponse::ack()))
        }
        Err(e) => {
            tracing::error!(error = %e, sink = %state.sink.describe(), "spreadsheet append failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}

/// POST /api/contributions/validate
async fn validate_contributions(body: String) -> Json<ValidationResult> {
    let mut session = ContributionSession::new();
    Json(session.load_csv(&body))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/interventions", post(append_interventions))
        .route("/api/contributions/validate", post(validate_contributions))
}
