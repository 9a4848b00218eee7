//! Submission of validated contributions to the append endpoint
//!
//! - `InterventionSubmitter` trait: the seam between the contribution session
//!   and the network, so tests can swap in a recording or failing submitter
//! - `HttpSubmissionClient`: POSTs a batch as JSON to `/api/interventions`
//! - `SubmissionState`: idle / in-flight / succeeded / failed, with the
//!   double-submit and retry rules

use std::time::Duration;

use async_trait::async_trait;
use intervention_types::ApiResponse;
use reqwest::Client;
use url::Url;

use crate::error::SubmissionError;
use crate::validation::ValidatedBatch;

const INTERVENTIONS_PATH: &str = "api/interventions";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[async_trait]
pub trait InterventionSubmitter: Send + Sync {
    /// Send one batch. Exactly one request per call; no retries.
    async fn submit(&self, batch: &ValidatedBatch) -> Result<(), SubmissionError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpSubmissionClient {
    http: Client,
    endpoint: Url,
}

impl HttpSubmissionClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`
    pub fn new(base_url: &str) -> Result<Self, SubmissionError> {
        let endpoint = endpoint_url(base_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SubmissionError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl InterventionSubmitter for HttpSubmissionClient {
    async fn submit(&self, batch: &ValidatedBatch) -> Result<(), SubmissionError> {
        tracing::debug!(rows = batch.len(), endpoint = %self.endpoint, "submitting contributions");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(batch)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        let body: ApiResponse<serde_json::Value> = response.json().await.map_err(|e| {
            SubmissionError::Transport(format!("unexpected response (HTTP {status}): {e}"))
        })?;

        if body.success {
            tracing::info!(rows = batch.len(), "contributions submitted");
            Ok(())
        } else {
            let message = body.error.unwrap_or_else(|| "Unknown error".to_string());
            tracing::warn!(%status, %message, "submission rejected");
            Err(SubmissionError::Rejected(message))
        }
    }
}

fn endpoint_url(base_url: &str) -> Result<Url, SubmissionError> {
    let mut base = Url::parse(base_url)
        .map_err(|e| SubmissionError::Transport(format!("invalid endpoint '{base_url}': {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(INTERVENTIONS_PATH)
        .map_err(|e| SubmissionError::Transport(format!("invalid endpoint '{base_url}': {e}")))
}

// =============================================================================
// SUBMISSION STATE MACHINE
// =============================================================================

/// Where the current batch is in its submission lifecycle.
///
/// ```text
/// Idle ──begin──► InFlight ──ok──► Succeeded
///                    │
///                    └──err──► Failed ──begin──► InFlight
/// ```
///
/// `begin` is refused while `InFlight` (double submit) and after `Succeeded`.
/// Loading new rows resets to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded { rows: usize },
    Failed { message: String },
}

impl SubmissionState {
    pub fn can_submit(&self) -> bool {
        matches!(self, SubmissionState::Idle | SubmissionState::Failed { .. })
    }

    pub fn begin(&mut self) -> Result<(), SubmissionError> {
        match self {
            SubmissionState::InFlight => Err(SubmissionError::AlreadyInFlight),
            SubmissionState::Succeeded { .. } => Err(SubmissionError::AlreadySubmitted),
            SubmissionState::Idle | SubmissionState::Failed { .. } => {
                *self = SubmissionState::InFlight;
                Ok(())
            }
        }
    }

    /// Record the outcome of the request started by `begin`
    pub fn finish(&mut self, rows: usize, outcome: &Result<(), SubmissionError>) {
        if *self != SubmissionState::InFlight {
            tracing::warn!(state = ?self, "submission outcome recorded outside of an in-flight request");
        }
        *self = match outcome {
            Ok(()) => SubmissionState::Succeeded { rows },
            Err(e) => SubmissionState::Failed {
                message: e.to_string(),
            },
        };
    }

    pub fn reset(&mut self) {
        *self = SubmissionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        assert_eq!(
            endpoint_url("http://localhost:3000").unwrap().as_str(),
            "http://localhost:3000/api/interventions"
        );
        assert_eq!(
            endpoint_url("https://example.org/taxonomy").unwrap().as_str(),
            "https://example.org/taxonomy/api/interventions"
        );
        assert!(matches!(
            endpoint_url("not a url"),
            Err(SubmissionError::Transport(_))
        ));
    }

    #[test]
    fn test_double_submit_refused() {
        let mut state = SubmissionState::default();
        state.begin().unwrap();
        assert_eq!(state.begin(), Err(SubmissionError::AlreadyInFlight));
    }

    #[test]
    fn test_retry_after_failure() {
        let mut state = SubmissionState::default();
        state.begin().unwrap();
        state.finish(2, &Err(SubmissionError::Transport("connection refused".into())));
        assert_eq!(
            state,
            SubmissionState::Failed {
                message: "Submission error: connection refused".into()
            }
        );
        assert!(state.can_submit());
        state.begin().unwrap();
        state.finish(2, &Ok(()));
        assert_eq!(state, SubmissionState::Succeeded { rows: 2 });
    }

    #[test]
    fn test_no_resubmit_after_success() {
        let mut state = SubmissionState::default();
        state.begin().unwrap();
        state.finish(1, &Ok(()));
        assert!(!state.can_submit());
        assert_eq!(state.begin(), Err(SubmissionError::AlreadySubmitted));
        state.reset();
        assert!(state.begin().is_ok());
    }
}
