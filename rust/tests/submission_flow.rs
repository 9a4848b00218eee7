//! Contribution session submitting to a live in-process server

#![cfg(feature = "server")]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use intervention_taxonomy::api::{create_router, AppState};
use intervention_taxonomy::sheets::{InMemorySheet, SpreadsheetSink};
use intervention_taxonomy::{
    ContributionSession, HttpSubmissionClient, SessionError, SheetsError, SubmissionError,
    SubmissionState, TaxonomyCatalog,
};
use serde_json::Value;
use tokio::net::TcpListener;

const CSV: &str = "Intervention Type,Description,Focus,Driver,User Journey,Scope,Link,Contact\n\
    \"Forwarding Limits\",\"Caps on how often a message can be forwarded\",\"Behavioral\",\"Platform-Driven\",\"Proactive\",\"Systemic\",\"\",\"a@b.com\"\n\
    \"Reply Controls\",\"Authors choose who may reply, or nobody\",\"Visibility\",\"User-Driven\",\"Proactive\",\"Targeted\",\"https://x.com\",\"\"";

struct QuotaExceeded;

#[async_trait]
impl SpreadsheetSink for QuotaExceeded {
    async fn append_rows(&self, _rows: &[Value]) -> Result<usize, SheetsError> {
        Err(SheetsError::Append("Quota exceeded for quota metric 'Write requests'".into()))
    }

    fn describe(&self) -> String {
        "quota-exceeded".into()
    }
}

async fn spawn_server(sink: Arc<dyn SpreadsheetSink>) -> SocketAddr {
    let app = create_router(AppState::new(TaxonomyCatalog::builtin().unwrap(), sink));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_valid_batch_reaches_the_sheet() {
    let sheet = Arc::new(InMemorySheet::with_canonical_headers("Sheet1"));
    let addr = spawn_server(sheet.clone()).await;
    let client = HttpSubmissionClient::new(&format!("http://{addr}")).unwrap();

    let mut session = ContributionSession::new();
    assert!(session.load_csv(CSV).is_valid);
    session.submit(&client).await.unwrap();

    assert_eq!(session.submission_state(), &SubmissionState::Succeeded { rows: 2 });
    let rows = sheet.rows().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "Forwarding Limits");
    assert_eq!(rows[1][1], "Authors choose who may reply, or nobody");
    assert_eq!(rows[1][6], "https://x.com");
    // absent optional fields land as blank cells
    assert_eq!(rows[0][6], "");
    assert_eq!(rows[1][7], "");
}

#[tokio::test]
async fn test_rejection_keeps_rows_for_retry() {
    let addr = spawn_server(Arc::new(QuotaExceeded)).await;
    let client = HttpSubmissionClient::new(&format!("http://{addr}/")).unwrap();

    let mut session = ContributionSession::new();
    session.load_csv(CSV);
    let err = session.submit(&client).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Submission failed: Failed to append rows: Quota exceeded for quota metric 'Write requests'"
    );
    assert!(session.submission_state().can_submit());
    assert_eq!(session.rows().len(), 2);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // bind then drop so nothing is listening on the port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpSubmissionClient::new(&format!("http://{addr}")).unwrap();
    let mut session = ContributionSession::new();
    session.load_csv(CSV);

    let err = session.submit(&client).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Submission(SubmissionError::Transport(_))
    ));
    assert!(matches!(
        session.submission_state(),
        SubmissionState::Failed { message } if message.starts_with("Submission error:")
    ));
}
