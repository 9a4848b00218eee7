//! Contribution session
//!
//! Holds the rows a contributor has accepted so far, from an uploaded CSV or
//! from form entries, together with the latest validation result and the
//! submission state. Nothing here is persisted; the session lives as long as
//! its owner.

use std::path::Path;

use intervention_types::{
    ValidationResult, CANONICAL_HEADERS, COL_CONTACT, COL_DESCRIPTION, COL_DRIVER, COL_FOCUS,
    COL_INTERVENTION_TYPE, COL_LINK, COL_SCOPE, COL_USER_JOURNEY, REQUIRED_FIELDS,
};
use serde::{Deserialize, Serialize};

use crate::csv_intake::{self, ParsedCsv, RawRow};
use crate::error::{SessionError, SubmissionError};
use crate::submission::{InterventionSubmitter, SubmissionState};
use crate::validation::{self, ValidatedBatch};

// =============================================================================
// FORM ENTRY
// =============================================================================

/// A single intervention entered field by field.
///
/// Unlike CSV rows, a form entry must carry a `Contact` address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionForm {
    #[serde(rename = "Intervention Type", default)]
    pub intervention_type: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Focus", default)]
    pub focus: String,
    #[serde(rename = "Driver", default)]
    pub driver: String,
    #[serde(rename = "User Journey", default)]
    pub user_journey: String,
    #[serde(rename = "Scope", default)]
    pub scope: String,
    #[serde(rename = "Link", default)]
    pub link: String,
    #[serde(rename = "Contact", default)]
    pub contact: String,
}

impl ContributionForm {
    fn value(&self, column: &str) -> &str {
        match column {
            COL_INTERVENTION_TYPE => &self.intervention_type,
            COL_DESCRIPTION => &self.description,
            COL_FOCUS => &self.focus,
            COL_DRIVER => &self.driver,
            COL_USER_JOURNEY => &self.user_journey,
            COL_SCOPE => &self.scope,
            COL_LINK => &self.link,
            COL_CONTACT => &self.contact,
            _ => "",
        }
    }

    /// Required columns left empty, `Contact` included
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .chain(std::iter::once(&COL_CONTACT))
            .copied()
            .filter(|column| self.value(column).is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    fn to_raw_row(&self) -> RawRow {
        CANONICAL_HEADERS
            .iter()
            .map(|column| (column.to_string(), self.value(column).to_string()))
            .collect()
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Default)]
pub struct ContributionSession {
    data: Option<ParsedCsv>,
    result: Option<ValidationResult>,
    batch: Option<ValidatedBatch>,
    submission: SubmissionState,
}

impl ContributionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session contents with an uploaded CSV.
    ///
    /// Rows are kept only when validation passes; an invalid or unparseable
    /// upload leaves the session empty apart from the result.
    pub fn load_csv(&mut self, text: &str) -> ValidationResult {
        self.submission.reset();

        let parsed = match csv_intake::parse(text) {
            Ok(parsed) => parsed,
            Err(e) => return self.reject(e.to_string()),
        };

        let (result, batch) = validation::validate(&parsed).into_parts();
        tracing::debug!(
            rows = result.row_count,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated upload"
        );

        self.data = result.is_valid.then_some(parsed);
        self.batch = batch;
        self.result = Some(result.clone());
        result
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ValidationResult {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(text) => self.load_csv(&text),
            Err(e) => {
                self.submission.reset();
                self.reject(format!("Error reading file: {e}"))
            }
        }
    }

    /// Append one form entry to the current rows and re-validate all of them
    /// against the template header.
    ///
    /// Once the current rows have been submitted successfully, a form entry
    /// starts a new set instead, so submitted rows are never sent twice.
    pub fn add_from_form(&mut self, form: &ContributionForm) -> Result<ValidationResult, SessionError> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(SessionError::IncompleteForm { missing });
        }

        if let SubmissionState::Succeeded { rows } = self.submission {
            tracing::debug!(rows, "starting a new row set after submission");
            self.data = None;
        }

        let mut rows = self.data.take().map(|d| d.rows).unwrap_or_default();
        rows.push(form.to_raw_row());
        let parsed = ParsedCsv::with_canonical_headers(rows);

        let (result, batch) = validation::validate(&parsed).into_parts();
        self.data = Some(parsed);
        self.batch = batch;
        self.result = Some(result.clone());
        self.submission.reset();
        Ok(result)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn result(&self) -> Option<&ValidationResult> {
        self.result.as_ref()
    }

    /// Rows currently held, in upload/entry order
    pub fn rows(&self) -> &[RawRow] {
        self.data.as_ref().map(|d| d.rows.as_slice()).unwrap_or(&[])
    }

    pub fn batch(&self) -> Option<&ValidatedBatch> {
        self.batch.as_ref()
    }

    pub fn submission_state(&self) -> &SubmissionState {
        &self.submission
    }

    /// Submit the validated rows. Rows stay in the session whatever the
    /// outcome, so a failed submission can be retried.
    pub async fn submit<S>(&mut self, submitter: &S) -> Result<(), SessionError>
    where
        S: InterventionSubmitter + ?Sized,
    {
        let batch = self.batch.as_ref().ok_or(SubmissionError::NothingToSubmit)?;
        self.submission.begin()?;

        let outcome = submitter.submit(batch).await;
        self.submission.finish(batch.len(), &outcome);
        outcome.map_err(SessionError::from)
    }

    fn reject(&mut self, error: String) -> ValidationResult {
        let result = ValidationResult::rejected(error);
        self.data = None;
        self.batch = None;
        self.result = Some(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;

    const VALID_CSV: &str = "Intervention Type,Description,Focus,Driver,User Journey,Scope,Link,Contact\n\
        \"Test\",\"A sufficiently long description\",\"Content\",\"Platform-Driven\",\"Proactive\",\"Systemic\",\"https://x.com\",\"a@b.com\"";

    /// Fails the first `fail_times` calls, then records batches
    #[derive(Default)]
    struct ScriptedSubmitter {
        fail_times: Mutex<usize>,
        submitted: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl InterventionSubmitter for ScriptedSubmitter {
        async fn submit(&self, batch: &ValidatedBatch) -> Result<(), SubmissionError> {
            let mut fail = self.fail_times.lock().unwrap();
            if *fail > 0 {
                *fail -= 1;
                return Err(SubmissionError::Rejected("Sheet \"Sheet1\" not found".into()));
            }
            self.submitted.lock().unwrap().push(batch.len());
            Ok(())
        }
    }

    fn complete_form() -> ContributionForm {
        ContributionForm {
            intervention_type: "Forwarding Limits".into(),
            description: "Limits on how many times messages can be forwarded".into(),
            focus: "Behavioral".into(),
            driver: "Platform-Driven".into(),
            user_journey: "Proactive".into(),
            scope: "Systemic".into(),
            link: String::new(),
            contact: "researcher@example.org".into(),
        }
    }

    #[test]
    fn test_parse_failure_clears_data() {
        let mut session = ContributionSession::new();
        session.load_csv(VALID_CSV);
        assert_eq!(session.rows().len(), 1);

        let result = session.load_csv("just a header line\n");
        assert_eq!(result, ValidationResult::rejected("Invalid CSV format or empty file"));
        assert!(session.rows().is_empty());
        assert!(session.batch().is_none());
    }

    #[test]
    fn test_invalid_upload_is_not_retained() {
        let mut session = ContributionSession::new();
        let result = session.load_csv(&VALID_CSV.replace("\"Content\"", "\"Invalid\""));
        assert!(!result.is_valid);
        assert_eq!(result.row_count, 1);
        assert!(session.rows().is_empty());
        assert_eq!(session.result(), Some(&result));
    }

    #[test]
    fn test_form_requires_contact() {
        let mut session = ContributionSession::new();
        let form = ContributionForm {
            contact: String::new(),
            ..complete_form()
        };
        assert_eq!(
            session.add_from_form(&form),
            Err(SessionError::IncompleteForm {
                missing: vec!["Contact"]
            })
        );
        assert!(session.rows().is_empty());
    }

    #[test]
    fn test_form_entries_append_to_upload() {
        let mut session = ContributionSession::new();
        session.load_csv(VALID_CSV);
        let result = session.add_from_form(&complete_form()).unwrap();

        assert!(result.is_valid);
        assert_eq!(result.row_count, 2);
        assert_eq!(session.batch().map(ValidatedBatch::len), Some(2));
        assert_eq!(session.rows()[1]["Contact"], "researcher@example.org");
    }

    #[test]
    fn test_unreadable_file() {
        let mut session = ContributionSession::new();
        let result = session.load_file("/definitely/not/here.csv");
        assert!(!result.is_valid);
        assert!(result.errors[0].starts_with("Error reading file:"));
    }

    #[test]
    fn test_load_file_reads_upload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{VALID_CSV}").unwrap();

        let mut session = ContributionSession::new();
        assert!(session.load_file(file.path()).is_valid);
    }

    #[tokio::test]
    async fn test_submit_without_valid_rows() {
        let submitter = ScriptedSubmitter::default();
        let mut session = ContributionSession::new();
        session.load_csv(&VALID_CSV.replace("\"Systemic\"", "\"\""));

        let err = session.submit(&submitter).await.unwrap_err();
        assert_eq!(err, SessionError::Submission(SubmissionError::NothingToSubmit));
        assert!(submitter.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_submission_can_be_retried() {
        let submitter = ScriptedSubmitter {
            fail_times: Mutex::new(1),
            ..Default::default()
        };
        let mut session = ContributionSession::new();
        session.load_csv(VALID_CSV);

        let err = session.submit(&submitter).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Submission failed: Sheet \"Sheet1\" not found"
        );
        assert!(matches!(session.submission_state(), SubmissionState::Failed { .. }));
        assert_eq!(session.rows().len(), 1);

        session.submit(&submitter).await.unwrap();
        assert_eq!(session.submission_state(), &SubmissionState::Succeeded { rows: 1 });
        assert_eq!(*submitter.submitted.lock().unwrap(), vec![1]);

        let again = session.submit(&submitter).await.unwrap_err();
        assert_eq!(again, SessionError::Submission(SubmissionError::AlreadySubmitted));
    }

    /// Records the intervention types of every batch it receives
    #[derive(Default)]
    struct RecordingSubmitter {
        appended: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InterventionSubmitter for RecordingSubmitter {
        async fn submit(&self, batch: &ValidatedBatch) -> Result<(), SubmissionError> {
            let mut appended = self.appended.lock().unwrap();
            appended.extend(batch.records().iter().map(|r| r.intervention_type.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_form_after_submission_starts_new_set() {
        let submitter = RecordingSubmitter::default();
        let mut session = ContributionSession::new();
        session.load_csv(VALID_CSV);
        session.submit(&submitter).await.unwrap();

        let result = session.add_from_form(&complete_form()).unwrap();
        assert!(result.is_valid);
        assert_eq!(result.row_count, 1);
        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.submission_state(), &SubmissionState::Idle);

        session.submit(&submitter).await.unwrap();
        assert_eq!(
            *submitter.appended.lock().unwrap(),
            vec!["Test".to_string(), "Forwarding Limits".to_string()]
        );
    }
}
