//! End-to-end checks of CSV intake and validation through the public API

use intervention_taxonomy::{
    ContributionForm, ContributionSession, Focus, SessionError, ValidatedBatch,
};

const HEADER: &str = "Intervention Type,Description,Focus,Driver,User Journey,Scope,Link,Contact";
const ROW: &str = r#""Test","A sufficiently long description","Content","Platform-Driven","Proactive","Systemic","https://x.com","a@b.com""#;

fn csv(lines: &[&str]) -> String {
    lines.join("\n")
}

#[test]
fn test_valid_upload_scenario() {
    let mut session = ContributionSession::new();
    let result = session.load_csv(&csv(&[HEADER, ROW]));

    assert!(result.is_valid);
    assert_eq!(result.row_count, 1);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());

    let batch = session.batch().expect("valid upload yields a batch");
    assert_eq!(batch.len(), 1);
    let record = &batch.records()[0];
    assert_eq!(record.focus, Focus::Content);
    assert_eq!(record.link.as_deref(), Some("https://x.com"));
}

#[test]
fn test_invalid_focus_scenario() {
    let mut session = ContributionSession::new();
    let result = session.load_csv(&csv(&[HEADER, &ROW.replace("\"Content\"", "\"Invalid\"")]));

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Focus"));
    assert!(result.errors[0].contains("Behavioral, Content, Visibility"));
    assert!(session.batch().is_none());
}

#[test]
fn test_missing_column_scenario() {
    let header = HEADER.replace(",Scope", "");
    let row = r#""Test","","Nope","Platform-Driven","Proactive","https://x.com","a@b.com""#;
    let mut session = ContributionSession::new();
    let result = session.load_csv(&csv(&[&header, row]));

    assert!(!result.is_valid);
    assert_eq!(result.errors, vec!["Missing required columns: Scope".to_string()]);
    assert_eq!(result.row_count, 1);
}

#[test]
fn test_errors_and_warnings_are_collected_together() {
    let bad_row = r#""","short","Visibility","Nobody","Proactive","Targeted","ftp://x","""#;
    let ragged = r#""Only","three","fields""#;
    let mut session = ContributionSession::new();
    let result = session.load_csv(&csv(&[HEADER, ROW, bad_row, ragged]));

    assert!(!result.is_valid);
    assert_eq!(result.row_count, 2);
    assert_eq!(
        result.errors,
        vec![
            "Row 3: Missing required field \"Intervention Type\"".to_string(),
            "Row 3: Invalid value for \"Driver\". Must be one of: Platform-Driven, User-Driven"
                .to_string(),
        ]
    );
    assert_eq!(
        result.warnings,
        vec![
            "File line 4: expected 8 fields, found 3; row skipped".to_string(),
            "Row 3: Link should be a valid URL starting with http:// or https://".to_string(),
            "Row 3: Description seems very short".to_string(),
        ]
    );
}

#[test]
fn test_header_order_is_free_and_extra_columns_warn() {
    let header = "Scope,Notes,Contact,Link,User Journey,Driver,Focus,Description,Intervention Type";
    let row = r#"Targeted,"internal, do not publish",,,Retroactive,User-Driven,Visibility,"Users can hide replies",Hidden Replies"#;
    let mut session = ContributionSession::new();
    let result = session.load_csv(&csv(&[header, row]));

    assert!(result.is_valid);
    assert_eq!(result.warnings, vec!["Extra columns detected: Notes".to_string()]);
    let record = &session.batch().map(ValidatedBatch::records).unwrap()[0];
    assert_eq!(record.intervention_type, "Hidden Replies");
    assert_eq!(record.contact, None);
}

#[test]
fn test_form_entry_starts_new_batch() {
    let mut session = ContributionSession::new();
    let form = ContributionForm {
        intervention_type: "Reply Limits".into(),
        description: "Authors choose who may reply to a post".into(),
        focus: "Behavioral".into(),
        driver: "User-Driven".into(),
        user_journey: "Proactive".into(),
        scope: "Targeted".into(),
        link: "help.example.com/replies".into(),
        contact: "me@example.org".into(),
    };

    let result = session.add_from_form(&form).unwrap();
    assert!(result.is_valid);
    assert_eq!(result.row_count, 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(session.batch().map(ValidatedBatch::len), Some(1));

    let incomplete = ContributionForm {
        focus: String::new(),
        contact: String::new(),
        ..form
    };
    match session.add_from_form(&incomplete) {
        Err(SessionError::IncompleteForm { missing }) => assert_eq!(missing, vec!["Focus", "Contact"]),
        other => panic!("expected incomplete form, got {other:?}"),
    }
    assert_eq!(session.rows().len(), 1);
}

#[test]
fn test_reset_clears_everything() {
    let mut session = ContributionSession::new();
    session.load_csv(&csv(&[HEADER, ROW]));
    session.reset();

    assert!(session.result().is_none());
    assert!(session.rows().is_empty());
    assert!(session.batch().is_none());
}
