//! Contribution row validation
//!
//! Checks parsed rows against the fixed contribution schema. Every problem in
//! the input is collected in one pass: errors block submission, warnings do
//! not. A pass with no errors also yields a [`ValidatedBatch`], the only value
//! the submission path accepts.
//!
//! Rules, in reporting order:
//! 1. missing canonical columns (one error)
//! 2. unrecognised columns (one warning)
//! 3. data lines dropped by the parser (one warning each)
//! 4. per row, only when no column is missing: required fields, link shape,
//!    categorical values, description length

use std::sync::LazyLock;

use intervention_types::{
    is_canonical_header, Driver, Focus, InterventionRecord, Scope, UnknownCategory, UserJourney,
    ValidationResult, CANONICAL_HEADERS, CATEGORICAL_FIELDS, COL_CONTACT, COL_DESCRIPTION,
    COL_DRIVER, COL_FOCUS, COL_INTERVENTION_TYPE, COL_LINK, COL_SCOPE, COL_USER_JOURNEY,
    REQUIRED_FIELDS,
};
use regex::Regex;
use serde::Serialize;

use crate::csv_intake::{ParsedCsv, RawRow};

/// Descriptions shorter than this many characters draw a warning
pub const MIN_DESCRIPTION_CHARS: usize = 10;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://.+").unwrap());

// =============================================================================
// VALIDATED BATCH
// =============================================================================

/// A non-empty set of records from a validation pass with zero errors.
///
/// There is no public constructor; holding one proves the rows were valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedBatch {
    records: Vec<InterventionRecord>,
}

impl ValidatedBatch {
    pub fn records(&self) -> &[InterventionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<InterventionRecord> {
        self.records
    }
}

/// Result of [`validate`]: what to show the contributor, plus the batch when valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub result: ValidationResult,
    batch: Option<ValidatedBatch>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.result.is_valid
    }

    /// `None` when there were errors, or when every data line was dropped
    pub fn batch(&self) -> Option<&ValidatedBatch> {
        self.batch.as_ref()
    }

    pub fn into_parts(self) -> (ValidationResult, Option<ValidatedBatch>) {
        (self.result, self.batch)
    }
}

// =============================================================================
// VALIDATION PASS
// =============================================================================

pub fn validate(parsed: &ParsedCsv) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let missing: Vec<&str> = CANONICAL_HEADERS
        .iter()
        .copied()
        .filter(|h| !parsed.headers.iter().any(|p| p == h))
        .collect();
    let extra: Vec<&str> = parsed
        .headers
        .iter()
        .map(String::as_str)
        .filter(|h| !is_canonical_header(h))
        .collect();

    if !missing.is_empty() {
        errors.push(format!("Missing required columns: {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        warnings.push(format!("Extra columns detected: {}", extra.join(", ")));
    }

    for skipped in &parsed.skipped {
        warnings.push(format!(
            "File line {}: expected {} fields, found {}; row skipped",
            skipped.line, skipped.expected, skipped.field_count
        ));
    }

    let mut records = Vec::with_capacity(parsed.rows.len());
    if missing.is_empty() {
        for (index, row) in parsed.rows.iter().enumerate() {
            // +2: rows are 0-based and the header occupies line 1
            let row_num = index + 2;
            check_row(row, row_num, &mut errors, &mut warnings);
            if let Some(record) = build_record(row) {
                records.push(record);
            }
        }
    }

    let batch = (errors.is_empty() && !records.is_empty()).then_some(ValidatedBatch { records });

    ValidationReport {
        result: ValidationResult::new(errors, warnings, parsed.rows.len()),
        batch,
    }
}

fn check_row(row: &RawRow, row_num: usize, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    for field in REQUIRED_FIELDS {
        if cell(row, field).trim().is_empty() {
            errors.push(format!("Row {row_num}: Missing required field \"{field}\""));
        }
    }

    let link = cell(row, COL_LINK);
    if !link.trim().is_empty() && !LINK_RE.is_match(link) {
        warnings.push(format!(
            "Row {row_num}: Link should be a valid URL starting with http:// or https://"
        ));
    }

    for (field, allowed) in CATEGORICAL_FIELDS {
        let value = cell(row, field);
        if !value.is_empty() && !allowed.contains(&value) {
            let err = UnknownCategory {
                field,
                value: value.to_string(),
                allowed,
            };
            errors.push(format!("Row {row_num}: {err}"));
        }
    }

    let description = cell(row, COL_DESCRIPTION);
    if !description.is_empty() && description.chars().count() < MIN_DESCRIPTION_CHARS {
        warnings.push(format!("Row {row_num}: Description seems very short"));
    }
}

/// Typed record for a row that passes every blocking rule. Keys outside the
/// canonical set are dropped here.
fn build_record(row: &RawRow) -> Option<InterventionRecord> {
    let non_empty = |field: &str| {
        let value = cell(row, field).trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    Some(InterventionRecord {
        intervention_type: non_empty(COL_INTERVENTION_TYPE)?,
        description: non_empty(COL_DESCRIPTION)?,
        focus: cell(row, COL_FOCUS).parse::<Focus>().ok()?,
        driver: cell(row, COL_DRIVER).parse::<Driver>().ok()?,
        user_journey: cell(row, COL_USER_JOURNEY).parse::<UserJourney>().ok()?,
        scope: cell(row, COL_SCOPE).parse::<Scope>().ok()?,
        link: non_empty(COL_LINK),
        contact: non_empty(COL_CONTACT),
    })
}

fn cell<'a>(row: &'a RawRow, field: &str) -> &'a str {
    row.get(field).map(String::as_str).unwrap_or("")
}
