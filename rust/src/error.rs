//! Error handling for the intervention taxonomy
//!
//! One `thiserror` enum per concern. Display strings are what contributors and
//! API clients see, so they stay plain and carry the underlying message.

use thiserror::Error;

/// CSV text that cannot be turned into a header plus rows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    /// Fewer than two non-blank lines (header + at least one data line)
    #[error("Invalid CSV format or empty file")]
    TooFewLines { non_blank: usize },
}

/// Spreadsheet append failures; surfaced to API clients verbatim
#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Service account credentials unavailable: {0}")]
    Credentials(String),

    #[error("Authentication with spreadsheet service failed: {0}")]
    Auth(String),

    #[error("Failed to load spreadsheet: {0}")]
    DocumentLoad(String),

    #[error("Sheet \"{name}\" not found")]
    SheetNotFound { name: String },

    #[error("Sheet \"{name}\" has no header row")]
    MissingHeaderRow { name: String },

    #[error("Row {index} must be an object or an array, found {found}")]
    InvalidRow { index: usize, found: String },

    #[error("Failed to append rows: {0}")]
    Append(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Submission of an accepted batch to the append endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("No validated contributions to submit")]
    NothingToSubmit,

    #[error("A submission is already in flight")]
    AlreadyInFlight,

    #[error("These contributions have already been submitted")]
    AlreadySubmitted,

    /// The endpoint answered with `success: false`
    #[error("Submission failed: {0}")]
    Rejected(String),

    /// Network failure or a response that is not the expected JSON
    #[error("Submission error: {0}")]
    Transport(String),
}

/// Contribution session operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Form is missing required fields: {}", .missing.join(", "))]
    IncompleteForm { missing: Vec<&'static str> },

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Environment configuration problems, reported at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown sheet backend '{0}', expected 'google' or 'memory'")]
    UnknownBackend(String),

    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBindAddr { value: String, reason: String },

    #[error("Invalid endpoint URL '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },
}

/// Taxonomy data that cannot be loaded
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("IO error reading taxonomy: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid taxonomy YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Taxonomy entry {index} has an empty type")]
    EmptyType { index: usize },

    #[error("Unknown taxonomy filter '{0}'")]
    UnknownFacet(String),
}
