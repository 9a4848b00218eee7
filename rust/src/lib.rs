//! Intervention Taxonomy
//!
//! A catalog of social-media platform content-moderation interventions plus a
//! contribution workflow for proposing new entries.
//!
//! ## Contribution pipeline
//!
//! ```text
//! CSV text / form ──► csv_intake::parse ──► validation::validate ──► ValidatedBatch
//!                                                                       │
//!                         submission::HttpSubmissionClient ◄────────────┘
//!                                     │  POST /api/interventions
//!                                     ▼
//!                         api::intervention_routes ──► sheets::SpreadsheetSink
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use intervention_taxonomy::contribution::ContributionSession;
//!
//! let mut session = ContributionSession::new();
//! let csv = "Intervention Type,Description,Focus,Driver,User Journey,Scope,Link,Contact\n\
//!            \"Test\",\"A sufficiently long description\",\"Content\",\"Platform-Driven\",\"Proactive\",\"Systemic\",\"https://x.com\",\"a@b.com\"";
//! let result = session.load_csv(csv);
//! assert!(result.is_valid);
//! ```

// Core error handling
pub mod error;

// Environment configuration
pub mod config;

// Contribution pipeline
pub mod contribution;
pub mod csv_intake;
pub mod submission;
pub mod template;
pub mod validation;

// Spreadsheet append sinks
pub mod sheets;

// Read-only taxonomy browser
pub mod taxonomy;

// REST API routes (when enabled)
#[cfg(feature = "server")]
pub mod api;

pub use contribution::{ContributionForm, ContributionSession};
pub use csv_intake::{parse, ParsedCsv, RawRow};
pub use error::{CsvError, SessionError, SheetsError, SubmissionError};
pub use submission::{HttpSubmissionClient, InterventionSubmitter, SubmissionState};
pub use taxonomy::{Facet, TaxonomyCatalog, TaxonomyEntry, TaxonomyQuery};
pub use validation::{validate, ValidatedBatch, ValidationReport};

pub use intervention_types::*;
