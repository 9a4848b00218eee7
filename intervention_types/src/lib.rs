//! Intervention Types - Foundation Types (No Workspace Dependencies)
//!
//! This crate contains the plain data structures shared by every part of the
//! intervention taxonomy: the contribution record submitted by users, the four
//! categorical dimensions that classify it, the validation result reported back
//! to contributors, and the JSON envelope used on the HTTP boundary.
//!
//! ## Contents
//!
//! - Canonical CSV column names
//! - Categorical enums (`Focus`, `Driver`, `UserJourney`, `Scope`)
//! - `InterventionRecord` - one typed contribution row
//! - `ValidationResult` - errors, warnings and row count of a validation pass
//! - `ApiResponse` - `{ success, data?, error? }` envelope
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - parsing and validation live in `intervention-taxonomy`
//! 2. **NO WORKSPACE DEPENDENCIES** - this crate sits at the bottom of the graph
//! 3. **SERIALIZABLE** - every type crosses the wire as JSON

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CANONICAL COLUMNS
// ============================================================================

pub const COL_INTERVENTION_TYPE: &str = "Intervention Type";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_FOCUS: &str = "Focus";
pub const COL_DRIVER: &str = "Driver";
pub const COL_USER_JOURNEY: &str = "User Journey";
pub const COL_SCOPE: &str = "Scope";
pub const COL_LINK: &str = "Link";
pub const COL_CONTACT: &str = "Contact";

/// The eight column names a contribution CSV must carry, in template order.
pub const CANONICAL_HEADERS: [&str; 8] = [
    COL_INTERVENTION_TYPE,
    COL_DESCRIPTION,
    COL_FOCUS,
    COL_DRIVER,
    COL_USER_JOURNEY,
    COL_SCOPE,
    COL_LINK,
    COL_CONTACT,
];

/// Columns that must be non-empty on every CSV row. `Link` is optional and
/// `Contact` is only enforced by the form path.
pub const REQUIRED_FIELDS: [&str; 6] = [
    COL_INTERVENTION_TYPE,
    COL_DESCRIPTION,
    COL_FOCUS,
    COL_DRIVER,
    COL_USER_JOURNEY,
    COL_SCOPE,
];

/// Categorical columns paired with their allowed values, in validation order.
pub const CATEGORICAL_FIELDS: [(&str, &[&str]); 4] = [
    (COL_FOCUS, Focus::ALLOWED),
    (COL_DRIVER, Driver::ALLOWED),
    (COL_USER_JOURNEY, UserJourney::ALLOWED),
    (COL_SCOPE, Scope::ALLOWED),
];

pub fn is_canonical_header(name: &str) -> bool {
    CANONICAL_HEADERS.contains(&name)
}

// ============================================================================
// CATEGORICAL DIMENSIONS
// ============================================================================

/// A value outside the fixed set of a categorical column
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value for \"{field}\". Must be one of: {}", .allowed.join(", "))]
pub struct UnknownCategory {
    pub field: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

/// What the intervention acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Focus {
    Behavioral,
    Content,
    Visibility,
}

impl Focus {
    pub const ALLOWED: &'static [&'static str] = &["Behavioral", "Content", "Visibility"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Behavioral => "Behavioral",
            Focus::Content => "Content",
            Focus::Visibility => "Visibility",
        }
    }
}

impl FromStr for Focus {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Behavioral" => Ok(Focus::Behavioral),
            "Content" => Ok(Focus::Content),
            "Visibility" => Ok(Focus::Visibility),
            other => Err(UnknownCategory {
                field: COL_FOCUS,
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Who initiates the intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Driver {
    #[serde(rename = "Platform-Driven")]
    PlatformDriven,
    #[serde(rename = "User-Driven")]
    UserDriven,
}

impl Driver {
    pub const ALLOWED: &'static [&'static str] = &["Platform-Driven", "User-Driven"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::PlatformDriven => "Platform-Driven",
            Driver::UserDriven => "User-Driven",
        }
    }
}

impl FromStr for Driver {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Platform-Driven" => Ok(Driver::PlatformDriven),
            "User-Driven" => Ok(Driver::UserDriven),
            other => Err(UnknownCategory {
                field: COL_DRIVER,
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// When in the user's activity the intervention applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserJourney {
    Proactive,
    Retroactive,
}

impl UserJourney {
    pub const ALLOWED: &'static [&'static str] = &["Proactive", "Retroactive"];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserJourney::Proactive => "Proactive",
            UserJourney::Retroactive => "Retroactive",
        }
    }
}

impl FromStr for UserJourney {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Proactive" => Ok(UserJourney::Proactive),
            "Retroactive" => Ok(UserJourney::Retroactive),
            other => Err(UnknownCategory {
                field: COL_USER_JOURNEY,
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// How broadly the intervention applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Systemic,
    Targeted,
}

impl Scope {
    pub const ALLOWED: &'static [&'static str] = &["Systemic", "Targeted"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Systemic => "Systemic",
            Scope::Targeted => "Targeted",
        }
    }
}

impl FromStr for Scope {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Systemic" => Ok(Scope::Systemic),
            "Targeted" => Ok(Scope::Targeted),
            other => Err(UnknownCategory {
                field: COL_SCOPE,
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Focus, Driver, UserJourney, Scope);

// ============================================================================
// CONTRIBUTION RECORD
// ============================================================================

/// One candidate taxonomy entry.
///
/// Serialized with the CSV column names as keys so the JSON posted to the
/// append endpoint lines up with the spreadsheet header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionRecord {
    #[serde(rename = "Intervention Type")]
    pub intervention_type: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Focus")]
    pub focus: Focus,
    #[serde(rename = "Driver")]
    pub driver: Driver,
    #[serde(rename = "User Journey")]
    pub user_journey: UserJourney,
    #[serde(rename = "Scope")]
    pub scope: Scope,
    /// Optional URL; kept even when it fails the `http(s)://` check (that is a warning)
    #[serde(rename = "Link", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(rename = "Contact", default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl InterventionRecord {
    /// Cell value for a canonical column, empty string for absent optionals
    pub fn field(&self, column: &str) -> Option<&str> {
        match column {
            COL_INTERVENTION_TYPE => Some(&self.intervention_type),
            COL_DESCRIPTION => Some(&self.description),
            COL_FOCUS => Some(self.focus.as_str()),
            COL_DRIVER => Some(self.driver.as_str()),
            COL_USER_JOURNEY => Some(self.user_journey.as_str()),
            COL_SCOPE => Some(self.scope.as_str()),
            COL_LINK => Some(self.link.as_deref().unwrap_or("")),
            COL_CONTACT => Some(self.contact.as_deref().unwrap_or("")),
            _ => None,
        }
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

/// Outcome of validating a set of contribution rows.
///
/// `is_valid` is true iff `errors` is empty. `row_count` is the number of
/// rows the parser produced, not the number of valid rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub row_count: usize,
}

impl ValidationResult {
    pub fn new(errors: Vec<String>, warnings: Vec<String>, row_count: usize) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            row_count,
        }
    }

    /// A single blocking error with no rows, used when input cannot be read or parsed
    pub fn rejected(error: impl Into<String>) -> Self {
        Self::new(vec![error.into()], Vec::new(), 0)
    }
}

// ============================================================================
// HTTP ENVELOPE
// ============================================================================

/// JSON envelope for every API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = ()> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Bare `{"success": true}` acknowledgement
    pub fn ack() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}
