//! Google Sheets sink
//!
//! Service-account flow, one append per call:
//!
//! ```text
//! credentials ──RS256 JWT──► token_uri ──access token──┐
//!                                                      ▼
//!   GET spreadsheets/{id}            sheet titles, target must exist
//!   GET .../values/'Sheet'!1:1       header row
//!   POST .../values/'Sheet'!A1:append   USER_ENTERED, INSERT_ROWS
//! ```
//!
//! Credentials are resolved on first use, not at construction, so a server
//! without them still starts and reports the problem per request.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use url::Url;

use super::{align_rows, SpreadsheetSink};
use crate::error::SheetsError;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/";
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const CREDENTIALS_JSON_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS_JSON";
pub const CREDENTIALS_FILE_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

// =============================================================================
// CREDENTIALS
// =============================================================================

/// The fields of a service-account key file this sink needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    pub fn from_json(text: &str) -> Result<Self, SheetsError> {
        serde_json::from_str(text)
            .map_err(|e| SheetsError::Credentials(format!("invalid service account JSON: {e}")))
    }

    /// Signed JWT for the OAuth2 jwt-bearer grant
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String, SheetsError> {
        // Keys pasted into env vars often carry literal "\n"
        let pem = self.private_key.replace("\\n", "\n");
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| SheetsError::Credentials(format!("invalid private key: {e}")))?;

        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| SheetsError::Credentials(format!("failed to sign assertion: {e}")))
    }
}

/// Where the service-account key comes from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The key file's JSON content
    Inline(String),
    File(PathBuf),
    Unset,
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Inline(_) => f.write_str("Inline([REDACTED])"),
            CredentialSource::File(path) => f.debug_tuple("File").field(path).finish(),
            CredentialSource::Unset => f.write_str("Unset"),
        }
    }
}

impl CredentialSource {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Inline JSON wins over a file path
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(json) = non_empty(CREDENTIALS_JSON_ENV) {
            CredentialSource::Inline(json)
        } else if let Some(path) = non_empty(CREDENTIALS_FILE_ENV) {
            CredentialSource::File(PathBuf::from(path))
        } else {
            CredentialSource::Unset
        }
    }

    pub async fn load(&self) -> Result<ServiceAccountKey, SheetsError> {
        match self {
            CredentialSource::Inline(json) => ServiceAccountKey::from_json(json),
            CredentialSource::File(path) => {
                let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                    SheetsError::Credentials(format!("cannot read {}: {e}", path.display()))
                })?;
                ServiceAccountKey::from_json(&text)
            }
            CredentialSource::Unset => Err(SheetsError::Credentials(format!(
                "set {CREDENTIALS_JSON_ENV} or {CREDENTIALS_FILE_ENV}"
            ))),
        }
    }
}

// =============================================================================
// API RESPONSES
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_rows: Option<usize>,
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

// =============================================================================
// SINK
// =============================================================================

pub struct GoogleSheetsSink {
    http: Client,
    api_base: Url,
    spreadsheet_id: String,
    sheet_name: String,
    credentials: CredentialSource,
    token: Mutex<Option<AccessToken>>,
}

impl GoogleSheetsSink {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        credentials: CredentialSource,
    ) -> Result<Self, SheetsError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let api_base = Url::parse(SHEETS_API_BASE)
            .map_err(|e| SheetsError::DocumentLoad(format!("invalid API base: {e}")))?;

        Ok(Self {
            http,
            api_base,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Point at a different Sheets API root (tests, proxies)
    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        let key = self.credentials.load().await?;
        let now = Utc::now();
        let assertion = key.assertion(now)?;

        tracing::debug!(client_email = %key.client_email, "requesting access token");
        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SheetsError::Auth(error_message(response).await));
        }
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Auth(format!("unexpected token response: {e}")))?;

        let lifetime = (body.expires_in - TOKEN_REFRESH_MARGIN_SECS).max(0);
        *cached = Some(AccessToken {
            value: body.access_token.clone(),
            expires_at: now + chrono::Duration::seconds(lifetime),
        });
        Ok(body.access_token)
    }

    fn spreadsheet_url(&self, tail: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::DocumentLoad(format!("invalid API base '{}'", self.api_base)))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&self.spreadsheet_id)
            .extend(tail);
        Ok(url)
    }

    async fn sheet_titles(&self, token: &str) -> Result<Vec<String>, SheetsError> {
        let mut url = self.spreadsheet_url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self.http.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(SheetsError::DocumentLoad(error_message(response).await));
        }
        let metadata: SpreadsheetMetadata = response.json().await?;
        Ok(metadata
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    async fn header_row(&self, token: &str) -> Result<Vec<String>, SheetsError> {
        let range = a1_range(&self.sheet_name, "1:1");
        let url = self.spreadsheet_url(&["values", &range])?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(SheetsError::DocumentLoad(error_message(response).await));
        }
        let range: ValueRange = response.json().await?;
        let headers: Vec<String> = range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .iter()
            .map(|cell| match cell {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(SheetsError::MissingHeaderRow {
                name: self.sheet_name.clone(),
            });
        }
        Ok(headers)
    }

    async fn append(&self, token: &str, values: Vec<Vec<String>>) -> Result<usize, SheetsError> {
        let count = values.len();
        let target = format!("{}:append", a1_range(&self.sheet_name, "A1"));
        let mut url = self.spreadsheet_url(&["values", &target])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SheetsError::Append(error_message(response).await));
        }
        let body: AppendResponse = response.json().await?;
        Ok(body
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or(count))
    }
}

#[async_trait]
impl SpreadsheetSink for GoogleSheetsSink {
    async fn append_rows(&self, rows: &[Value]) -> Result<usize, SheetsError> {
        let token = self.access_token().await?;

        let titles = self.sheet_titles(&token).await?;
        tracing::debug!(?titles, "available sheets");
        if !titles.iter().any(|t| *t == self.sheet_name) {
            return Err(SheetsError::SheetNotFound {
                name: self.sheet_name.clone(),
            });
        }

        let headers = self.header_row(&token).await?;
        let values = align_rows(&headers, rows)?;
        let appended = self.append(&token, values).await?;

        tracing::info!(
            spreadsheet = %self.spreadsheet_id,
            sheet = %self.sheet_name,
            rows = appended,
            "appended rows"
        );
        Ok(appended)
    }

    fn describe(&self) -> String {
        format!("google:{}/{}", self.spreadsheet_id, self.sheet_name)
    }
}

/// `'Sheet Name'!range`, quotes in the name doubled
fn a1_range(sheet: &str, range: &str) -> String {
    format!("'{}'!{range}", sheet.replace('\'', "''"))
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    google_error_message(status, &body)
}

/// Pull the human message out of a Google API or OAuth error body
fn google_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error_description"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let snippet: String = body.chars().take(200).collect();
            format!("HTTP {status}: {snippet}")
        })
}
