//! Environment configuration
//!
//! Everything is read from environment variables (binaries load `.env` first
//! with `dotenvy`). Unset variables fall back to the defaults below.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use url::Url;

use crate::error::{ConfigError, SheetsError, TaxonomyError};
use crate::sheets::{CredentialSource, GoogleSheetsSink, InMemorySheet, SpreadsheetSink};
use crate::taxonomy::TaxonomyCatalog;

pub const BIND_ADDR_ENV: &str = "BIND_ADDR";
pub const SHEET_BACKEND_ENV: &str = "INTERVENTIONS_SHEET_BACKEND";
pub const SHEET_ID_ENV: &str = "INTERVENTIONS_SHEET_ID";
pub const SHEET_NAME_ENV: &str = "INTERVENTIONS_SHEET_NAME";
pub const TAXONOMY_PATH_ENV: &str = "INTERVENTIONS_TAXONOMY_PATH";
pub const ENDPOINT_ENV: &str = "INTERVENTIONS_ENDPOINT";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SHEET_ID: &str = "1X484pNIDsDvlO1b5Xi7t4kqewc-rzxSanWxkFtywsFE";
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SheetBackend {
    #[default]
    Google,
    Memory,
}

impl FromStr for SheetBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(SheetBackend::Google),
            "memory" => Ok(SheetBackend::Memory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub backend: SheetBackend,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub credentials: CredentialSource,
}

impl SheetConfig {
    pub fn build_sink(&self) -> Result<Arc<dyn SpreadsheetSink>, SheetsError> {
        let sink: Arc<dyn SpreadsheetSink> = match self.backend {
            SheetBackend::Google => Arc::new(GoogleSheetsSink::new(
                &self.spreadsheet_id,
                &self.sheet_name,
                self.credentials.clone(),
            )?),
            SheetBackend::Memory => Arc::new(InMemorySheet::with_canonical_headers(&self.sheet_name)),
        };
        Ok(sink)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub sheet: SheetConfig,
    /// YAML override for the built-in taxonomy
    pub taxonomy_path: Option<PathBuf>,
    /// Server root the CLI submits to
    pub endpoint: Url,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_value = var(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_value
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddr {
                value: bind_value.clone(),
                reason: e.to_string(),
            })?;

        let backend = var(SHEET_BACKEND_ENV)
            .map(|v| v.parse::<SheetBackend>())
            .transpose()?
            .unwrap_or_default();

        let endpoint_value = var(ENDPOINT_ENV).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(endpoint_value.trim()).map_err(|e| ConfigError::InvalidEndpoint {
            value: endpoint_value.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            bind_addr,
            sheet: SheetConfig {
                backend,
                spreadsheet_id: var(SHEET_ID_ENV).unwrap_or_else(|| DEFAULT_SHEET_ID.to_string()),
                sheet_name: var(SHEET_NAME_ENV).unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
                credentials: CredentialSource::from_lookup(&lookup),
            },
            taxonomy_path: var(TAXONOMY_PATH_ENV).map(PathBuf::from),
            endpoint,
        })
    }

    pub fn load_catalog(&self) -> Result<TaxonomyCatalog, TaxonomyError> {
        match &self.taxonomy_path {
            Some(path) => TaxonomyCatalog::load(path),
            None => TaxonomyCatalog::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.sheet.backend, SheetBackend::Google);
        assert_eq!(config.sheet.spreadsheet_id, DEFAULT_SHEET_ID);
        assert_eq!(config.sheet.sheet_name, "Sheet1");
        assert_eq!(config.sheet.credentials, CredentialSource::Unset);
        assert_eq!(config.taxonomy_path, None);
        assert_eq!(config.endpoint.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("INTERVENTIONS_SHEET_BACKEND", "Memory"),
            ("INTERVENTIONS_SHEET_NAME", "Contributions"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/etc/sa.json"),
            ("INTERVENTIONS_TAXONOMY_PATH", "taxonomy.yaml"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.sheet.backend, SheetBackend::Memory);
        assert_eq!(config.sheet.sheet_name, "Contributions");
        assert_eq!(
            config.sheet.credentials,
            CredentialSource::File(PathBuf::from("/etc/sa.json"))
        );
        assert_eq!(config.taxonomy_path, Some(PathBuf::from("taxonomy.yaml")));
    }

    #[test]
    fn test_empty_values_fall_back() {
        let config = config_from(&[("INTERVENTIONS_SHEET_NAME", "  "), ("BIND_ADDR", "")]).unwrap();
        assert_eq!(config.sheet.sheet_name, "Sheet1");
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("INTERVENTIONS_SHEET_BACKEND", "postgres")]),
            Err(ConfigError::UnknownBackend(v)) if v == "postgres"
        ));
        assert!(matches!(
            config_from(&[("BIND_ADDR", "localhost")]),
            Err(ConfigError::InvalidBindAddr { .. })
        ));
        assert!(matches!(
            config_from(&[("INTERVENTIONS_ENDPOINT", "not a url")]),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn test_memory_backend_builds_sink() {
        let config = config_from(&[("INTERVENTIONS_SHEET_BACKEND", "memory")]).unwrap();
        let sink = config.sheet.build_sink().unwrap();
        assert_eq!(sink.describe(), "memory:Sheet1");
    }
}
