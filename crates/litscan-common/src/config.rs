//! Collection configuration.
//!
//! Settings for talking to the E-utilities API: which endpoint and database
//! to use, the optional API key, request logging, and pacing overrides.
//! Loadable from TOML; every field has a serde default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LitscanError, Result};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "LITSCAN_NCBI_API_KEY";

/// What to do with every URL the requester issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingMode {
    #[default]
    None,
    /// Write each URL to stdout.
    Print,
    /// Keep each URL in memory on the requester.
    Store,
    /// Append each URL to `requester_log.txt` in the log folder.
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// E-utilities base endpoint, e.g. `https://eutils.ncbi.nlm.nih.gov/entrez/eutils/`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Target database (e.g. "pubmed")
    #[serde(default = "default_db")]
    pub db: String,

    pub api_key: Option<String>,

    /// Search field restriction (e.g. "TIAB"); whole record when unset
    pub field: Option<String>,

    #[serde(default)]
    pub logging: LoggingMode,

    /// Folder for `LoggingMode::File` logs
    pub log_folder: Option<PathBuf>,

    /// Override of the pacing interval derived from the API key
    pub wait_time_secs: Option<f64>,

    /// Also collect co-occurrence counts
    #[serde(default = "bool_true")]
    pub collect_coocs: bool,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/".to_string() }
fn default_db()       -> String { "pubmed".to_string() }
fn bool_true()        -> bool   { true }
fn default_timeout()  -> u64    { 30 }

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            db: default_db(),
            api_key: None,
            field: None,
            logging: LoggingMode::None,
            log_folder: None,
            wait_time_secs: None,
            collect_coocs: true,
            timeout_secs: default_timeout(),
        }
    }
}

impl CollectionConfig {
    /// Config for a given database with everything else defaulted.
    pub fn for_db(db: &str) -> Self {
        Self { db: db.to_string(), ..Self::default() }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LitscanError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LitscanError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The configured key, or the one in `LITSCAN_NCBI_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        match &self.api_key {
            Some(key) if !key.is_empty() => Some(key.clone()),
            _ => std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
        }
    }

    /// Pacing override, if configured. Negative or non-finite values are rejected.
    pub fn wait_time_override(&self) -> Result<Option<Duration>> {
        match self.wait_time_secs {
            None => Ok(None),
            Some(secs) => Duration::try_from_secs_f64(secs).map(Some).map_err(|_| {
                LitscanError::Config(format!("wait_time_secs must be non-negative, got {secs}"))
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_pubmed() {
        let config = CollectionConfig::default();
        assert_eq!(config.db, "pubmed");
        assert!(config.base_url.starts_with("https://eutils.ncbi.nlm.nih.gov"));
        assert_eq!(config.logging, LoggingMode::None);
        assert!(config.collect_coocs);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = CollectionConfig::from_toml_str(
            r#"
            db = "pmc"
            logging = "store"
            wait_time_secs = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.db, "pmc");
        assert_eq!(config.logging, LoggingMode::Store);
        assert_eq!(config.wait_time_override().unwrap(), Some(Duration::from_millis(500)));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_negative_wait_time_is_config_error() {
        let config = CollectionConfig { wait_time_secs: Some(-1.0), ..Default::default() };
        assert!(matches!(config.wait_time_override(), Err(LitscanError::Config(_))));
    }

    #[test]
    fn test_unknown_logging_mode_rejected() {
        let err = CollectionConfig::from_toml_str(r#"logging = "syslog""#).unwrap_err();
        assert!(matches!(err, LitscanError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = CollectionConfig::from_file(Path::new("/nonexistent/litscan.toml")).unwrap_err();
        assert!(matches!(err, LitscanError::Config(_)));
    }
}
