//! Configuration loading for the litscan binary.
//! Reads litscan.toml from the current directory or the path in LITSCAN_CONFIG.
//!
//! ```toml
//! project = "erp_project"
//!
//! [collection]
//! db = "pubmed"
//! logging = "file"
//!
//! [terms.a]
//! terms = "erps.txt"
//! exclusions = "erps_excl.txt"
//!
//! [terms.b]
//! terms = "cognition.txt"
//!
//! [report]
//! top = 5
//! score = "association"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use litscan_common::{CollectionConfig, Dim, FileStructure, LoggingMode};
use litscan_objects::ScoreType;

pub const CONFIG_ENV: &str = "LITSCAN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "litscan.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub collection: CollectionConfig,
    /// Project folder holding `terms/`, `logs/` and `data/`
    #[serde(default = "default_project")]
    pub project: PathBuf,
    #[serde(default)]
    pub terms: TermsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

fn default_project() -> PathBuf { PathBuf::from(".") }

/// Term file names, looked up in the project's `terms/` folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermsConfig {
    pub a: Option<DimFiles>,
    pub b: Option<DimFiles>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimFiles {
    pub terms: String,
    pub inclusions: Option<String>,
    pub exclusions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top")]
    pub top: usize,
    pub score: Option<ScoreType>,
}

fn default_top() -> usize { 10 }

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top: default_top(), score: None }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            collection: CollectionConfig::default(),
            project: default_project(),
            terms: TermsConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl TermsConfig {
    /// Configured dimensions, A first.
    pub fn dims(&self) -> Vec<(Dim, &DimFiles)> {
        [(Dim::A, &self.a), (Dim::B, &self.b)]
            .into_iter()
            .filter_map(|(dim, files)| files.as_ref().map(|f| (dim, f)))
            .collect()
    }
}

impl RunConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Create litscan.toml or point {CONFIG_ENV} at a config file.",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        if config.terms.a.is_none() && config.terms.b.is_some() {
            anyhow::bail!("[terms.b] is set without [terms.a]");
        }
        Ok(config)
    }

    /// Collection settings with file logs defaulting to the project's `logs/` folder.
    pub fn collection_config(&self, files: &FileStructure) -> anyhow::Result<CollectionConfig> {
        let mut collection = self.collection.clone();
        if collection.logging == LoggingMode::File && collection.log_folder.is_none() {
            collection.log_folder = Some(files.get_folder_path("logs")?);
        }
        Ok(collection)
    }
}
