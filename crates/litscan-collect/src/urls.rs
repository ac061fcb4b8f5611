//! NCBI E-utilities URL construction.
//!
//! Endpoints:
//!   einfo:   <base>/einfo.fcgi
//!   esearch: <base>/esearch.fcgi
//!   efetch:  <base>/efetch.fcgi
//!   esummary: <base>/esummary.fcgi

use std::collections::HashMap;
use std::time::Duration;

use litscan_common::error::{LitscanError, Result};
use litscan_common::CollectionConfig;
use url::Url;

pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";

const UTILS: [(&str, &str); 4] = [
    ("info",    "einfo.fcgi"),
    ("search",  "esearch.fcgi"),
    ("fetch",   "efetch.fcgi"),
    ("summary", "esummary.fcgi"),
];

/// Minimum interval between requests. NCBI allows 10 requests/s with an API key, 3 without.
pub fn get_wait_time(authenticated: bool) -> Duration {
    if authenticated {
        Duration::from_millis(100)
    } else {
        Duration::from_secs_f64(1.0 / 3.0)
    }
}

#[derive(Debug, Clone)]
pub struct EUtils {
    base: Url,
    settings: HashMap<String, String>,
    urls: HashMap<String, Url>,
}

impl EUtils {
    pub fn new(base: &str) -> Result<Self> {
        // Url::join replaces the last path segment unless the base ends in '/'
        let normalised = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
        let base = Url::parse(&normalised)
            .map_err(|e| LitscanError::Config(format!("Invalid base URL '{base}': {e}")))?;
        Ok(Self { base, settings: HashMap::new(), urls: HashMap::new() })
    }

    /// Base URL plus `db`, `retmode=xml`, and `field` / `api_key` when configured.
    pub fn from_config(config: &CollectionConfig) -> Result<Self> {
        let mut urls = Self::new(&config.base_url)?
            .with_setting("db", &config.db)
            .with_setting("retmode", "xml");
        if let Some(field) = &config.field {
            urls = urls.with_setting("field", field);
        }
        if let Some(key) = config.resolved_api_key() {
            urls = urls.with_setting("api_key", &key);
        }
        Ok(urls)
    }

    pub fn with_setting(mut self, key: &str, value: &str) -> Self {
        self.settings.insert(key.to_string(), value.to_string());
        self
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn authenticated(&self) -> bool {
        self.settings.contains_key("api_key")
    }

    pub fn wait_time(&self) -> Duration {
        get_wait_time(self.authenticated())
    }

    /// Build and remember the URL for `util` with the given settings, in order.
    pub fn build_url(&mut self, util: &str, keys: &[&str]) -> Result<()> {
        let endpoint = UTILS
            .iter()
            .find(|(name, _)| *name == util)
            .map(|(_, endpoint)| *endpoint)
            .ok_or_else(|| LitscanError::Config(format!("Unknown E-utility '{util}'")))?;

        let mut url = self
            .base
            .join(endpoint)
            .map_err(|e| LitscanError::Config(format!("Cannot build URL for '{util}': {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            for key in keys {
                let value = self.settings.get(*key).ok_or_else(|| {
                    LitscanError::Config(format!("No value for setting '{key}' of '{util}'"))
                })?;
                query.append_pair(key, value);
            }
        }
        // An empty settings list should not leave a dangling '?'
        if keys.is_empty() {
            url.set_query(None);
        }

        self.urls.insert(util.to_string(), url);
        Ok(())
    }

    /// The built URL for `util`.
    pub fn url(&self, util: &str) -> Result<Url> {
        self.urls
            .get(util)
            .cloned()
            .ok_or_else(|| LitscanError::Config(format!("URL for '{util}' has not been built")))
    }

    /// Only the settings among `keys` that have a value, order kept.
    pub fn present<'a>(&self, keys: &[&'a str]) -> Vec<&'a str> {
        keys.iter().copied().filter(|k| self.settings.contains_key(*k)).collect()
    }

    /// A built URL with per-call parameters (e.g. `term`) appended.
    pub fn get_url(&self, util: &str, extra: &[(&str, &str)]) -> Result<String> {
        let mut url = self.url(util)?;
        if !extra.is_empty() {
            url.query_pairs_mut().extend_pairs(extra.iter().copied());
        }
        Ok(url.to_string())
    }
}
