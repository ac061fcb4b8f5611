use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LitscanError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Term file error: {0}")]
    FileFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("Invalid state: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LitscanError>;

/// A single failed outbound request. Never retried by the library.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("HTTP request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Could not parse response from {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl RequestError {
    pub fn url(&self) -> &str {
        match self {
            RequestError::Network { url, .. }
            | RequestError::Status { url, .. }
            | RequestError::Parse { url, .. } => url,
        }
    }
}

/// One query of a scrape that did not produce a value.
#[derive(Debug)]
pub struct FailedQuery {
    /// Human-readable query identity, e.g. `language` or `language & cognition`.
    pub label: String,
    pub error: RequestError,
}

/// Summary of every failed query in a scrape. Successful values are kept by the caller.
#[derive(Debug)]
pub struct CollectionError {
    pub failures: Vec<FailedQuery>,
}

impl CollectionError {
    pub fn labels(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.label.as_str()).collect()
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collection failed for {} quer", self.failures.len())?;
        write!(f, "{}: ", if self.failures.len() == 1 { "y" } else { "ies" })?;
        let labels = self.labels().join(", ");
        write!(f, "{labels}")
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|f| &f.error as &(dyn std::error::Error + 'static))
    }
}
