//! Paced HTTP requester.
//!
//! Every request issued through one `Requester` is spaced by at least the
//! configured wait time, which is what keeps a scrape inside the remote
//! service's per-client rate limit. `request_url` takes `&mut self`, so a
//! single requester can never have two requests in flight.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use litscan_common::error::{LitscanError, RequestError, Result};
use litscan_common::LoggingMode;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

pub const LOG_FILE_NAME: &str = "requester_log.txt";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A successful response, body already read.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub content: String,
}

/// Snapshot of how a requester behaved, kept for provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequesterSummary {
    pub wait_time_secs: f64,
    pub logging: LoggingMode,
    pub n_requests: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_secs: Option<f64>,
    pub log_file: Option<PathBuf>,
}

pub struct Requester {
    client: Client,
    wait_time: Duration,
    logging: LoggingMode,
    log: Vec<String>,
    log_file: Option<BufWriter<File>>,
    log_path: Option<PathBuf>,
    last_request: Option<Instant>,
    n_requests: usize,
    started_at: DateTime<Utc>,
}

impl Requester {
    /// Create a requester. `LoggingMode::File` needs a folder; the log is
    /// appended to `<folder>/requester_log.txt`.
    pub fn new(wait_time: Duration, logging: LoggingMode, folder: Option<&Path>) -> Result<Self> {
        Self::with_timeout(wait_time, logging, folder, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        wait_time: Duration,
        logging: LoggingMode,
        folder: Option<&Path>,
        timeout: Duration,
    ) -> Result<Self> {
        let (log_file, log_path) = match (logging, folder) {
            (LoggingMode::File, Some(folder)) => {
                let path = folder.join(LOG_FILE_NAME);
                let file = OpenOptions::new().create(true).append(true).open(&path)?;
                (Some(BufWriter::new(file)), Some(path))
            }
            (LoggingMode::File, None) => {
                return Err(LitscanError::Config(
                    "File logging requires a log folder".to_string(),
                ));
            }
            _ => (None, None),
        };

        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| LitscanError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            wait_time,
            logging,
            log: Vec::new(),
            log_file,
            log_path,
            last_request: None,
            n_requests: 0,
            started_at: Utc::now(),
        })
    }

    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }

    pub fn n_requests(&self) -> usize {
        self.n_requests
    }

    /// When the most recent request was issued.
    pub fn last_request_at(&self) -> Option<Instant> {
        self.last_request
    }

    /// URLs kept in memory under `LoggingMode::Store`.
    pub fn stored_log(&self) -> &[String] {
        &self.log
    }

    /// Sleep until the minimum interval since the previous request has passed.
    async fn throttle(&self) {
        if let Some(last) = self.last_request {
            let ready_at = last + self.wait_time;
            if Instant::now() < ready_at {
                debug!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "Pacing request");
                tokio::time::sleep_until(ready_at).await;
            }
        }
    }

    fn log_url(&mut self, url: &str) {
        match self.logging {
            LoggingMode::None => {}
            LoggingMode::Print => println!("{url}"),
            LoggingMode::Store => self.log.push(url.to_string()),
            LoggingMode::File => {
                if let Some(file) = self.log_file.as_mut() {
                    if let Err(e) = writeln!(file, "{url}") {
                        warn!("Failed to write requester log: {}", e);
                    }
                }
            }
        }
    }

    /// Issue a paced GET. Non-success statuses are errors; nothing is retried.
    #[instrument(skip(self))]
    pub async fn request_url(&mut self, url: &str) -> std::result::Result<Page, RequestError> {
        self.throttle().await;

        self.last_request = Some(Instant::now());
        self.n_requests += 1;
        self.log_url(url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| RequestError::Network { url: url.to_string(), source })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Request returned non-success status");
            return Err(RequestError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let content = resp
            .text()
            .await
            .map_err(|source| RequestError::Network { url: url.to_string(), source })?;

        Ok(Page { url: url.to_string(), status: status.as_u16(), content })
    }

    pub fn summary(&self) -> RequesterSummary {
        RequesterSummary {
            wait_time_secs: self.wait_time.as_secs_f64(),
            logging: self.logging,
            n_requests: self.n_requests,
            started_at: self.started_at,
            finished_at: None,
            elapsed_secs: None,
            log_file: self.log_path.clone(),
        }
    }

    /// Flush and release the log file and stamp the end time.
    pub fn close(mut self) -> RequesterSummary {
        self.flush_log();
        self.log_file = None;

        let finished_at = Utc::now();
        let elapsed = (finished_at - self.started_at).to_std().unwrap_or_default();
        RequesterSummary {
            finished_at: Some(finished_at),
            elapsed_secs: Some(elapsed.as_secs_f64()),
            ..self.summary()
        }
    }

    fn flush_log(&mut self) {
        if let Some(file) = self.log_file.as_mut() {
            if let Err(e) = file.flush() {
                warn!("Failed to flush requester log: {}", e);
            }
        }
    }
}

impl Drop for Requester {
    fn drop(&mut self) {
        self.flush_log();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_without_folder_is_config_error() {
        let err = Requester::new(Duration::ZERO, LoggingMode::File, None).err().unwrap();
        assert!(matches!(err, LitscanError::Config(_)));
    }

    #[test]
    fn test_close_reports_summary() {
        let req = Requester::new(Duration::from_millis(100), LoggingMode::Store, None).unwrap();
        let summary = req.close();
        assert_eq!(summary.n_requests, 0);
        assert_eq!(summary.logging, LoggingMode::Store);
        assert!((summary.wait_time_secs - 0.1).abs() < 1e-9);
        assert!(summary.finished_at.is_some());
        assert!(summary.log_file.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let mut req = Requester::with_timeout(
            Duration::ZERO,
            LoggingMode::Store,
            None,
            Duration::from_millis(500),
        )
        .unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let err = req.request_url("http://127.0.0.1:9/einfo.fcgi").await.unwrap_err();
        assert!(matches!(err, RequestError::Network { .. }));
        assert_eq!(req.n_requests(), 1);
        assert_eq!(req.stored_log(), ["http://127.0.0.1:9/einfo.fcgi"]);
    }
}
