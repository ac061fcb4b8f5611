//! In-process stand-in for the NCBI E-utilities API.
//!
//! `MockEutils::spawn()` binds an axum server on `127.0.0.1:0` serving:
//!   - `einfo.fcgi`   a fixed database description for the requested `db`
//!   - `esearch.fcgi` `<eSearchResult><Count>N</Count></eSearchResult>` where
//!     `N = mock_count(term)`
//!
//! Any `term` containing `FAIL` gets a 500 so tests can exercise partial scrapes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;

/// Marker that makes the mock answer a search with HTTP 500.
pub const FAIL_MARKER: &str = "FAIL";

pub const MOCK_DB_BUILD: &str = "Build-2026.10.18.04.00";
pub const MOCK_DB_COUNT: u64 = 37_012_345;

/// Deterministic article count the mock reports for a search term.
pub fn mock_count(term: &str) -> u64 {
    term.len() as u64
}

#[derive(Default)]
struct MockState {
    searches: Mutex<Vec<String>>,
    requests: Mutex<usize>,
}

pub struct MockEutils {
    pub base_url: String,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockEutils {
    pub async fn spawn() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/einfo.fcgi", get(einfo))
            .route("/esearch.fcgi", get(esearch))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!("Mock E-utilities server stopped: {e}");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}/"),
            state,
            handle,
        })
    }

    /// Every `term` received by `esearch.fcgi`, in arrival order.
    pub fn searches(&self) -> Vec<String> {
        self.state.searches.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Total number of requests served, of any kind.
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().map(|n| *n).unwrap_or_default()
    }
}

impl Drop for MockEutils {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn record_request(state: &MockState) {
    if let Ok(mut n) = state.requests.lock() {
        *n += 1;
    }
}

fn xml(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

async fn einfo(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record_request(&state);
    let db = params.get("db").cloned().unwrap_or_else(|| "pubmed".to_string());
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<eInfoResult>
  <DbInfo>
    <DbName>{db}</DbName>
    <MenuName>PubMed</MenuName>
    <Description>PubMed bibliographic record</Description>
    <DbBuild>{MOCK_DB_BUILD}</DbBuild>
    <Count>{MOCK_DB_COUNT}</Count>
    <LastUpdate>2026/10/18 04:00</LastUpdate>
    <FieldList>
      <Field><Name>ALL</Name><TermCount>0</TermCount></Field>
    </FieldList>
  </DbInfo>
</eInfoResult>"#
    );
    xml(StatusCode::OK, body)
}

async fn esearch(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record_request(&state);
    let term = params.get("term").cloned().unwrap_or_default();
    if let Ok(mut searches) = state.searches.lock() {
        searches.push(term.clone());
    }

    if term.contains(FAIL_MARKER) {
        return xml(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<eSearchResult><ERROR>Search backend failed</ERROR></eSearchResult>".to_string(),
        );
    }

    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<eSearchResult><Count>{}</Count></eSearchResult>",
        mock_count(&term)
    );
    xml(StatusCode::OK, body)
}
