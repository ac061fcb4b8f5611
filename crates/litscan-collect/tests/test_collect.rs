//! Database info and count collection against the mock E-utilities server.

use litscan_collect::info::collect_info;
use litscan_collect::{CountSource, EUtilsCounter};
use litscan_common::error::RequestError;
use litscan_common::{CollectionConfig, LoggingMode};
use litscan_test_utils::{mock_count, MockEutils, MOCK_DB_BUILD, MOCK_DB_COUNT};

fn mock_config(mock: &MockEutils) -> CollectionConfig {
    CollectionConfig {
        base_url: mock.base_url.clone(),
        logging: LoggingMode::Store,
        wait_time_secs: Some(0.0),
        ..CollectionConfig::default()
    }
}

#[tokio::test]
async fn test_collect_info_reads_db_fields() {
    let mock = MockEutils::spawn().await.unwrap();
    let meta = collect_info(&mock_config(&mock)).await.unwrap();

    let info = meta.db_info().unwrap();
    assert_eq!(info.dbname.as_deref(), Some("pubmed"));
    assert_eq!(info.menuname.as_deref(), Some("PubMed"));
    assert_eq!(info.dbbuild.as_deref(), Some(MOCK_DB_BUILD));
    assert_eq!(info.count, Some(MOCK_DB_COUNT));
    assert_eq!(info.lastupdate.as_deref(), Some("2026/10/18 04:00"));

    assert_eq!(meta.requester().n_requests, 1);
    assert_eq!(meta.requester().logging, LoggingMode::Store);
    assert!(meta.requester().finished_at.is_some());
}

#[tokio::test]
async fn test_collect_info_unreachable_is_request_error() {
    let config = CollectionConfig {
        base_url: "http://127.0.0.1:9/".to_string(),
        wait_time_secs: Some(0.0),
        timeout_secs: 1,
        ..CollectionConfig::default()
    };
    let err = collect_info(&config).await.unwrap_err();
    assert!(matches!(err, litscan_common::LitscanError::Request(_)));
}

#[tokio::test]
async fn test_search_count_sends_term_and_parses_count() {
    let mock = MockEutils::spawn().await.unwrap();
    let mut counter = EUtilsCounter::from_config(&mock_config(&mock)).unwrap();

    let query = r#"("language")NOT("protein")"#;
    let count = counter.search_count(query).await.unwrap();

    assert_eq!(count, mock_count(query));
    assert_eq!(mock.searches(), vec![query.to_string()]);
    let logged = &counter.requester().stored_log()[0];
    assert!(logged.contains("esearch.fcgi?db=pubmed&retmode=xml&rettype=count&term="));

    let summary = counter.close();
    assert_eq!(summary.n_requests, 1);
}

#[tokio::test]
async fn test_search_count_server_error() {
    let mock = MockEutils::spawn().await.unwrap();
    let mut counter = EUtilsCounter::from_config(&mock_config(&mock)).unwrap();

    let err = counter.search_count("\"FAIL\"").await.unwrap_err();
    assert!(matches!(err, RequestError::Status { status: 500, .. }));
}
