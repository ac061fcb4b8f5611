//! Requester pacing and logging against the in-process mock E-utilities server.

use std::time::Duration;

use litscan_collect::requester::{Requester, LOG_FILE_NAME};
use litscan_collect::urls::get_wait_time;
use litscan_common::error::RequestError;
use litscan_common::LoggingMode;
use litscan_test_utils::MockEutils;

#[tokio::test]
async fn test_consecutive_requests_are_spaced_by_wait_time() {
    let mock = MockEutils::spawn().await.unwrap();
    let wait = Duration::from_millis(200);
    let mut req = Requester::new(wait, LoggingMode::None, None).unwrap();

    let url = format!("{}einfo.fcgi?db=pubmed", mock.base_url);
    req.request_url(&url).await.unwrap();
    let first = req.last_request_at().unwrap();
    req.request_url(&url).await.unwrap();
    let second = req.last_request_at().unwrap();

    assert!(
        second.duration_since(first) >= wait,
        "requests only {:?} apart",
        second.duration_since(first)
    );
    assert_eq!(req.n_requests(), 2);
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn test_authenticated_pacing_is_not_slower() {
    let anon = Requester::new(get_wait_time(false), LoggingMode::None, None).unwrap();
    let keyed = Requester::new(get_wait_time(true), LoggingMode::None, None).unwrap();
    assert!(keyed.wait_time() <= anon.wait_time());
}

#[tokio::test]
async fn test_store_logging_keeps_urls_in_order() {
    let mock = MockEutils::spawn().await.unwrap();
    let mut req = Requester::new(Duration::ZERO, LoggingMode::Store, None).unwrap();

    let first = format!("{}einfo.fcgi?db=pubmed", mock.base_url);
    let second = format!("{}esearch.fcgi?db=pubmed&term=brain", mock.base_url);
    req.request_url(&first).await.unwrap();
    req.request_url(&second).await.unwrap();

    assert_eq!(req.stored_log(), [first, second]);
}

#[tokio::test]
async fn test_file_logging_written_and_released_on_close() {
    let mock = MockEutils::spawn().await.unwrap();
    let folder = tempfile::tempdir().unwrap();
    let mut req = Requester::new(Duration::ZERO, LoggingMode::File, Some(folder.path())).unwrap();

    let url = format!("{}esearch.fcgi?term=memory", mock.base_url);
    req.request_url(&url).await.unwrap();
    let summary = req.close();

    let log_path = folder.path().join(LOG_FILE_NAME);
    assert_eq!(summary.log_file.as_deref(), Some(log_path.as_path()));
    assert_eq!(summary.n_requests, 1);
    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(contents, format!("{url}\n"));
}

#[tokio::test]
async fn test_file_log_flushed_when_request_fails() {
    let mock = MockEutils::spawn().await.unwrap();
    let folder = tempfile::tempdir().unwrap();
    let url = format!("{}esearch.fcgi?term=FAIL", mock.base_url);

    {
        let mut req =
            Requester::new(Duration::ZERO, LoggingMode::File, Some(folder.path())).unwrap();
        let err = req.request_url(&url).await.unwrap_err();
        assert!(matches!(err, RequestError::Status { status: 500, .. }));
        // Dropped here without close()
    }

    let contents = std::fs::read_to_string(folder.path().join(LOG_FILE_NAME)).unwrap();
    assert_eq!(contents.lines().collect::<Vec<_>>(), vec![url.as_str()]);
}
