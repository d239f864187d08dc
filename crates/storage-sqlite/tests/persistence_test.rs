//! Integration tests: the resilience layer persisting through SQLite.

use std::sync::Arc;

use samplehub_resilience::{
    CatalogCache, CatalogPage, CatalogQuery, ClientEnvironment, ConnectivityFlag, ErrorDetails,
    ErrorKind, ErrorLog, StoreCatalogCache, UpstreamError,
};
use samplehub_storage_sqlite::{get_db_path, SqliteStore};

fn error_log(store: Arc<SqliteStore>) -> ErrorLog {
    ErrorLog::new(
        store,
        Arc::new(ConnectivityFlag::online()),
        ClientEnvironment::new("samplehub://search", "samplehub-tests"),
    )
}

#[test]
fn test_error_log_restored_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = get_db_path(dir.path());

    {
        let log = error_log(Arc::new(SqliteStore::open(&path).unwrap()));
        log.log_error(
            "youtube",
            &UpstreamError::http(403, "quota exceeded"),
            ErrorDetails::new(ErrorKind::QuotaExceeded),
        );
        log.log_error(
            "youtube",
            &UpstreamError::network("connection reset"),
            ErrorDetails::new(ErrorKind::NetworkGeneric).with_retry_attempt(1),
        );
    }

    let log = error_log(Arc::new(SqliteStore::open(&path).unwrap()));
    let records = log.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].error_kind, ErrorKind::QuotaExceeded);
    assert_eq!(records[1].retry_attempt, 1);
    assert_eq!(records[1].metadata.user_agent, "samplehub-tests");

    let stats = log.get_error_stats();
    assert_eq!(stats.total_errors, 2);
    assert_eq!(stats.retry_attempts, 1);

    log.clear_error_logs();
    let log = error_log(Arc::new(SqliteStore::open(&path).unwrap()));
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_catalog_cache_round_trips_through_sqlite() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let cache = StoreCatalogCache::new(store.clone());
    let query = CatalogQuery::new("808 kick").with_tags(["drums"]);
    let page = CatalogPage::new("808 kick", Vec::new());

    assert_eq!(cache.get(&query).await.unwrap(), None);
    cache.put(&query, &page).await.unwrap();
    assert_eq!(cache.get(&query).await.unwrap(), Some(page));
    assert_eq!(store.count().unwrap(), 1);
}
