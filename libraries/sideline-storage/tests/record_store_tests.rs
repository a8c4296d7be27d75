//! Record store integration tests against a real SQLite file

mod test_helpers;

use sideline_core::RecordStore;
use sideline_storage::records::{self, LIBRARY_KEY, TOGGLES_KEY};
use sideline_storage::SqliteRecordStore;
use test_helpers::TestDb;

#[tokio::test]
async fn absent_record_reads_none() {
    let db = TestDb::new().await;
    let store = SqliteRecordStore::new(db.pool().clone());

    assert!(store.read(LIBRARY_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn write_replaces_previous_value() {
    let db = TestDb::new().await;
    let store = SqliteRecordStore::new(db.pool().clone());

    store.write(LIBRARY_KEY, "{\"letters\":{}}").await.unwrap();
    store
        .write(LIBRARY_KEY, "{\"activeLetter\":\"B\"}")
        .await
        .unwrap();

    assert_eq!(
        store.read(LIBRARY_KEY).await.unwrap().as_deref(),
        Some("{\"activeLetter\":\"B\"}")
    );
}

#[tokio::test]
async fn keys_are_independent() {
    let db = TestDb::new().await;
    let store = SqliteRecordStore::new(db.pool().clone());

    store.write(LIBRARY_KEY, "library").await.unwrap();
    store.write(TOGGLES_KEY, "toggles").await.unwrap();

    assert_eq!(
        records::read(db.pool(), LIBRARY_KEY).await.unwrap().as_deref(),
        Some("library")
    );
    assert_eq!(
        records::read(db.pool(), TOGGLES_KEY).await.unwrap().as_deref(),
        Some("toggles")
    );
}

#[tokio::test]
async fn records_survive_reopening_the_database() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}", temp_dir.path().join("board.db").display());

    {
        let pool = sideline_storage::create_pool(&db_url).await.unwrap();
        sideline_storage::run_migrations(&pool).await.unwrap();
        SqliteRecordStore::new(pool.clone())
            .write(TOGGLES_KEY, "{\"multi\":true}")
            .await
            .unwrap();
        pool.close().await;
    }

    let pool = sideline_storage::create_pool(&db_url).await.unwrap();
    sideline_storage::run_migrations(&pool).await.unwrap();
    let value = SqliteRecordStore::new(pool).read(TOGGLES_KEY).await.unwrap();
    assert_eq!(value.as_deref(), Some("{\"multi\":true}"));
}
