//! The async forms must produce exactly what the blocking forms produce.

use crate::common::{broken_row, person, person_row, Person};
use tidepool::mock::{self, MockExecutor};
use tidepool::sea_query::Value;
use tidepool::{sql, Database, DbBackend, Row};

fn scripted(results: Vec<Vec<Row>>) -> Database<MockExecutor> {
    Database::new(MockExecutor::new(DbBackend::Postgres).append_query_results(results))
}

#[tokio::test]
async fn test_async_single_family() {
    let peta = person("Peta", 18);
    let two = vec![person_row(&peta), person_row(&person("Other", 18))];
    let db = scripted(vec![
        vec![person_row(&peta)],
        vec![],
        vec![],
        two.clone(),
        two,
    ]);

    assert_eq!(db.single_by_key_async::<Person>(peta.id).await.unwrap(), peta);
    assert!(db
        .single_by_key_async::<Person>(uuid::Uuid::new_v4())
        .await
        .unwrap_err()
        .is_not_found());
    assert_eq!(
        db.single_or_default_by_key_async::<Person>(uuid::Uuid::new_v4())
            .await
            .unwrap(),
        None
    );
    assert!(db
        .single_async::<Person>(sql!("WHERE \"Age\" = @0", 18))
        .await
        .unwrap_err()
        .is_multiple_results());
    assert!(db
        .single_or_default_async::<Person>(("\"Age\" = @0", [Value::from(18)]))
        .await
        .unwrap_err()
        .is_multiple_results());
}

#[tokio::test]
async fn test_async_first_family_short_circuits() {
    let a = person("A", 18);
    let db = scripted(vec![
        vec![person_row(&a), broken_row()],
        vec![],
        vec![],
        vec![person_row(&a)],
    ]);

    assert_eq!(db.first_async::<Person>("\"Age\" = 18").await.unwrap(), a);
    assert_eq!(db.executor().rows_fetched(), 1);
    assert!(db
        .first_async::<Person>("\"Age\" = 99")
        .await
        .unwrap_err()
        .is_not_found());
    assert_eq!(
        db.first_or_default_async::<Person>("\"Age\" = 99").await.unwrap(),
        None
    );
    assert_eq!(
        db.first_or_default_by_key_async::<Person>(a.id).await.unwrap(),
        Some(a)
    );
    assert_eq!(db.executor().streams_opened(), db.executor().streams_closed());
}

#[tokio::test]
async fn test_async_exists_and_fetch() {
    let db = scripted(vec![
        vec![mock::exists_row(true)],
        vec![mock::exists_row(false)],
        vec![person_row(&person("A", 1)), person_row(&person("B", 2))],
    ]);
    assert!(db.exists_async::<Person>(sql!("WHERE \"Age\" = @0", 1)).await.unwrap());
    assert!(!db.exists_by_key_async::<Person>(uuid::Uuid::new_v4()).await.unwrap());
    assert_eq!(db.fetch_async::<Person>("").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_blocking_and_async_agree() {
    let a = person("A", 18);
    let b = person("B", 18);
    let results = || {
        vec![
            vec![person_row(&a)],
            vec![person_row(&a), person_row(&b)],
            vec![],
            vec![mock::exists_row(true)],
        ]
    };
    let blocking = scripted(results());
    let suspending = scripted(results());
    let by_age = || sql!("WHERE \"Age\" = @0", 18);

    assert_eq!(
        blocking.single::<Person>(by_age()).unwrap(),
        suspending.single_async::<Person>(by_age()).await.unwrap()
    );
    assert_eq!(
        blocking.first::<Person>(by_age()).unwrap(),
        suspending.first_async::<Person>(by_age()).await.unwrap()
    );
    assert_eq!(
        blocking.single_or_default::<Person>(by_age()).unwrap(),
        suspending.single_or_default_async::<Person>(by_age()).await.unwrap()
    );
    assert_eq!(
        blocking.exists::<Person>(by_age()).unwrap(),
        suspending.exists_async::<Person>(by_age()).await.unwrap()
    );
    assert_eq!(
        blocking.executor().statements(),
        suspending.executor().statements()
    );
}

#[tokio::test]
async fn test_async_backend_error_closes_nothing_twice() {
    let db = Database::new(
        MockExecutor::new(DbBackend::Postgres)
            .append_failing_stream(vec![person_row(&person("A", 1))], 0)
            .append_query_error("connection reset"),
    );
    assert!(db.first_async::<Person>("").await.unwrap_err().is_backend());
    assert!(db.first_async::<Person>("").await.unwrap_err().is_backend());
    assert_eq!(db.executor().streams_opened(), 1);
    assert_eq!(db.executor().streams_closed(), 1);
}
