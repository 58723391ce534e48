use crate::common::{person, AuditEntry, Person};
use tidepool::mock::{self, MockExecutor};
use tidepool::sea_query::Value;
use tidepool::{sql, Database, DbBackend};

fn probe(answers: &[bool]) -> Database<MockExecutor> {
    let results = answers.iter().map(|&found| vec![mock::exists_row(found)]);
    Database::new(MockExecutor::new(DbBackend::Postgres).append_query_results(results))
}

#[test]
fn test_exists_by_key() {
    let peta = person("Peta", 18);
    let db = probe(&[true, false]);
    assert!(db.exists_by_key::<Person>(peta.id).unwrap());
    assert!(!db.exists_by_key::<Person>(uuid::Uuid::new_v4()).unwrap());

    let statement = &db.executor().statements()[0];
    assert_eq!(
        statement.sql,
        r#"SELECT EXISTS (SELECT 1 FROM "people" WHERE "Id" = $1)"#
    );
    assert_eq!(statement.values, vec![Value::from(peta.id)]);
}

#[test]
fn test_exists_with_fragment_and_template() {
    let db = probe(&[true, true]);
    assert!(db.exists::<Person>(("\"Age\" = @0", [Value::from(18)])).unwrap());
    assert!(db.exists::<Person>(sql!("WHERE \"Age\" = @0", 18)).unwrap());

    let statements = db.executor().statements();
    assert_eq!(statements[0], statements[1]);
    assert_eq!(
        statements[0].sql,
        r#"SELECT EXISTS (SELECT 1 FROM "people" WHERE "Age" = $1)"#
    );
}

#[test]
fn test_exists_never_materializes() {
    // Probe rows carry no Person columns at all.
    let db = probe(&[false]);
    assert!(!db.exists::<Person>("\"Age\" > 200").unwrap());
}

#[test]
fn test_exists_accepts_integer_probe_and_empty_result() {
    let db = Database::new(
        MockExecutor::new(DbBackend::Sqlite)
            .append_query_results([vec![mock::row([("exists", Value::from(1i64))])], vec![]]),
    );
    assert!(db.exists::<Person>("\"Age\" = 18").unwrap());
    assert!(!db.exists::<Person>("\"Age\" = 19").unwrap());
}

#[test]
fn test_exists_by_key_without_primary_key() {
    let db = probe(&[]);
    assert!(db.exists_by_key::<AuditEntry>(1).unwrap_err().is_mapping());
}
