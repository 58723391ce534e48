use crate::common::{broken_row, person, person_row, scripted, AuditEntry, Person};
use tidepool::sea_query::Value;
use tidepool::{sql, DbBackend, Predicate};

#[test]
fn test_single_by_key_returns_the_record() {
    let peta = person("Peta", 18);
    let db = scripted(vec![vec![person_row(&peta)], vec![person_row(&peta)]]);

    let found: Person = db.single_by_key(peta.id).unwrap();
    assert_eq!(found, peta);
    let maybe: Option<Person> = db.single_or_default_by_key(peta.id).unwrap();
    assert_eq!(maybe, Some(peta.clone()));

    let statements = db.executor().statements();
    assert_eq!(
        statements[0].sql,
        r#"SELECT "Id", "FullName", "Age", "Height", "Dob" FROM "people" WHERE "Id" = $1"#
    );
    assert_eq!(statements[0].values, vec![Value::from(peta.id)]);
}

#[test]
fn test_single_by_missing_key() {
    let db = scripted(vec![vec![], vec![]]);
    let err = db.single_by_key::<Person>(uuid::Uuid::new_v4()).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("people"));
    assert_eq!(db.single_or_default_by_key::<Person>(uuid::Uuid::new_v4()).unwrap(), None);
}

#[test]
fn test_single_with_fragment_matching_one_row() {
    let peta = person("Peta", 18);
    let db = scripted(vec![vec![person_row(&peta)]]);
    let found: Person = db.single(sql!("WHERE \"Age\" = @0", 18)).unwrap();
    assert_eq!(found, peta);
}

#[test]
fn test_single_rejects_multiple_rows() {
    let rows = vec![person_row(&person("A", 18)), person_row(&person("B", 18))];
    let db = scripted(vec![rows.clone(), rows]);

    let err = db.single::<Person>(sql!("WHERE \"Age\" = @0", 18)).unwrap_err();
    assert!(err.is_multiple_results());
    let err = db
        .single_or_default::<Person>(sql!("WHERE \"Age\" = @0", 18))
        .unwrap_err();
    assert!(err.is_multiple_results());
}

#[test]
fn test_single_zero_rows_from_fragment() {
    let db = scripted(vec![vec![], vec![]]);
    assert!(db
        .single::<Person>(("\"Age\" = @0", [Value::from(99)]))
        .unwrap_err()
        .is_not_found());
    assert_eq!(
        db.single_or_default::<Person>(("\"Age\" = @0", [Value::from(99)]))
            .unwrap(),
        None
    );
}

#[test]
fn test_fragment_without_where_behaves_like_with_where() {
    let peta = person("Peta", 18);
    let db = scripted(vec![vec![person_row(&peta)], vec![person_row(&peta)]]);

    let bare: Person = db.single(("\"Age\" = @0", [Value::from(18)])).unwrap();
    let prefixed: Person = db.single(sql!("WHERE \"Age\" = @0", 18)).unwrap();
    assert_eq!(bare, prefixed);

    let statements = db.executor().statements();
    assert_eq!(statements[0], statements[1]);
    assert!(statements[0].sql.ends_with(r#"FROM "people" WHERE "Age" = $1"#));
}

#[test]
fn test_second_row_is_not_materialized() {
    // The second row would fail to map; the caller must see MultipleResults.
    let db = scripted(vec![vec![person_row(&person("A", 18)), broken_row()]]);
    let err = db.single::<Person>("\"Age\" = 18").unwrap_err();
    assert!(err.is_multiple_results());
}

#[test]
fn test_single_reads_at_most_two_rows() {
    let rows: Vec<_> = (0..5).map(|i| person_row(&person("P", i))).collect();
    let db = scripted(vec![rows]);
    assert!(db.single::<Person>("").unwrap_err().is_multiple_results());
    assert_eq!(db.executor().rows_fetched(), 2);
}

#[test]
fn test_missing_column_is_mapping_error() {
    let db = scripted(vec![vec![broken_row()]]);
    assert!(db.single::<Person>("\"Age\" = 1").unwrap_err().is_mapping());
}

#[test]
fn test_key_lookup_without_primary_key_is_mapping_error() {
    let db = scripted(vec![]);
    let err = db.single_by_key::<AuditEntry>(1).unwrap_err();
    assert!(err.is_mapping());
    // Never reached the backend.
    assert!(db.executor().statements().is_empty());
}

#[test]
fn test_backend_error_is_passed_through() {
    let db = tidepool::Database::new(
        tidepool::MockExecutor::new(DbBackend::Postgres).append_query_error("syntax error at or near"),
    );
    let err = db.single::<Person>("Age = = 1").unwrap_err();
    assert!(err.is_backend());
    assert!(err.to_string().contains("syntax error at or near"));
}

#[test]
fn test_composite_predicate_from_template() {
    let peta = person("Peta", 18);
    let db = scripted(vec![vec![person_row(&peta)]]);
    let template = tidepool::Sql::empty()
        .where_clause(sql!("\"Age\" = @0", 18))
        .where_clause(sql!("\"FullName\" = @0", "Peta"));
    let found: Person = db.single(Predicate::from(template)).unwrap();
    assert_eq!(found, peta);

    let statement = db.executor().last_statement().unwrap();
    assert!(statement
        .sql
        .ends_with(r#"WHERE ("Age" = $1) AND ("FullName" = $2)"#));
    assert_eq!(statement.values, vec![Value::from(18), Value::from("Peta")]);
}

#[test]
fn test_mysql_escaping_and_placeholders() {
    let peta = person("Peta", 18);
    let db = tidepool::Database::new(
        tidepool::MockExecutor::new(DbBackend::MySql).append_query_results([vec![person_row(&peta)]]),
    );
    let _: Person = db.single_by_key(peta.id).unwrap();
    assert_eq!(
        db.executor().last_statement().unwrap().sql,
        "SELECT `Id`, `FullName`, `Age`, `Height`, `Dob` FROM `people` WHERE `Id` = ?"
    );
    assert_eq!(db.escape_identifier("Age"), "`Age`");
}

#[test]
fn test_keyword_prefixed_column_names_behave_like_where_form() {
    for column in ["from_date", "select_count", "order_by", "limit_value"] {
        let peta = person("Peta", 18);
        let db = scripted(vec![vec![person_row(&peta)], vec![person_row(&peta)]]);

        let bare: Person = db.single(sql!(format!("{column} = @0"), 1)).unwrap();
        let bare_statement = db.executor().last_statement().unwrap();
        let prefixed: Person = db.single(sql!(format!("WHERE {column} = @0"), 1)).unwrap();
        let prefixed_statement = db.executor().last_statement().unwrap();

        assert_eq!(bare, prefixed);
        assert_eq!(bare_statement, prefixed_statement);
        assert!(bare_statement.sql.ends_with(&format!(r#"FROM "people" WHERE {column} = $1"#)));
    }
}
