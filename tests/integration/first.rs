use crate::common::{broken_row, person, person_row, scripted, Person};
use tidepool::sql;

#[test]
fn test_first_returns_first_row_in_result_order() {
    let a = person("A", 18);
    let b = person("B", 18);
    let rows = vec![person_row(&a), person_row(&b)];
    let db = scripted(vec![rows.clone(), rows]);

    let found: Person = db.first(sql!("WHERE \"Age\" = @0", 18)).unwrap();
    assert_eq!(found, a);
    let maybe: Option<Person> = db.first_or_default(sql!("WHERE \"Age\" = @0", 18)).unwrap();
    assert_eq!(maybe, Some(a));
}

#[test]
fn test_first_zero_rows() {
    let db = scripted(vec![vec![], vec![]]);
    assert!(db.first::<Person>("\"Age\" = 99").unwrap_err().is_not_found());
    assert_eq!(db.first_or_default::<Person>("\"Age\" = 99").unwrap(), None);
}

#[test]
fn test_first_by_key() {
    let peta = person("Peta", 30);
    let db = scripted(vec![vec![person_row(&peta)], vec![]]);
    assert_eq!(db.first_by_key::<Person>(peta.id).unwrap(), peta);
    assert_eq!(db.first_or_default_by_key::<Person>(peta.id).unwrap(), None);
}

#[test]
fn test_first_stops_after_one_row() {
    let rows = vec![
        person_row(&person("A", 18)),
        broken_row(),
        person_row(&person("C", 18)),
    ];
    let db = scripted(vec![rows]);
    let found: Person = db.first("\"Age\" = 18").unwrap();
    assert_eq!(found.full_name, "A");
    assert_eq!(db.executor().rows_fetched(), 1);
}

#[test]
fn test_first_then_single_after_second_insert() {
    // One person aged 18, then a second one: first keeps working, single fails.
    let a = person("A", 18);
    let b = person("B", 18);
    let db = scripted(vec![
        vec![person_row(&a)],
        vec![person_row(&a), person_row(&b)],
        vec![person_row(&a), person_row(&b)],
    ]);

    assert_eq!(db.first::<Person>(sql!("WHERE \"Age\" = @0", 18)).unwrap(), a);
    assert_eq!(db.first::<Person>(sql!("WHERE \"Age\" = @0", 18)).unwrap(), a);
    assert!(db
        .single::<Person>(sql!("WHERE \"Age\" = @0", 18))
        .unwrap_err()
        .is_multiple_results());
}

#[test]
fn test_order_by_fragment_is_not_wrapped_in_where() {
    let db = scripted(vec![vec![person_row(&person("A", 18))]]);
    let _: Person = db.first("ORDER BY \"Age\" DESC").unwrap();
    assert!(db
        .executor()
        .last_statement()
        .unwrap()
        .sql
        .ends_with(r#"FROM "people" ORDER BY "Age" DESC"#));
}

#[test]
fn test_fetch_returns_every_row() {
    let rows = vec![person_row(&person("A", 1)), person_row(&person("B", 2))];
    let db = scripted(vec![rows]);
    let people: Vec<Person> = db.fetch("").unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[1].full_name, "B");
}
