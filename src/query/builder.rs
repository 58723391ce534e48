//! Statement builder: turns a record descriptor and a [`Predicate`] into an
//! executable statement.
//!
//! Key lookups are rendered through sea-query. Fragments and templates go
//! through the positional-parameter binder after a light prefix check:
//!
//! - text starting with `SELECT` is used as is,
//! - text starting with `FROM` gets the column list prepended,
//! - text starting with a clause keyword (`WHERE`, `ORDER BY`, `GROUP BY`,
//!   `HAVING`, `LIMIT`, `OFFSET`, joins, `UNION`) is appended to
//!   `SELECT <columns> FROM <table>`,
//! - anything else is treated as the body of a `WHERE` clause, so
//!   `"Age = @0"` and `"WHERE Age = @0"` build the same statement.
//!
//! This is a keyword check on the leading words only, not a SQL parser.

use crate::dialect::DbBackend;
use crate::error::{Result, TideError};
use crate::model::TableDescriptor;
use crate::params;
use crate::query::predicate::Predicate;
use crate::sql::Sql;
use sea_query::{Expr, ExprTrait, Iden, Query, SelectStatement, Value};

/// Executable SQL: native placeholders plus values in binding order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<Value>,
    pub backend: DbBackend,
}

impl Statement {
    pub fn new(sql: impl Into<String>, values: Vec<Value>, backend: DbBackend) -> Self {
        Self {
            sql: sql.into(),
            values,
            backend,
        }
    }
}

/// How a fragment begins, decided from its leading words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Empty,
    Select,
    From,
    Clause,
    Condition,
}

const SINGLE_WORD_CLAUSES: &[&str] = &["WHERE", "HAVING", "LIMIT", "OFFSET", "JOIN", "UNION"];
const JOIN_QUALIFIERS: &[&str] = &["INNER", "LEFT", "RIGHT", "FULL", "CROSS", "NATURAL"];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The first identifier-like token and, when only whitespace follows it, the
/// second. Both upper-cased; `from_date` is one token, never `FROM`.
fn leading_words(text: &str) -> (String, String) {
    let word_len = |s: &str| s.find(|c: char| !is_word_char(c)).unwrap_or(s.len());
    let (first, rest) = text.split_at(word_len(text));
    let after = rest.trim_start();
    let second = if after.len() < rest.len() {
        &after[..word_len(after)]
    } else {
        ""
    };
    (first.to_ascii_uppercase(), second.to_ascii_uppercase())
}

fn shape(text: &str) -> Shape {
    let text = text.trim_start();
    if text.is_empty() {
        return Shape::Empty;
    }
    // Only words at the very start count; "(Age = 1)" is a condition.
    if !text.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Shape::Condition;
    }
    let (first, second) = leading_words(text);
    match first.as_str() {
        "SELECT" => Shape::Select,
        "FROM" => Shape::From,
        "ORDER" | "GROUP" if second == "BY" => Shape::Clause,
        w if SINGLE_WORD_CLAUSES.contains(&w) => Shape::Clause,
        w if JOIN_QUALIFIERS.contains(&w) && (second == "JOIN" || second == "OUTER") => Shape::Clause,
        _ => Shape::Condition,
    }
}

/// Column list for a generated select, escaped for `backend`.
fn column_list(descriptor: &TableDescriptor, backend: DbBackend) -> String {
    let columns: Vec<String> = descriptor
        .select_columns()
        .map(|c| backend.escape_identifier(c.column()))
        .collect();
    if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    }
}

/// Complete the template's text into a full select, or an exists probe body
/// when `projection` is `"1"`.
fn complete(text: &str, shape: Shape, projection: &str, table: &str) -> String {
    let text = text.trim();
    match shape {
        Shape::Empty => format!("SELECT {projection} FROM {table}"),
        Shape::Select => text.to_string(),
        Shape::From => format!("SELECT {projection} {text}"),
        Shape::Clause => format!("SELECT {projection} FROM {table} {text}"),
        Shape::Condition => format!("SELECT {projection} FROM {table} WHERE {text}"),
    }
}

fn into_template(predicate: Predicate) -> Option<Sql> {
    match predicate {
        Predicate::Key(_) => None,
        Predicate::Fragment { text, args } => Some(Sql::new(text, args)),
        Predicate::Template(sql) => Some(sql),
    }
}

struct Name(&'static str);

impl Iden for Name {
    fn unquoted(&self) -> &str {
        self.0
    }
}

/// sea-query select over the descriptor's table filtered on its primary key.
fn key_select(descriptor: &TableDescriptor, keys: Vec<Value>) -> Result<SelectStatement> {
    let primary_key = descriptor.require_primary_key()?;
    if primary_key.len() != keys.len() {
        return Err(TideError::Mapping(format!(
            "{} has {} primary key column(s) but {} key value(s) were supplied",
            descriptor.table_name(),
            primary_key.len(),
            keys.len()
        )));
    }

    let mut select = Query::select();
    match descriptor.table_name().split_once('.') {
        Some((schema, table)) => select.from((Name(schema), Name(table))),
        None => select.from(Name(descriptor.table_name())),
    };
    for (column, key) in primary_key.iter().copied().zip(keys) {
        select.and_where(Expr::col(Name(column)).eq(key));
    }
    Ok(select)
}

/// Build the `SELECT` for a record lookup.
///
/// # Errors
///
/// Returns `TideError::Mapping` for a key lookup on a type without a primary
/// key, a key of the wrong arity, or a fragment marker with no argument.
pub fn build_select(
    descriptor: &TableDescriptor,
    predicate: Predicate,
    backend: DbBackend,
) -> Result<Statement> {
    if let Predicate::Key(keys) = predicate {
        let mut select = key_select(descriptor, keys)?;
        let columns: Vec<Name> = descriptor.select_columns().map(|c| Name(c.column())).collect();
        if columns.is_empty() {
            select.column(sea_query::Asterisk);
        } else {
            select.columns(columns);
        }
        let (sql, values) = backend.build_select(&select);
        return Ok(Statement::new(sql, values.0, backend));
    }

    let template = into_template(predicate).unwrap_or_default();
    let (text, args) = template.into_parts();
    let table = backend.escape_table_name(descriptor.table_name());
    let sql = complete(&text, shape(&text), &column_list(descriptor, backend), &table);
    let (sql, values) = params::bind(&sql, &args, backend, 0)?;
    Ok(Statement::new(sql, values, backend))
}

/// Build the existence probe: `SELECT EXISTS (SELECT 1 FROM <table> ...)`.
/// The probe returns one row with one boolean-ish cell.
///
/// # Errors
///
/// Same conditions as [`build_select`].
pub fn build_exists(
    descriptor: &TableDescriptor,
    predicate: Predicate,
    backend: DbBackend,
) -> Result<Statement> {
    let (inner, values) = match predicate {
        Predicate::Key(keys) => {
            let mut select = key_select(descriptor, keys)?;
            select.expr(Expr::cust("1"));
            let (sql, values) = backend.build_select(&select);
            (sql, values.0)
        }
        other => {
            let (text, args) = into_template(other).unwrap_or_default().into_parts();
            let table = backend.escape_table_name(descriptor.table_name());
            let sql = complete(&text, shape(&text), "1", &table);
            params::bind(&sql, &args, backend, 0)?
        }
    };
    Ok(Statement::new(format!("SELECT EXISTS ({inner})"), values, backend))
}
