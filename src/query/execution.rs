//! Cardinality rules shared by the blocking and async lookups.
//!
//! A lookup reads at most two raw rows (one for `first`, two for `single` so a
//! second match can be detected), closes the stream, then resolves the
//! outcome. Only the row reads differ between the blocking and async paths;
//! statement building and resolution are the same synchronous code.

use crate::error::{Result, TideError};
use crate::model::Record;
use crate::query::materialize::{materialize, materialize_with, ColumnMap};
use crate::row::{AsyncRowStream, Row, RowStream};
use sea_query::{Value, ValueType};

/// Which rows a lookup accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one row
    Single,
    /// Zero or one row
    SingleOrDefault,
    /// At least one row, first wins
    First,
    /// Any number of rows, first wins
    FirstOrDefault,
}

impl Cardinality {
    /// Rows to read before the outcome is decided.
    pub fn read_limit(self) -> usize {
        match self {
            Cardinality::Single | Cardinality::SingleOrDefault => 2,
            Cardinality::First | Cardinality::FirstOrDefault => 1,
        }
    }

    fn requires_row(self) -> bool {
        matches!(self, Cardinality::Single | Cardinality::First)
    }

    fn rejects_many(self) -> bool {
        matches!(self, Cardinality::Single | Cardinality::SingleOrDefault)
    }

    /// Apply the rule to the rows read. Only the first row is ever
    /// materialized, and only once the row count has been accepted.
    ///
    /// # Errors
    ///
    /// `TideError::NotFound` for no rows under `Single`/`First`,
    /// `TideError::MultipleResults` for two rows under `Single*`, and any
    /// mapping error from the record.
    pub fn resolve<T: Record>(self, rows: Vec<Row>) -> Result<Option<T>> {
        let table = T::descriptor().table_name();
        if rows.len() > 1 && self.rejects_many() {
            return Err(TideError::multiple_results(table));
        }
        match rows.first() {
            Some(row) => materialize::<T>(row).map(Some),
            None if self.requires_row() => Err(TideError::not_found(table)),
            None => Ok(None),
        }
    }
}

/// Read up to `limit` rows from a blocking stream.
///
/// # Errors
///
/// Backend fetch failures are returned unchanged.
pub fn read_rows(stream: &mut dyn RowStream, limit: usize) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    while rows.len() < limit {
        match stream.next_row()? {
            Some(row) => rows.push(row),
            None => break,
        }
    }
    Ok(rows)
}

/// Read up to `limit` rows from a suspend-capable stream.
///
/// # Errors
///
/// Backend fetch failures are returned unchanged.
pub async fn read_rows_async(stream: &mut dyn AsyncRowStream, limit: usize) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    while rows.len() < limit {
        match stream.next_row().await? {
            Some(row) => rows.push(row),
            None => break,
        }
    }
    Ok(rows)
}

/// Materialize every row of a result set, resolving the column map once.
///
/// # Errors
///
/// Returns the first mapping error encountered.
pub fn materialize_all<T: Record>(rows: &[Row]) -> Result<Vec<T>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let map = ColumnMap::resolve(T::descriptor(), first)?;
    rows.iter().map(|row| materialize_with(row, &map)).collect()
}

/// Interpret the single cell of an exists probe. A probe that returned no
/// row at all counts as "does not exist".
///
/// # Errors
///
/// Returns `TideError::Mapping` if the cell is neither boolean nor integer.
pub fn exists_flag(row: Option<Row>) -> Result<bool> {
    let Some(row) = row else {
        return Ok(false);
    };
    let cell = row
        .get(0)
        .cloned()
        .ok_or_else(|| TideError::Mapping("Exists probe returned an empty row".to_string()))?;
    truthy(cell)
}

fn truthy(cell: Value) -> Result<bool> {
    if let Ok(flag) = <bool as ValueType>::try_from(cell.clone()) {
        return Ok(flag);
    }
    if let Ok(n) = <i64 as ValueType>::try_from(cell.clone()) {
        return Ok(n != 0);
    }
    if let Ok(n) = <i32 as ValueType>::try_from(cell.clone()) {
        return Ok(n != 0);
    }
    if let Ok(n) = <i16 as ValueType>::try_from(cell.clone()) {
        return Ok(n != 0);
    }
    Err(TideError::Mapping(format!(
        "Exists probe returned {cell:?}, expected a boolean or integer"
    )))
}
