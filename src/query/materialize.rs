//! Row materializer: applies a record descriptor to raw rows.
//!
//! The column map is resolved once per result set. Every regular descriptor
//! column must be present; result-only columns and columns the descriptor
//! does not know about are tolerated.

use crate::error::{Result, TideError};
use crate::model::{Record, TableDescriptor};
use crate::row::Row;
use sea_query::{Value, ValueType};

/// Descriptor columns resolved to positions in one result set
#[derive(Debug, Clone)]
pub struct ColumnMap {
    descriptor: &'static TableDescriptor,
    positions: Vec<Option<usize>>,
}

impl ColumnMap {
    /// Resolve `descriptor` against the columns of `row`.
    ///
    /// # Errors
    ///
    /// Returns `TideError::Mapping` naming the first required column the
    /// result set does not contain.
    pub fn resolve(descriptor: &'static TableDescriptor, row: &Row) -> Result<Self> {
        let mut positions = Vec::with_capacity(descriptor.columns().len());
        for column in descriptor.columns() {
            let position = row.index_of(column.column());
            if position.is_none() && !column.is_result_only() {
                return Err(TideError::Mapping(format!(
                    "Column {} (field {}) of {} is missing from the result set",
                    column.column(),
                    column.field(),
                    descriptor.table_name()
                )));
            }
            positions.push(position);
        }
        Ok(Self {
            descriptor,
            positions,
        })
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.descriptor
            .columns()
            .iter()
            .position(|c| c.column().eq_ignore_ascii_case(column))
            .and_then(|i| self.positions[i])
    }
}

/// One row seen through its record's column map
#[derive(Debug)]
pub struct MappedRow<'a> {
    row: &'a Row,
    map: &'a ColumnMap,
}

impl<'a> MappedRow<'a> {
    pub fn new(row: &'a Row, map: &'a ColumnMap) -> Self {
        Self { row, map }
    }

    /// Raw cell for `column`, `None` when the result set does not carry it.
    pub fn value(&self, column: &str) -> Option<&'a Value> {
        let index = self
            .map
            .position(column)
            .or_else(|| self.row.index_of(column))?;
        self.row.get(index)
    }

    /// Typed cell for `column`.
    ///
    /// # Errors
    ///
    /// Returns `TideError::Mapping` if the column is absent or its value does
    /// not convert to `T`. Use `Option<T>` for nullable columns.
    pub fn get<T: ValueType>(&self, column: &str) -> Result<T> {
        let value = self.value(column).ok_or_else(|| {
            TideError::Mapping(format!(
                "Column {column} is not present in the result for {}",
                self.map.descriptor.table_name()
            ))
        })?;
        convert(column, value)
    }

    /// Typed cell for a column that may be absent (result-only columns).
    ///
    /// # Errors
    ///
    /// Returns `TideError::Mapping` if the column is present but does not
    /// convert to `T`.
    pub fn get_if_present<T: ValueType>(&self, column: &str) -> Result<Option<T>> {
        self.value(column)
            .map(|value| convert(column, value))
            .transpose()
    }
}

fn convert<T: ValueType>(column: &str, value: &Value) -> Result<T> {
    <T as ValueType>::try_from(value.clone()).map_err(|_| {
        TideError::Mapping(format!(
            "Column {column} holds {value:?}, which does not convert to {}",
            std::any::type_name::<T>()
        ))
    })
}

/// Materialize one row with a map resolved for its result set.
///
/// # Errors
///
/// Propagates conversion failures from the record's `from_row`.
pub fn materialize_with<T: Record>(row: &Row, map: &ColumnMap) -> Result<T> {
    T::from_row(&MappedRow::new(row, map))
}

/// Materialize a single row into `T`.
///
/// # Errors
///
/// Returns `TideError::Mapping` if a required column is missing or a cell
/// does not convert.
pub fn materialize<T: Record>(row: &Row) -> Result<T> {
    let map = ColumnMap::resolve(T::descriptor(), row)?;
    materialize_with(row, &map)
}
