//! Decoding of `may_postgres` rows into backend-neutral [`Row`]s.
//!
//! Cells are decoded by the column's PostgreSQL type name. NULL cells become
//! the typed `None` of the matching sea-query variant.

use crate::error::{Result, TideError};
use crate::row::Row;
use may_postgres::types::FromSql;
use sea_query::Value;
use std::sync::Arc;

/// Column names of a result set, shared by all its rows.
pub fn column_names(row: &may_postgres::Row) -> Arc<[String]> {
    row.columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect::<Vec<_>>()
        .into()
}

fn cell<'a, T>(row: &'a may_postgres::Row, index: usize) -> Result<Option<T>>
where
    T: FromSql<'a>,
{
    row.try_get::<_, Option<T>>(index).map_err(|e| {
        TideError::ParseError(format!(
            "Failed to decode column {} ({}): {e}",
            row.columns()[index].name(),
            row.columns()[index].type_().name()
        ))
    })
}

fn decode_cell(row: &may_postgres::Row, index: usize) -> Result<Value> {
    let type_name = row.columns()[index].type_().name();
    let value = match type_name {
        "bool" => Value::Bool(cell(row, index)?),
        "char" => Value::TinyInt(cell(row, index)?),
        "int2" => Value::SmallInt(cell(row, index)?),
        "int4" => Value::Int(cell(row, index)?),
        "int8" => Value::BigInt(cell(row, index)?),
        "oid" => Value::Unsigned(cell(row, index)?),
        "float4" => Value::Float(cell(row, index)?),
        "float8" => Value::Double(cell(row, index)?),
        "numeric" => Value::from(cell::<rust_decimal::Decimal>(row, index)?),
        "text" | "varchar" | "bpchar" | "name" | "citext" | "unknown" => {
            Value::from(cell::<String>(row, index)?)
        }
        "bytea" => Value::from(cell::<Vec<u8>>(row, index)?),
        "uuid" => Value::from(cell::<uuid::Uuid>(row, index)?),
        "json" | "jsonb" => Value::from(cell::<serde_json::Value>(row, index)?),
        "date" => Value::from(cell::<chrono::NaiveDate>(row, index)?),
        "time" => Value::from(cell::<chrono::NaiveTime>(row, index)?),
        "timestamp" => Value::from(cell::<chrono::NaiveDateTime>(row, index)?),
        "timestamptz" => Value::from(cell::<chrono::DateTime<chrono::Utc>>(row, index)?),
        other => {
            return Err(TideError::ParseError(format!(
                "Column {} has unsupported type {other}",
                row.columns()[index].name()
            )))
        }
    };
    Ok(value)
}

/// Decode every cell of `row`.
///
/// # Errors
///
/// Returns `TideError::ParseError` for a cell of an unsupported type or one
/// that fails to decode.
pub fn decode_row(row: &may_postgres::Row, columns: &Arc<[String]>) -> Result<Row> {
    let values = (0..row.len())
        .map(|index| decode_cell(row, index))
        .collect::<Result<Vec<_>>>()?;
    Ok(Row::new(Arc::clone(columns), values))
}
