//! Conversion of sea-query values into `may_postgres` parameters.
//!
//! Every value is boxed into an owned `ToSql` so the parameter slice borrows
//! from storage that lives for the whole call. NULLs keep their column type
//! (`Option<i32>`, `Option<String>`, ...) so the server sees a typed NULL.

use crate::error::{Result, TideError};
use may_postgres::types::ToSql;
use sea_query::Value;

type Param = Box<dyn ToSql + Sync>;

fn boxed<T: ToSql + Sync + 'static>(value: T) -> Param {
    Box::new(value)
}

fn widen_big_unsigned(value: Option<u64>) -> Result<Option<i64>> {
    value
        .map(|u| {
            i64::try_from(u).map_err(|_| {
                TideError::ParseError(format!(
                    "BigUnsigned value {u} exceeds i64::MAX ({}), cannot be bound",
                    i64::MAX
                ))
            })
        })
        .transpose()
}

/// Convert one value into an owned parameter.
///
/// # Errors
///
/// Returns `TideError::ParseError` for values PostgreSQL has no matching type
/// for, or for unsigned values that do not fit `BIGINT`.
pub fn to_param(value: &Value) -> Result<Param> {
    let param = match value {
        Value::Bool(v) => boxed(*v),
        Value::TinyInt(v) => boxed(v.map(i16::from)),
        Value::SmallInt(v) => boxed(*v),
        Value::Int(v) => boxed(*v),
        Value::BigInt(v) => boxed(*v),
        Value::TinyUnsigned(v) => boxed(v.map(i16::from)),
        Value::SmallUnsigned(v) => boxed(v.map(i32::from)),
        Value::Unsigned(v) => boxed(v.map(i64::from)),
        Value::BigUnsigned(v) => boxed(widen_big_unsigned(*v)?),
        Value::Float(v) => boxed(*v),
        Value::Double(v) => boxed(*v),
        Value::Decimal(v) => boxed(v.as_ref().map(|d| rust_decimal::Decimal::clone(d))),
        Value::Char(v) => boxed(v.map(|c| c.to_string())),
        Value::String(v) => boxed(v.as_ref().map(|s| String::clone(s))),
        Value::Bytes(v) => boxed(v.as_ref().map(|b| Vec::<u8>::clone(b))),
        Value::Json(v) => boxed(v.as_ref().map(|j| serde_json::Value::clone(j))),
        Value::Uuid(v) => boxed(v.as_ref().map(|u| uuid::Uuid::clone(u))),
        Value::ChronoDate(v) => boxed(v.as_ref().map(|d| chrono::NaiveDate::clone(d))),
        Value::ChronoTime(v) => boxed(v.as_ref().map(|t| chrono::NaiveTime::clone(t))),
        Value::ChronoDateTime(v) => boxed(v.as_ref().map(|t| chrono::NaiveDateTime::clone(t))),
        Value::ChronoDateTimeUtc(v) => {
            boxed(v.as_ref().map(|t| chrono::DateTime::<chrono::Utc>::clone(t)))
        }
        Value::ChronoDateTimeWithTimeZone(v) => {
            boxed(v.as_ref().map(|t| chrono::DateTime::<chrono::FixedOffset>::clone(t)))
        }
        other => {
            return Err(TideError::ParseError(format!(
                "Unsupported value type in query: {other:?}"
            )))
        }
    };
    Ok(param)
}

/// Convert `values` and run `f` with the borrowed parameter slice.
///
/// # Errors
///
/// Conversion failures are returned before `f` runs; otherwise `f`'s result.
pub fn with_converted_params<F, R>(values: &[Value], f: F) -> Result<R>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R>,
{
    let owned = values.iter().map(to_param).collect::<Result<Vec<_>>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(|p| &**p as &dyn ToSql).collect();
    f(&params)
}
