//! Record type descriptors and the `Record` trait.
//!
//! A descriptor is built once per mapped type, normally as a `static`, and is
//! only ever read afterwards, so it can be shared across threads and coroutines
//! without synchronisation.
//!
//! ```
//! use tidepool::{ColumnDescriptor, MappedRow, Record, TableDescriptor};
//!
//! static PERSON: TableDescriptor = TableDescriptor::new(
//!     "people",
//!     &["Id"],
//!     &[
//!         ColumnDescriptor::new("Id", "id"),
//!         ColumnDescriptor::new("Name", "name"),
//!     ],
//! );
//!
//! struct Person {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Record for Person {
//!     fn descriptor() -> &'static TableDescriptor {
//!         &PERSON
//!     }
//!
//!     fn from_row(row: &MappedRow<'_>) -> tidepool::Result<Self> {
//!         Ok(Person {
//!             id: row.get("Id")?,
//!             name: row.get("Name")?,
//!         })
//!     }
//! }
//! ```

use crate::error::{Result, TideError};
use crate::query::materialize::MappedRow;

/// Column-to-field association for one mapped column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    column: &'static str,
    field: &'static str,
    result_only: bool,
}

impl ColumnDescriptor {
    /// Regular column: selected automatically and required in every result set.
    pub const fn new(column: &'static str, field: &'static str) -> Self {
        Self {
            column,
            field,
            result_only: false,
        }
    }

    /// Result-only column: never part of the generated column list and mapped
    /// only when a hand-written query happens to return it.
    pub const fn result_only(column: &'static str, field: &'static str) -> Self {
        Self {
            column,
            field,
            result_only: true,
        }
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn is_result_only(&self) -> bool {
        self.result_only
    }
}

/// Per-type mapping metadata: table, primary key column(s) and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    table_name: &'static str,
    primary_key: &'static [&'static str],
    columns: &'static [ColumnDescriptor],
}

impl TableDescriptor {
    pub const fn new(
        table_name: &'static str,
        primary_key: &'static [&'static str],
        columns: &'static [ColumnDescriptor],
    ) -> Self {
        Self {
            table_name,
            primary_key,
            columns,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.table_name
    }

    /// Primary key columns, in declaration order. Empty when the type has no key.
    pub fn primary_key(&self) -> &'static [&'static str] {
        self.primary_key
    }

    /// Primary key columns, or a mapping error when none are declared.
    pub fn require_primary_key(&self) -> Result<&'static [&'static str]> {
        if self.primary_key.is_empty() {
            return Err(TideError::Mapping(format!(
                "Type mapped to {} has no primary key",
                self.table_name
            )));
        }
        Ok(self.primary_key)
    }

    pub fn columns(&self) -> &'static [ColumnDescriptor] {
        self.columns
    }

    /// Columns that belong in a generated `SELECT` list.
    pub fn select_columns(&self) -> impl Iterator<Item = &'static ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.result_only)
    }

    /// Look up a column by name, ignoring ASCII case.
    pub fn column(&self, name: &str) -> Option<&'static ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.column.eq_ignore_ascii_case(name))
    }
}

/// A type that can be loaded from a result row.
///
/// Implementations supply the static descriptor and read their fields out of a
/// [`MappedRow`], which has already checked that every required column is
/// present.
pub trait Record: Sized {
    /// Mapping metadata for this type
    fn descriptor() -> &'static TableDescriptor;

    /// Build a record from one mapped row
    ///
    /// # Errors
    ///
    /// Returns `TideError::Mapping` if a cell cannot be converted to the field
    /// type.
    fn from_row(row: &MappedRow<'_>) -> Result<Self>;
}
