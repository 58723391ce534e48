//! Error type shared by every tidepool operation.
//!
//! Cardinality failures (`NotFound`, `MultipleResults`) are distinct variants so
//! callers can match on them without string inspection. Backend failures are
//! carried through untouched.

use may_postgres::Error as PostgresError;
use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TideError>;

/// tidepool error type
#[derive(Debug)]
pub enum TideError {
    /// The statement returned no rows where at least one was required
    NotFound {
        /// Table the lookup ran against
        table: String,
    },
    /// The statement returned more than one row where at most one was allowed
    MultipleResults {
        /// Table the lookup ran against
        table: String,
    },
    /// Mapping configuration defect: missing primary key, unmapped column,
    /// unconvertible cell or an unresolvable placeholder
    Mapping(String),
    /// `PostgreSQL` error from `may_postgres`
    PostgresError(PostgresError),
    /// Backend execution error from a non-Postgres executor
    QueryError(String),
    /// Parameter or value conversion error
    ParseError(String),
    /// Other execution errors
    Other(String),
}

impl TideError {
    pub(crate) fn not_found(table: &str) -> Self {
        TideError::NotFound {
            table: table.to_string(),
        }
    }

    pub(crate) fn multiple_results(table: &str) -> Self {
        TideError::MultipleResults {
            table: table.to_string(),
        }
    }

    /// `true` for the zero-rows failure of `single`/`first`
    pub fn is_not_found(&self) -> bool {
        matches!(self, TideError::NotFound { .. })
    }

    /// `true` for the more-than-one-row failure of `single`/`single_or_default`
    pub fn is_multiple_results(&self) -> bool {
        matches!(self, TideError::MultipleResults { .. })
    }

    /// `true` for configuration defects
    pub fn is_mapping(&self) -> bool {
        matches!(self, TideError::Mapping(_))
    }

    /// `true` when the failure came from the underlying backend
    pub fn is_backend(&self) -> bool {
        matches!(self, TideError::PostgresError(_) | TideError::QueryError(_))
    }
}

impl fmt::Display for TideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TideError::NotFound { table } => {
                write!(f, "Sequence contains no elements: no row found in {table}")
            }
            TideError::MultipleResults { table } => {
                write!(f, "Sequence contains more than one element: multiple rows found in {table}")
            }
            TideError::Mapping(s) => {
                write!(f, "Mapping error: {s}")
            }
            TideError::PostgresError(e) => {
                write!(f, "PostgreSQL error: {e}")
            }
            TideError::QueryError(s) => {
                write!(f, "Query error: {s}")
            }
            TideError::ParseError(s) => {
                write!(f, "Parse error: {s}")
            }
            TideError::Other(s) => {
                write!(f, "Execution error: {s}")
            }
        }
    }
}

impl std::error::Error for TideError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TideError::PostgresError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for TideError {
    fn from(err: PostgresError) -> Self {
        TideError::PostgresError(err)
    }
}
