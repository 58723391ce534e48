//! PostgreSQL backend over `may_postgres`.
//!
//! [`MayPostgresExecutor`] runs statements on the calling coroutine or thread.
//! [`PostgresWorker`] owns its connections on dedicated threads and serves
//! async callers without blocking their runtime.
//!
//! `may_postgres` hands a result set over in one piece. Rows are decoded
//! lazily as the stream is pulled, so a `first` lookup decodes one row and a
//! `single` lookup at most two; closing the stream drops the rest undecoded.

mod decode;
pub mod value_conversion;
mod worker;

pub use worker::PostgresWorker;

use crate::dialect::DbBackend;
use crate::error::{Result, TideError};
use crate::executor::{Dialect, TideExecutor};
use crate::query::Statement;
use crate::row::{AsyncRowStream, Close, Row, RowStream};
use async_trait::async_trait;
use may_postgres::Client;
use std::sync::Arc;
use value_conversion::with_converted_params;

/// Blocking executor over one `may_postgres::Client`
pub struct MayPostgresExecutor {
    client: Client,
}

impl MayPostgresExecutor {
    /// Create a new executor from a `may_postgres::Client`
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Consume the executor and return the underlying client
    pub fn into_client(self) -> Client {
        self.client
    }

    /// Check that the connection still answers `SELECT 1`.
    ///
    /// # Errors
    ///
    /// Returns `TideError::Other` if the health check itself fails.
    pub fn check_health(&self) -> Result<bool> {
        crate::connection::check_connection_health(&self.client)
            .map_err(|e| TideError::Other(format!("Health check error: {e}")))
    }

    /// Run `statement` and return its raw rows.
    fn query_raw(&self, statement: &Statement) -> Result<Vec<may_postgres::Row>> {
        if statement.backend != DbBackend::Postgres {
            return Err(TideError::QueryError(format!(
                "statement was built for {} but the executor is PostgreSQL",
                statement.backend
            )));
        }
        with_converted_params(&statement.values, |params| {
            self.client
                .query(statement.sql.as_str(), params)
                .map_err(TideError::PostgresError)
        })
    }
}

impl Dialect for MayPostgresExecutor {
    fn backend(&self) -> DbBackend {
        DbBackend::Postgres
    }
}

impl TideExecutor for MayPostgresExecutor {
    fn query_stream(&self, statement: &Statement) -> Result<Box<dyn RowStream + '_>> {
        Ok(Box::new(PgRowStream::new(self.query_raw(statement)?)))
    }
}

/// Stream over a fetched result set that decodes rows on demand
pub(crate) struct PgRowStream {
    columns: Option<Arc<[String]>>,
    rows: std::vec::IntoIter<may_postgres::Row>,
}

impl PgRowStream {
    pub(crate) fn new(rows: Vec<may_postgres::Row>) -> Self {
        Self {
            columns: None,
            rows: rows.into_iter(),
        }
    }

    fn decode_next(&mut self) -> Result<Option<Row>> {
        let Some(raw) = self.rows.next() else {
            return Ok(None);
        };
        let columns = self
            .columns
            .get_or_insert_with(|| decode::column_names(&raw));
        decode::decode_row(&raw, columns).map(Some)
    }
}

impl Close for PgRowStream {
    fn close(&mut self) {
        self.rows = Vec::new().into_iter();
    }
}

impl RowStream for PgRowStream {
    fn next_row(&mut self) -> Result<Option<Row>> {
        self.decode_next()
    }
}

#[async_trait]
impl AsyncRowStream for PgRowStream {
    async fn next_row(&mut self) -> Result<Option<Row>> {
        self.decode_next()
    }
}
