//! Scripted in-process backend.
//!
//! Each statement consumes the next scripted result in order. The executor
//! records every statement it receives and counts streams opened, streams
//! closed and rows handed out, so tests can check that lookups stop reading
//! early and always release their stream.
//!
//! ```
//! use tidepool::mock::{self, MockExecutor};
//! use tidepool::{DbBackend, sea_query::Value};
//!
//! let executor = MockExecutor::new(DbBackend::Postgres)
//!     .append_query_results([vec![mock::row([("Id", Value::from(1))])]])
//!     .append_query_error("connection reset");
//! assert_eq!(executor.remaining(), 2);
//! ```

use crate::dialect::DbBackend;
use crate::error::{Result, TideError};
use crate::executor::{AsyncTideExecutor, Dialect, TideExecutor};
use crate::query::Statement;
use crate::row::{AsyncRowStream, Close, Row, RowStream};
use async_trait::async_trait;
use sea_query::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Scripted {
    Rows {
        rows: Vec<Row>,
        fail_after: Option<usize>,
    },
    Error(String),
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    fetched: AtomicUsize,
}

/// Executor that replays scripted result sets
#[derive(Debug)]
pub struct MockExecutor {
    backend: DbBackend,
    script: Mutex<VecDeque<Scripted>>,
    statements: Mutex<Vec<Statement>>,
    counters: Arc<Counters>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockExecutor {
    pub fn new(backend: DbBackend) -> Self {
        Self {
            backend,
            script: Mutex::new(VecDeque::new()),
            statements: Mutex::new(Vec::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Queue one result set per item; each statement consumes the next.
    pub fn append_query_results<I>(self, results: I) -> Self
    where
        I: IntoIterator<Item = Vec<Row>>,
    {
        lock(&self.script).extend(results.into_iter().map(|rows| Scripted::Rows {
            rows,
            fail_after: None,
        }));
        self
    }

    /// Queue a submission failure, surfaced as `TideError::QueryError`.
    pub fn append_query_error(self, message: impl Into<String>) -> Self {
        lock(&self.script).push_back(Scripted::Error(message.into()));
        self
    }

    /// Queue a result set whose fetch fails once `fail_after` rows were read.
    pub fn append_failing_stream(self, rows: Vec<Row>, fail_after: usize) -> Self {
        lock(&self.script).push_back(Scripted::Rows {
            rows,
            fail_after: Some(fail_after),
        });
        self
    }

    /// Statements received so far, in order.
    pub fn statements(&self) -> Vec<Statement> {
        lock(&self.statements).clone()
    }

    pub fn last_statement(&self) -> Option<Statement> {
        lock(&self.statements).last().cloned()
    }

    /// Scripted results not consumed yet.
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }

    pub fn streams_opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn streams_closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Rows handed to callers across all streams.
    pub fn rows_fetched(&self) -> usize {
        self.counters.fetched.load(Ordering::SeqCst)
    }

    fn open(&self, statement: &Statement) -> Result<MockStream> {
        lock(&self.statements).push(statement.clone());
        let next = lock(&self.script).pop_front();
        match next {
            Some(Scripted::Rows { rows, fail_after }) => {
                self.counters.opened.fetch_add(1, Ordering::SeqCst);
                Ok(MockStream {
                    rows: rows.into_iter(),
                    fail_after,
                    read: 0,
                    closed: false,
                    counters: Arc::clone(&self.counters),
                })
            }
            Some(Scripted::Error(message)) => Err(TideError::QueryError(message)),
            None => Err(TideError::QueryError(format!(
                "no scripted result left for: {}",
                statement.sql
            ))),
        }
    }
}

struct MockStream {
    rows: std::vec::IntoIter<Row>,
    fail_after: Option<usize>,
    read: usize,
    closed: bool,
    counters: Arc<Counters>,
}

impl MockStream {
    fn fetch(&mut self) -> Result<Option<Row>> {
        if self.closed {
            return Ok(None);
        }
        if self.fail_after == Some(self.read) {
            return Err(TideError::QueryError(format!(
                "stream failed after {} row(s)",
                self.read
            )));
        }
        let row = self.rows.next();
        if row.is_some() {
            self.read += 1;
            self.counters.fetched.fetch_add(1, Ordering::SeqCst);
        }
        Ok(row)
    }
}

impl Close for MockStream {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl RowStream for MockStream {
    fn next_row(&mut self) -> Result<Option<Row>> {
        self.fetch()
    }
}

#[async_trait]
impl AsyncRowStream for MockStream {
    async fn next_row(&mut self) -> Result<Option<Row>> {
        self.fetch()
    }
}

impl Dialect for MockExecutor {
    fn backend(&self) -> DbBackend {
        self.backend
    }
}

impl TideExecutor for MockExecutor {
    fn query_stream(&self, statement: &Statement) -> Result<Box<dyn RowStream + '_>> {
        Ok(Box::new(self.open(statement)?))
    }
}

#[async_trait]
impl AsyncTideExecutor for MockExecutor {
    async fn query_stream(&self, statement: &Statement) -> Result<Box<dyn AsyncRowStream + '_>> {
        Ok(Box::new(self.open(statement)?))
    }
}

/// Build a row from `(column, value)` pairs.
pub fn row<I, S>(cells: I) -> Row
where
    I: IntoIterator<Item = (S, Value)>,
    S: Into<String>,
{
    let (columns, values): (Vec<String>, Vec<Value>) =
        cells.into_iter().map(|(c, v)| (c.into(), v)).unzip();
    Row::new(Arc::from(columns), values)
}

/// The single-cell row an exists probe returns.
pub fn exists_row(found: bool) -> Row {
    row([("exists", Value::from(found))])
}
