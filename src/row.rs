//! Backend-neutral rows and the streams that yield them.
//!
//! Streams are pulled one row at a time so callers can stop early; every
//! stream is closed exactly once through [`StreamGuard`], whichever way the
//! caller leaves.

use crate::error::Result;
use async_trait::async_trait;
use sea_query::Value;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// One result row: shared column names plus the cell values in column order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of `name` in the row, ignoring ASCII case.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// Release of a row source. Must be safe to call on an exhausted stream.
pub trait Close {
    fn close(&mut self);
}

/// Blocking row source
pub trait RowStream: Close {
    /// Fetch the next row, `Ok(None)` once the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Backend failures while fetching are returned unchanged.
    fn next_row(&mut self) -> Result<Option<Row>>;
}

/// Suspend-capable row source. Only the fetch suspends; closing is immediate.
#[async_trait]
pub trait AsyncRowStream: Close + Send {
    /// Fetch the next row, `Ok(None)` once the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Backend failures while fetching are returned unchanged.
    async fn next_row(&mut self) -> Result<Option<Row>>;
}

/// Owns a stream and closes it on drop, so early returns and `?` exits
/// release the backend handle the same way a full drain does.
pub struct StreamGuard<S: Close + ?Sized> {
    stream: Box<S>,
}

impl<S: Close + ?Sized> StreamGuard<S> {
    pub fn new(stream: Box<S>) -> Self {
        Self { stream }
    }
}

impl<S: Close + ?Sized> Deref for StreamGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.stream
    }
}

impl<S: Close + ?Sized> DerefMut for StreamGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: Close + ?Sized> Drop for StreamGuard<S> {
    fn drop(&mut self) {
        self.stream.close();
    }
}

/// Stream over rows that are already in memory. Rows are handed out in order
/// and anything left unread is dropped on close.
#[derive(Debug, Default)]
pub struct VecRowStream {
    rows: std::vec::IntoIter<Row>,
}

impl VecRowStream {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Close for VecRowStream {
    fn close(&mut self) {
        self.rows = Vec::new().into_iter();
    }
}

impl RowStream for VecRowStream {
    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.next())
    }
}

#[async_trait]
impl AsyncRowStream for VecRowStream {
    async fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.next())
    }
}
