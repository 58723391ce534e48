//! Async executor backed by connection-owning worker threads.
//!
//! Each worker thread owns one `may_postgres` connection and pulls jobs from
//! a shared queue. An async caller enqueues its statement and awaits the reply
//! on a oneshot channel, so its runtime thread never blocks on the socket.

use super::{MayPostgresExecutor, PgRowStream};
use crate::config::DatabaseConfig;
use crate::connection::connect;
use crate::dialect::DbBackend;
use crate::error::{Result, TideError};
use crate::executor::{AsyncTideExecutor, Dialect};
use crate::query::Statement;
use crate::row::AsyncRowStream;
use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, Sender};
use may_postgres::Client;
use std::thread::JoinHandle;
use tokio::sync::oneshot;

struct Job {
    statement: Statement,
    reply: oneshot::Sender<Result<Vec<may_postgres::Row>>>,
}

/// Pool of worker threads serving [`AsyncTideExecutor`] callers
pub struct PostgresWorker {
    sender: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

fn run_worker_loop(rx: Receiver<Job>, executor: MayPostgresExecutor) {
    while let Ok(job) = rx.recv() {
        let result = executor.query_raw(&job.statement);
        if job.reply.send(result).is_err() {
            log::debug!("caller went away before its statement finished");
        }
    }
}

impl PostgresWorker {
    /// One worker over one connection.
    ///
    /// # Errors
    ///
    /// Returns `TideError::Other` if the worker thread cannot be spawned.
    pub fn spawn(client: Client) -> Result<Self> {
        Self::spawn_many(vec![client])
    }

    /// One worker per connection, all serving the same queue.
    ///
    /// # Errors
    ///
    /// Returns `TideError::Other` if `clients` is empty or a thread cannot be
    /// spawned.
    pub fn spawn_many(clients: Vec<Client>) -> Result<Self> {
        if clients.is_empty() {
            return Err(TideError::Other(
                "PostgresWorker needs at least one connection".to_string(),
            ));
        }
        let (sender, receiver) = unbounded();
        let mut handles = Vec::with_capacity(clients.len());
        for (n, client) in clients.into_iter().enumerate() {
            let rx = receiver.clone();
            let executor = MayPostgresExecutor::new(client);
            let handle = std::thread::Builder::new()
                .name(format!("tidepool-worker-{n}"))
                .spawn(move || run_worker_loop(rx, executor))
                .map_err(|e| TideError::Other(format!("failed to spawn worker: {e}")))?;
            handles.push(handle);
        }
        log::info!("started {} tidepool worker(s)", handles.len());
        Ok(Self {
            sender: Some(sender),
            handles,
        })
    }

    /// Open `max_connections` connections from `config` and start a worker
    /// for each.
    ///
    /// # Errors
    ///
    /// Returns `TideError::Other` if the configured backend is not PostgreSQL
    /// or a connection fails.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let backend = config.backend()?;
        if backend != DbBackend::Postgres {
            return Err(TideError::Other(format!(
                "PostgresWorker cannot serve the {backend} backend"
            )));
        }
        let count = usize::try_from(config.max_connections.max(1)).unwrap_or(1);
        let clients = (0..count)
            .map(|_| {
                connect(&config.url)
                    .map_err(|e| TideError::Other(format!("Connection error: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::spawn_many(clients)
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }
}

impl Drop for PostgresWorker {
    fn drop(&mut self) {
        // Closing the queue ends every worker loop.
        self.sender.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("tidepool worker panicked");
            }
        }
    }
}

impl Dialect for PostgresWorker {
    fn backend(&self) -> DbBackend {
        DbBackend::Postgres
    }
}

#[async_trait]
impl AsyncTideExecutor for PostgresWorker {
    async fn query_stream(&self, statement: &Statement) -> Result<Box<dyn AsyncRowStream + '_>> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| TideError::Other("worker queue is closed".to_string()))?;
        let (reply, response) = oneshot::channel();
        sender
            .send(Job {
                statement: statement.clone(),
                reply,
            })
            .map_err(|_| TideError::Other("all workers have stopped".to_string()))?;
        let rows = response
            .await
            .map_err(|_| TideError::Other("worker dropped the statement".to_string()))??;
        Ok(Box::new(PgRowStream::new(rows)))
    }
}
