//! Black-box tests of the retrieval operations.
//!
//! Everything except `postgres` runs against `MockExecutor`; the PostgreSQL
//! tests are ignored unless `TEST_DATABASE_URL` points at a server.


mod asynchronous;
mod exists;
mod first;
mod postgres;
mod single;
