//! Round trips against a live PostgreSQL.
//!
//! Every test skips when `DATABASE_URL` is unset. The schema migration runs once
//! per process; each test works inside a transaction that is rolled back, except
//! the transaction tests, which clean up what they commit.

mod common;
mod crud;
mod queries;
mod relationships;
mod transactions;
