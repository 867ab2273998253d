//! Test models and client doubles shared by the unit tests.

use crate::client::GenericClient;
use crate::error::OrmResult;
use chrono::NaiveDateTime;
use std::sync::Mutex;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WidgetRels {
    pub parts: Vec<Widget>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Widget {
    pub id: i32,
    pub name: String,
    pub ordnum: i32,
    pub label: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub r: WidgetRels,
}

crate::impl_model! {
    Widget {
        table: "widgets",
        rels: WidgetRels,
        primary_key: [id: i32],
        columns: [id, name, ordnum, label, created_at, updated_at],
        defaults: [id, ordnum],
        timestamps: (created_at, updated_at),
    }
}

/// A join-table shaped model: composite key, nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Pair {
    pub left_id: i32,
    pub right_id: i32,
    pub r: (),
}

crate::impl_model! {
    Pair {
        table: "pairs",
        rels: (),
        primary_key: [left_id: i32, right_id: i32],
        columns: [left_id, right_id],
        defaults: [],
    }
}

/// Fails the test on any round trip.
pub(crate) struct PanicClient;

impl GenericClient for PanicClient {
    async fn query(&self, _sql: &str, _params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        panic!("unexpected query() call")
    }

    async fn execute(&self, _sql: &str, _params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        panic!("unexpected execute() call")
    }
}

/// Records sent statements; `execute` reports one affected row and `query`
/// returns no rows.
#[derive(Default)]
pub(crate) struct RecordingClient {
    pub executed: Mutex<Vec<(String, usize)>>,
}

impl RecordingClient {
    pub fn statements(&self) -> Vec<(String, usize)> {
        self.executed.lock().unwrap().clone()
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        self.executed
            .lock()
            .unwrap()
            .push((sql.to_string(), params.len()));
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        self.executed
            .lock()
            .unwrap()
            .push((sql.to_string(), params.len()));
        Ok(1)
    }
}
