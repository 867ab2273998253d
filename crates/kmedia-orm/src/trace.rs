//! `tracing` output for executed SQL.
//!
//! Statements are emitted at `DEBUG` on the `kmedia_orm.sql` target right before they
//! are sent to the server. Long statements are truncated to
//! [`max_sql_length`] characters (200 by default, `0` disables truncation).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const SQL_TARGET: &str = "kmedia_orm.sql";
pub const CACHE_TARGET: &str = "kmedia_orm.cache";

static MAX_SQL_LENGTH: AtomicUsize = AtomicUsize::new(200);
static SQL_LOGGING: AtomicBool = AtomicBool::new(true);

/// Turn statement logging on or off (on by default).
pub fn set_sql_logging(enabled: bool) {
    SQL_LOGGING.store(enabled, Ordering::Relaxed);
}

/// Set the maximum SQL length (in chars) written to the log.
pub fn set_max_sql_length(len: usize) {
    MAX_SQL_LENGTH.store(len, Ordering::Relaxed);
}

pub fn max_sql_length() -> usize {
    MAX_SQL_LENGTH.load(Ordering::Relaxed)
}

pub(crate) fn log_statement(sql: &str, param_count: usize) {
    if !SQL_LOGGING.load(Ordering::Relaxed)
        || !tracing::enabled!(target: SQL_TARGET, tracing::Level::DEBUG)
    {
        return;
    }
    let sql = truncate_sql(sql, max_sql_length());
    tracing::debug!(target: SQL_TARGET, param_count, sql = %sql);
}

fn truncate_sql(sql: &str, max: usize) -> String {
    if max == 0 {
        return sql.to_string();
    }
    match sql.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}
