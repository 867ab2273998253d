//! SQL migrations via [`refinery`].
//!
//! Migration files live in the crate that owns the schema and are embedded with
//! [`embed_migrations!`]:
//!
//! ```ignore
//! mod embedded {
//!     kmedia_orm::migrate::embed_migrations!("./migrations");
//! }
//!
//! kmedia_orm::migrate::run(&mut client, embedded::migrations::runner()).await?;
//! ```

use crate::error::OrmResult;

pub use refinery::{Report, Runner, embed_migrations};

/// Apply every pending migration of `runner`.
pub async fn run(client: &mut tokio_postgres::Client, runner: Runner) -> OrmResult<Report> {
    let report = runner.run_async(client).await?;
    let applied = report.applied_migrations();
    if applied.is_empty() {
        tracing::info!("schema is up to date");
    }
    for m in applied {
        tracing::info!(version = m.version(), name = m.name(), "applied migration");
    }
    Ok(report)
}

/// Pool variant of [`run`].
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool, runner: Runner) -> OrmResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client, runner).await
}
