//! The kmedia schema, embedded from `migrations/`.

use kmedia_orm::OrmResult;
use kmedia_orm::migrate::Report;

mod embedded {
    refinery::embed_migrations!("./migrations");
}

/// Bring the database schema up to date.
pub async fn run(client: &mut tokio_postgres::Client) -> OrmResult<Report> {
    kmedia_orm::migrate::run(client, embedded::migrations::runner()).await
}

#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> OrmResult<Report> {
    kmedia_orm::migrate::run_pool(pool, embedded::migrations::runner()).await
}
