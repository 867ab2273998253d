//! # kmedia-orm
//!
//! Runtime for the kmedia PostgreSQL data-access layer.
//!
//! Each table of the kmedia schema is a plain struct wired up with [`impl_model!`].
//! That gives it:
//!
//! - **CRUD**: `insert` / `update` / `upsert` / `delete` / `reload`, plus `find` and
//!   `exists` by primary key
//! - **Queries**: `Catalog::query().filter(Condition::eq("visible", true)?).all(&conn)`
//! - **Slices**: [`ModelSlice`] adds `delete_all` / `update_all` / `reload_all` to `Vec<M>`
//! - **Relations**: batch eager loaders and association writes in [`relation`]
//!
//! Write statements are generated once per distinct column set and kept in a
//! process-wide [`cache::TableCache`]. Every operation takes `&impl GenericClient`,
//! so connections, pooled connections and transactions are interchangeable.
//!
//! ```ignore
//! use kmedia_orm::{Condition, GenericClient, ModelSlice};
//!
//! let mut lecturer = Lecturer { name: "Rav".into(), ..Default::default() };
//! lecturer.insert(&client, &[]).await?;
//!
//! let recent = Lecturer::query()
//!     .filter(Condition::gt("ordnum", 10)?)
//!     .order_by("\"ordnum\" DESC")
//!     .all(&client)
//!     .await?;
//! recent.delete_all(&client).await?;
//! ```

pub mod cache;
pub mod client;
pub mod condition;
pub mod config;
pub mod crud;
pub mod error;
pub mod ident;
mod macros;
pub mod model;
pub mod query;
pub mod relation;
pub mod row;
pub mod sql;
pub mod trace;
pub mod transaction;

#[cfg(feature = "migrate")]
pub mod migrate;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(test)]
mod testing;

pub use client::GenericClient;
pub use condition::{Condition, Op};
pub use config::Config;
pub use crud::{ModelSlice, UpsertOptions, column};
pub use error::{OrmError, OrmResult, ResultExt};
pub use model::{Model, Touch};
pub use query::Query;
pub use row::{FromRow, RowExt};
pub use sql::{Param, Sql, sql};

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

#[doc(hidden)]
pub mod __private {
    pub use chrono::NaiveDateTime;
    pub use tokio_postgres::Row;
}
