//! # kmedia-models
//!
//! One module per table of the kmedia schema. Every model gets CRUD, queries and
//! slice operations from [`kmedia_orm::impl_model!`]; relationship accessors, eager
//! loaders and association writes are defined next to each struct.
//!
//! ```ignore
//! use kmedia_models::{Catalog, Container};
//!
//! let mut catalog = Catalog::find(&client, 7).await?;
//! let mut fresh = vec![Container::default(), Container::default()];
//! catalog.add_containers(&client, true, &mut fresh).await?;
//!
//! let mut catalogs = Catalog::query().filter(Condition::is_null("parent_id")?).all(&client).await?;
//! Catalog::load_children(&client, &mut catalogs).await?;
//! ```

pub mod joins;
pub mod models;

#[cfg(feature = "migrate")]
pub mod migrations;

pub use models::*;
