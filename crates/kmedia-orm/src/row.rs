//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for types that can be constructed from a database row.
///
/// Model structs implement this by hand:
///
/// ```ignore
/// impl FromRow for Lecturer {
///     fn from_row(row: &Row) -> OrmResult<Self> {
///         Ok(Self {
///             id: row.get_or_default("id")?,
///             name: row.get_or_default("name")?,
///             ..Default::default()
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> OrmResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning OrmError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Like [`RowExt::try_get_column`], but a column missing from the result set
    /// (a partial `SELECT`) yields `T::default()`.
    fn get_or_default<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a> + Default;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| OrmError::decode(column, e.to_string()))
    }

    fn get_or_default<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a> + Default,
    {
        if self.columns().iter().any(|c| c.name() == column) {
            self.try_get_column(column)
        } else {
            Ok(T::default())
        }
    }
}
