//! The [`Model`] trait: table metadata plus column access for one row type.
//!
//! Implementations are produced by [`impl_model!`](crate::impl_model). The CRUD
//! routines in [`crud`](crate::crud) only talk to rows through this trait.

use crate::cache::TableCache;
use crate::error::{OrmError, OrmResult};
use crate::row::FromRow;
use crate::sql::Param;
use chrono::{NaiveDate, NaiveDateTime};
use tokio_postgres::Row;

/// Which write is stamping audit timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    Insert,
    Update,
    Upsert,
}

/// Table metadata and column access for a row type.
pub trait Model: FromRow + Clone + Default + Send + Sync + 'static {
    /// Loaded relationships of a row.
    type Rels: Default + Clone + Send + Sync;

    const TABLE: &'static str;
    /// All columns, in table order.
    const COLUMNS: &'static [&'static str];
    /// Columns the database fills in when no value is supplied.
    const COLUMNS_WITH_DEFAULT: &'static [&'static str];
    const PRIMARY_KEY: &'static [&'static str];

    /// The process-wide statement cache of this table.
    fn cache() -> &'static TableCache;

    /// The current value of `column`, ready to bind.
    fn value(&self, column: &str) -> Option<Param>;

    /// Whether `column` still holds its zero value (0, "", false, NULL).
    fn is_zero(&self, column: &str) -> bool;

    /// Copy every column present in `row` into `self` (used for `RETURNING`).
    fn assign_from_row(&mut self, row: &Row) -> OrmResult<()>;

    fn rels(&self) -> &Self::Rels;

    fn rels_mut(&mut self) -> &mut Self::Rels;

    /// A copy of the column values with no relationships attached.
    fn detached(&self) -> Self;

    /// Whether both rows carry the same primary key.
    fn same_pk(&self, other: &Self) -> bool;

    /// Stamp `created_at` / `updated_at`; tables without them ignore this.
    fn touch(&mut self, now: NaiveDateTime, touch: Touch) {
        let _ = (now, touch);
    }

    /// Columns that are not part of the primary key.
    fn non_pk_columns() -> Vec<&'static str> {
        Self::COLUMNS
            .iter()
            .copied()
            .filter(|c| !Self::PRIMARY_KEY.contains(c))
            .collect()
    }

    /// Map caller-supplied column names onto this table's columns.
    fn resolve_columns<S: AsRef<str>>(requested: &[S]) -> OrmResult<Vec<&'static str>> {
        requested
            .iter()
            .map(|name| {
                let name = name.as_ref();
                Self::COLUMNS
                    .iter()
                    .copied()
                    .find(|c| *c == name)
                    .ok_or_else(|| {
                        OrmError::validation(format!(
                            "unknown column \"{name}\" for table {}",
                            Self::TABLE
                        ))
                    })
            })
            .collect()
    }

    /// Bind values for `columns`, in order.
    fn values(&self, columns: &[&str]) -> OrmResult<Vec<Param>> {
        columns
            .iter()
            .map(|c| {
                self.value(c).ok_or_else(|| {
                    OrmError::validation(format!("unknown column \"{c}\" for table {}", Self::TABLE))
                })
            })
            .collect()
    }

    /// Primary key values, in `PRIMARY_KEY` order.
    fn pk_values(&self) -> OrmResult<Vec<Param>> {
        self.values(Self::PRIMARY_KEY)
    }

    /// Default-bearing columns whose value has been set by the caller.
    fn non_zero_defaults(&self) -> Vec<&'static str> {
        Self::COLUMNS_WITH_DEFAULT
            .iter()
            .copied()
            .filter(|c| !self.is_zero(c))
            .collect()
    }

    /// Replace the column values with `fresh`, keeping loaded relationships.
    fn replace_columns(&mut self, mut fresh: Self) {
        std::mem::swap(fresh.rels_mut(), self.rels_mut());
        *self = fresh;
    }
}

/// Apply audit timestamp rules to a `created_at` / `updated_at` pair.
///
/// Inserts fill both when unset, updates always move `updated_at`, upserts fill
/// `created_at` when unset and always move `updated_at`.
pub fn stamp(
    created_at: &mut Option<NaiveDateTime>,
    updated_at: &mut Option<NaiveDateTime>,
    now: NaiveDateTime,
    touch: Touch,
) {
    match touch {
        Touch::Insert => {
            created_at.get_or_insert(now);
            updated_at.get_or_insert(now);
        }
        Touch::Update => *updated_at = Some(now),
        Touch::Upsert => {
            created_at.get_or_insert(now);
            *updated_at = Some(now);
        }
    }
}

/// Zero-value test for column types.
pub trait IsZero {
    fn is_zero(&self) -> bool;
}

impl IsZero for i16 {
    fn is_zero(&self) -> bool {
        *self == 0
    }
}

impl IsZero for i32 {
    fn is_zero(&self) -> bool {
        *self == 0
    }
}

impl IsZero for i64 {
    fn is_zero(&self) -> bool {
        *self == 0
    }
}

impl IsZero for bool {
    fn is_zero(&self) -> bool {
        !*self
    }
}

impl IsZero for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl IsZero for NaiveDateTime {
    fn is_zero(&self) -> bool {
        *self == NaiveDateTime::default()
    }
}

impl IsZero for NaiveDate {
    fn is_zero(&self) -> bool {
        *self == NaiveDate::default()
    }
}

impl<T> IsZero for Option<T> {
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}
