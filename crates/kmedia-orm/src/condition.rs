//! WHERE-clause primitives used by [`Query`](crate::query::Query).
//!
//! Column names go through [`Ident`] validation, values are always bound.

use crate::error::OrmResult;
use crate::ident::{Ident, IntoIdent};
use crate::sql::{Param, Sql};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Query operator for building conditions.
#[derive(Debug, Clone)]
pub enum Op<T> {
    /// Equal: column = value
    Eq(T),
    /// Not equal: column != value
    Ne(T),
    /// Greater than: column > value
    Gt(T),
    /// Greater than or equal: column >= value
    Gte(T),
    /// Less than: column < value
    Lt(T),
    /// Less than or equal: column <= value
    Lte(T),
    /// LIKE pattern match
    Like(T),
    /// Case-insensitive LIKE (PostgreSQL ILIKE)
    Ilike(T),
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
    /// IN (list)
    In(Vec<T>),
    /// NOT IN (list)
    NotIn(Vec<T>),
}

#[derive(Debug, Clone)]
enum ConditionValue {
    Single(Param),
    List(Vec<Param>),
    None,
}

#[derive(Debug, Clone)]
enum ConditionInner {
    Sql(Sql),
    Expr {
        column: Ident,
        operator: &'static str,
        value: ConditionValue,
    },
}

/// A single predicate. Several conditions on a query are joined with `AND`.
#[derive(Debug, Clone)]
pub struct Condition(ConditionInner);

fn param<T: ToSql + Send + Sync + 'static>(v: T) -> Param {
    Arc::new(v)
}

impl Condition {
    pub fn new<I, T>(column: I, op: Op<T>) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        let column = column.into_ident()?;
        let (operator, value) = match op {
            Op::Eq(v) => ("=", ConditionValue::Single(param(v))),
            Op::Ne(v) => ("!=", ConditionValue::Single(param(v))),
            Op::Gt(v) => (">", ConditionValue::Single(param(v))),
            Op::Gte(v) => (">=", ConditionValue::Single(param(v))),
            Op::Lt(v) => ("<", ConditionValue::Single(param(v))),
            Op::Lte(v) => ("<=", ConditionValue::Single(param(v))),
            Op::Like(v) => ("LIKE", ConditionValue::Single(param(v))),
            Op::Ilike(v) => ("ILIKE", ConditionValue::Single(param(v))),
            Op::IsNull => ("IS NULL", ConditionValue::None),
            Op::IsNotNull => ("IS NOT NULL", ConditionValue::None),
            Op::In(vals) => (
                "IN",
                ConditionValue::List(vals.into_iter().map(param).collect()),
            ),
            Op::NotIn(vals) => (
                "NOT IN",
                ConditionValue::List(vals.into_iter().map(param).collect()),
            ),
        };

        Ok(Condition(ConditionInner::Expr {
            column,
            operator,
            value,
        }))
    }

    /// A predicate built with [`Sql`], parameters included.
    pub fn sql(fragment: Sql) -> Self {
        Condition(ConditionInner::Sql(fragment))
    }

    pub fn eq<I, T>(column: I, value: T) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Eq(value))
    }

    pub fn ne<I, T>(column: I, value: T) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Ne(value))
    }

    pub fn gt<I, T>(column: I, value: T) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Gt(value))
    }

    pub fn gte<I, T>(column: I, value: T) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Gte(value))
    }

    pub fn lt<I, T>(column: I, value: T) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Lt(value))
    }

    pub fn lte<I, T>(column: I, value: T) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Lte(value))
    }

    pub fn like<I, T>(column: I, pattern: T) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Like(pattern))
    }

    pub fn ilike<I, T>(column: I, pattern: T) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::Ilike(pattern))
    }

    pub fn is_null<I: IntoIdent>(column: I) -> OrmResult<Self> {
        Self::new::<I, i32>(column, Op::IsNull)
    }

    pub fn is_not_null<I: IntoIdent>(column: I) -> OrmResult<Self> {
        Self::new::<I, i32>(column, Op::IsNotNull)
    }

    pub fn in_list<I, T>(column: I, values: Vec<T>) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::In(values))
    }

    pub fn not_in<I, T>(column: I, values: Vec<T>) -> OrmResult<Self>
    where
        I: IntoIdent,
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(column, Op::NotIn(values))
    }

    /// Qualify a bare column name with `table`, so the predicate stays
    /// unambiguous once joins are added.
    pub fn qualified(self, table: &str) -> Self {
        match self.0 {
            ConditionInner::Expr {
                column,
                operator,
                value,
            } => Condition(ConditionInner::Expr {
                column: column.qualified(table),
                operator,
                value,
            }),
            other => Condition(other),
        }
    }

    pub fn append_to_sql(&self, sql: &mut Sql) {
        match &self.0 {
            ConditionInner::Sql(fragment) => {
                sql.push_sql(fragment.clone());
            }
            ConditionInner::Expr {
                column,
                operator,
                value,
            } => match value {
                ConditionValue::List(vals) if vals.is_empty() => {
                    // Empty IN list is always false, empty NOT IN always true.
                    if *operator == "IN" {
                        sql.push("1=0");
                    } else {
                        sql.push("1=1");
                    }
                }
                ConditionValue::Single(v) => {
                    sql.push_ident_ref(column);
                    sql.push(" ");
                    sql.push(operator);
                    sql.push(" ");
                    sql.push_param(v.clone());
                }
                ConditionValue::List(vals) => {
                    sql.push_ident_ref(column);
                    sql.push(" ");
                    sql.push(operator);
                    sql.push(" (");
                    for (i, v) in vals.iter().enumerate() {
                        if i > 0 {
                            sql.push(", ");
                        }
                        sql.push_param(v.clone());
                    }
                    sql.push(")");
                }
                ConditionValue::None => {
                    sql.push_ident_ref(column);
                    sql.push(" ");
                    sql.push(operator);
                }
            },
        }
    }
}
