//! SQL-first dynamic builder.
//!
//! `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
//! placeholders when rendered, so fragments can be composed without tracking
//! placeholder indices by hand.
//!
//! ```ignore
//! use kmedia_orm::sql;
//!
//! let mut q = sql("SELECT * FROM \"catalogs\" WHERE 1=1");
//! if let Some(parent) = parent_id {
//!     q.push(" AND \"parent_id\" = ").push_bind(parent);
//! }
//! let rows: Vec<Catalog> = q.fetch_all_as(&conn).await?;
//! ```

use crate::client::GenericClient;
use crate::condition::Condition;
use crate::error::{OrmError, OrmResult};
use crate::ident::{Ident, IntoIdent, quote};
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSqlOwned, ToSql};

/// A type-erased bind parameter.
pub type Param = Arc<dyn ToSql + Sync + Send>;

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL builder.
#[must_use]
#[derive(Debug, Clone)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Param>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Append raw SQL.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a bound parameter placeholder and store its value.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.push_param(Arc::new(value))
    }

    /// Append an already type-erased parameter.
    pub fn push_param(&mut self, value: Param) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value);
        self
    }

    /// Append a comma-separated list of parameters. An empty list renders `NULL`.
    pub fn push_bind_list<T>(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.push_param_list(values.into_iter().map(|v| Arc::new(v) as Param))
    }

    /// Type-erased form of [`Sql::push_bind_list`].
    pub fn push_param_list(&mut self, values: impl IntoIterator<Item = Param>) -> &mut Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };

        self.push_param(first);
        for v in iter {
            self.push(",");
            self.push_param(v);
        }
        self
    }

    /// Append another fragment, including its parameters.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        self.parts.append(&mut other.parts);
        self.params.append(&mut other.params);
        self
    }

    /// Append a validated identifier (may be dotted).
    pub fn push_ident<I>(&mut self, ident: I) -> OrmResult<&mut Self>
    where
        I: IntoIdent,
    {
        let ident = ident.into_ident()?;
        Ok(self.push_ident_ref(&ident))
    }

    pub fn push_ident_ref(&mut self, ident: &Ident) -> &mut Self {
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => ident.write_sql(last),
            _ => {
                let mut s = String::new();
                ident.write_sql(&mut s);
                self.parts.push(SqlPart::Raw(s));
            }
        }
        self
    }

    /// Append an always-quoted table or column name.
    pub fn push_quoted(&mut self, name: &str) -> &mut Self {
        self.push(&quote(name))
    }

    /// Render the SQL with `$n` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx = 0usize;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    out.push('$');
                    out.push_str(&idx.to_string());
                }
            }
        }
        out
    }

    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn validate(&self) -> OrmResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        if placeholder_count != self.params.len() {
            let params_len = self.params.len();
            return Err(OrmError::Validation(format!(
                "Sql: placeholders({placeholder_count}) != params({params_len})"
            )));
        }
        Ok(())
    }

    pub fn push_condition(&mut self, condition: &Condition) -> &mut Self {
        condition.append_to_sql(self);
        self
    }

    /// Append ` WHERE a AND b ...`; nothing for an empty slice.
    pub fn push_where_and(&mut self, conditions: &[Condition]) -> &mut Self {
        for (i, cond) in conditions.iter().enumerate() {
            self.push(if i == 0 { " WHERE " } else { " AND " });
            self.push_condition(cond);
        }
        self
    }

    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.push(" LIMIT ").push_bind(n)
    }

    pub fn offset(&mut self, n: i64) -> &mut Self {
        self.push(" OFFSET ").push_bind(n)
    }

    // ==================== Execution ====================

    /// Execute the built SQL and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> OrmResult<Vec<Row>> {
        self.validate()?;
        conn.query(&self.to_sql(), &self.params_ref()).await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> OrmResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return the **first** row, `NotFound` if none.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> OrmResult<Row> {
        self.validate()?;
        conn.query_one(&self.to_sql(), &self.params_ref()).await
    }

    /// Execute the built SQL and return the first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> OrmResult<Option<Row>> {
        self.validate()?;
        conn.query_opt(&self.to_sql(), &self.params_ref()).await
    }

    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> OrmResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and decode the first column of the first row.
    pub async fn fetch_scalar<T: FromSqlOwned>(&self, conn: &impl GenericClient) -> OrmResult<T> {
        let row = self.fetch_one(conn).await?;
        row.try_get(0).map_err(|e| OrmError::decode("0", e.to_string()))
    }

    /// Execute the built SQL and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        self.validate()?;
        conn.execute(&self.to_sql(), &self.params_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = sql("SELECT * FROM users WHERE a = ");
        q.push_bind(1).push(" AND b = ").push_bind("x");

        assert_eq!(q.to_sql(), "SELECT * FROM users WHERE a = $1 AND b = $2");
        assert_eq!(q.params_ref().len(), 2);
    }

    #[test]
    fn can_compose_fragments() {
        let mut w = Sql::empty();
        w.push(" WHERE id = ").push_bind(42);

        let mut q = sql("SELECT * FROM users");
        q.push_sql(w);

        assert_eq!(q.to_sql(), "SELECT * FROM users WHERE id = $1");
        assert_eq!(q.params_ref().len(), 1);
    }

    #[test]
    fn bind_list_empty_is_valid_sql() {
        let mut q = sql("SELECT * FROM users WHERE id IN (");
        q.push_bind_list(Vec::<i32>::new()).push(")");
        assert_eq!(q.to_sql(), "SELECT * FROM users WHERE id IN (NULL)");
        assert_eq!(q.params_ref().len(), 0);
    }

    #[test]
    fn bind_list_renders_commas() {
        let mut q = sql("DELETE FROM \"catalogs_containers\" WHERE \"container_id\" IN (");
        q.push_bind_list(vec![1, 2, 3]).push(")");
        assert_eq!(
            q.to_sql(),
            "DELETE FROM \"catalogs_containers\" WHERE \"container_id\" IN ($1,$2,$3)"
        );
    }

    #[test]
    fn where_and_joins_conditions() {
        let mut q = sql("SELECT 1");
        q.push_where_and(&[
            Condition::eq("a", 1).unwrap(),
            Condition::is_not_null("b").unwrap(),
        ]);
        assert_eq!(q.to_sql(), "SELECT 1 WHERE \"a\" = $1 AND \"b\" IS NOT NULL");
    }

    #[test]
    fn quoted_names_escape() {
        let mut q = Sql::empty();
        q.push_quoted("desc").push(",").push_quoted("we\"ird");
        assert_eq!(q.to_sql(), "\"desc\",\"we\"\"ird\"");
    }

    #[test]
    fn push_ident_rejects_garbage() {
        let mut q = Sql::empty();
        assert!(q.push_ident("users; drop").is_err());
    }
}
