//! Typed query builder: `Catalog::query().filter(...).order_by(...).all(&conn)`.

use crate::client::GenericClient;
use crate::condition::Condition;
use crate::crud::push_set_list;
use crate::error::{OrmError, OrmResult, ResultExt};
use crate::ident::quote;
use crate::model::Model;
use crate::relation::JoinTable;
use crate::sql::{Param, Sql, sql};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A SELECT over the table of `M`.
///
/// Joins, ORDER BY and SELECT list entries are raw SQL; values belong in
/// [`Condition`]s so they are bound.
#[must_use]
pub struct Query<M> {
    select: Option<String>,
    joins: Vec<String>,
    conditions: Vec<Condition>,
    order_by: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Query<M> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
            joins: self.joins.clone(),
            conditions: self.conditions.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            _model: PhantomData,
        }
    }
}

impl<M> std::fmt::Debug for Query<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("select", &self.select)
            .field("joins", &self.joins)
            .field("conditions", &self.conditions)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<M: Model> Default for Query<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Query<M> {
    pub fn new() -> Self {
        Self {
            select: None,
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            _model: PhantomData,
        }
    }

    /// Select only these columns of the model's table. Other fields decode to
    /// their default values.
    pub fn select(mut self, columns: &[&str]) -> OrmResult<Self> {
        let table = quote(M::TABLE);
        let list: Vec<String> = M::resolve_columns(columns)?
            .into_iter()
            .map(|c| format!("{table}.{}", quote(c)))
            .collect();
        self.select = Some(list.join(","));
        Ok(self)
    }

    /// `INNER JOIN <clause>`, e.g. `"catalogs_containers" ON ...`.
    pub fn inner_join(mut self, clause: &str) -> Self {
        self.joins.push(format!("INNER JOIN {clause}"));
        self
    }

    /// Add a condition; conditions are joined with `AND`. Bare column names are
    /// qualified with the model's table.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition.qualified(M::TABLE));
        self
    }

    /// Add a predicate built with [`Sql`].
    pub fn where_sql(self, fragment: Sql) -> Self {
        self.filter(Condition::sql(fragment))
    }

    /// `"table"."column" = $n` on this model's table.
    pub fn where_eq<T>(self, column: &str, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.where_qualified_eq(M::TABLE, column, Arc::new(value))
    }

    fn where_qualified_eq(self, table: &str, column: &str, value: Param) -> Self {
        let mut fragment = Sql::empty();
        fragment
            .push_quoted(table)
            .push(".")
            .push_quoted(column)
            .push(" = ")
            .push_param(value);
        self.where_sql(fragment)
    }

    /// Rows linked to `local` through the join table `jt`.
    pub fn through(self, jt: JoinTable, local: Param) -> Self {
        self.inner_join(&jt.join_clause::<M>())
            .where_qualified_eq(jt.table, jt.local_col, local)
    }

    /// Append an ORDER BY entry such as `"ordnum" DESC`.
    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_by.push(clause.to_string());
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    fn push_from_where(&self, q: &mut Sql) {
        q.push(" FROM ").push_quoted(M::TABLE);
        for join in &self.joins {
            q.push(" ").push(join);
        }
        q.push_where_and(&self.conditions);
    }

    /// The full SELECT statement.
    pub fn to_select_sql(&self) -> Sql {
        let mut q = sql("SELECT ");
        match &self.select {
            Some(list) => q.push(list),
            None => q.push(&format!("{}.*", quote(M::TABLE))),
        };
        self.push_from_where(&mut q);
        if !self.order_by.is_empty() {
            q.push(" ORDER BY ").push(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            q.limit(limit);
        }
        if let Some(offset) = self.offset {
            q.offset(offset);
        }
        q
    }

    fn to_count_sql(&self) -> Sql {
        let mut q = sql("SELECT COUNT(*)");
        self.push_from_where(&mut q);
        q
    }

    /// Every matching row.
    pub async fn all(&self, conn: &impl GenericClient) -> OrmResult<Vec<M>> {
        self.to_select_sql()
            .fetch_all_as(conn)
            .await
            .with_context(|| format!("kmodels: failed to assign all query to {} slice", M::TABLE))
    }

    /// The first matching row; `NotFound` when there is none.
    pub async fn one(&self, conn: &impl GenericClient) -> OrmResult<M> {
        let q = self.clone().limit(1).to_select_sql();
        match q.fetch_opt_as::<M>(conn).await {
            Ok(Some(row)) => Ok(row),
            Ok(None) => Err(OrmError::not_found(format!("{} not found", M::TABLE))),
            Err(e) => Err(e.context(format!(
                "kmodels: failed to execute a one query for {}",
                M::TABLE
            ))),
        }
    }

    /// Number of matching rows (ignores ORDER BY, LIMIT and OFFSET).
    pub async fn count(&self, conn: &impl GenericClient) -> OrmResult<i64> {
        self.to_count_sql()
            .fetch_scalar::<i64>(conn)
            .await
            .with_context(|| format!("kmodels: failed to count {} rows", M::TABLE))
    }

    /// Whether at least one row matches.
    pub async fn exists(&self, conn: &impl GenericClient) -> OrmResult<bool> {
        let mut q = sql("SELECT EXISTS(SELECT 1");
        self.push_from_where(&mut q);
        q.push(")");
        q.fetch_scalar::<bool>(conn)
            .await
            .with_context(|| format!("kmodels: failed to check if {} exists", M::TABLE))
    }

    fn mutation_guard(&self, what: &str) -> OrmResult<()> {
        if self.joins.is_empty() {
            Ok(())
        } else {
            Err(OrmError::validation(format!(
                "{what} on {} does not support joins",
                M::TABLE
            )))
        }
    }

    /// Delete every matching row.
    pub async fn delete_all(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let context = || format!("kmodels: unable to delete all from {}", M::TABLE);
        self.mutation_guard("delete all").with_context(context)?;
        let mut q = sql("DELETE FROM ");
        q.push_quoted(M::TABLE);
        q.push_where_and(&self.conditions);
        q.execute(conn).await.with_context(context)
    }

    /// Set the given columns on every matching row.
    pub async fn update_all(
        &self,
        conn: &impl GenericClient,
        columns: &[(&str, Param)],
    ) -> OrmResult<u64> {
        let context = || format!("kmodels: unable to update all for {}", M::TABLE);
        self.mutation_guard("update all").with_context(context)?;
        let mut q = sql("UPDATE ");
        q.push_quoted(M::TABLE);
        push_set_list::<M>(&mut q, columns).with_context(context)?;
        q.push_where_and(&self.conditions);
        q.execute(conn).await.with_context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PanicClient, Widget};

    #[test]
    fn select_with_conditions_and_paging() {
        let q = Widget::query()
            .select(&["id", "name"])
            .unwrap()
            .filter(Condition::ilike("name", "%a%").unwrap())
            .where_eq("ordnum", 3)
            .order_by("\"ordnum\" DESC")
            .limit(10)
            .offset(20)
            .to_select_sql();
        assert_eq!(
            q.to_sql(),
            "SELECT \"widgets\".\"id\",\"widgets\".\"name\" FROM \"widgets\" \
             WHERE \"widgets\".\"name\" ILIKE $1 AND \"widgets\".\"ordnum\" = $2 \
             ORDER BY \"ordnum\" DESC LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn select_rejects_unknown_columns() {
        let err = Widget::query().select(&["id", "colour"]).unwrap_err();
        assert!(err.to_string().contains("unknown column \"colour\""));
    }

    #[test]
    fn reserved_word_columns_are_quoted_in_filters() {
        let q = Widget::query()
            .filter(Condition::eq("desc", "x").unwrap())
            .filter(Condition::eq("w.open", true).unwrap())
            .to_select_sql();
        assert_eq!(
            q.to_sql(),
            "SELECT \"widgets\".* FROM \"widgets\" \
             WHERE \"widgets\".\"desc\" = $1 AND \"w\".\"open\" = $2"
        );
    }

    #[test]
    fn through_joins_the_link_table() {
        let jt = JoinTable::new("widgets_parts", "part_id", "widget_id");
        let q = Widget::query().through(jt, Arc::new(7)).to_select_sql();
        assert_eq!(
            q.to_sql(),
            "SELECT \"widgets\".* FROM \"widgets\" INNER JOIN \"widgets_parts\" \
             ON \"widgets\".\"id\" = \"widgets_parts\".\"widget_id\" \
             WHERE \"widgets_parts\".\"part_id\" = $1"
        );
    }

    #[tokio::test]
    async fn mutations_reject_joins() {
        let jt = JoinTable::new("widgets_parts", "part_id", "widget_id");
        let q = Widget::query().through(jt, Arc::new(7));
        let err = q.delete_all(&PanicClient).await.unwrap_err();
        assert!(err.to_string().contains("does not support joins"));
        let err = q
            .update_all(&PanicClient, &[crate::column("name", "x")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not support joins"));
    }
}
