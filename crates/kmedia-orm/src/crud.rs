//! Insert / update / upsert / delete / find for any [`Model`].
//!
//! Statement text for writes is cached per table in [`TableCache`](crate::cache::TableCache)
//! and keyed by the column-set signature of the call. Every error leaving this module
//! carries a `kmodels: ...` context, except `NotFound` which is returned as-is.

use crate::cache::{InsertStatement, UpdateStatement, cache_key};
use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult, ResultExt};
use crate::ident::{quote, quote_list};
use crate::model::{Model, Touch};
use crate::sql::{Param, Sql, sql};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Current time for audit timestamps (UTC, stored as `timestamp without time zone`).
pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// A `(column, value)` pair for bulk updates.
pub fn column<T>(name: &str, value: T) -> (&str, Param)
where
    T: ToSql + Send + Sync + 'static,
{
    (name, Arc::new(value))
}

fn as_refs(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Options for [`upsert`].
///
/// Empty `conflict_columns` means the primary key, empty `update_columns` means every
/// non-key column, empty `whitelist` means the same insert column set as [`insert`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertOptions<'a> {
    pub update_on_conflict: bool,
    pub conflict_columns: &'a [&'a str],
    pub update_columns: &'a [&'a str],
    pub whitelist: &'a [&'a str],
}

impl<'a> UpsertOptions<'a> {
    /// `ON CONFLICT (...) DO UPDATE`.
    pub fn do_update() -> Self {
        Self {
            update_on_conflict: true,
            ..Self::default()
        }
    }

    /// `ON CONFLICT DO NOTHING`.
    pub fn do_nothing() -> Self {
        Self::default()
    }

    pub fn conflict(mut self, columns: &'a [&'a str]) -> Self {
        self.conflict_columns = columns;
        self
    }

    pub fn update(mut self, columns: &'a [&'a str]) -> Self {
        self.update_columns = columns;
        self
    }

    pub fn whitelist(mut self, columns: &'a [&'a str]) -> Self {
        self.whitelist = columns;
        self
    }
}

/// The columns an INSERT binds and the columns it reads back.
///
/// With a whitelist the whitelist is bound. Otherwise every column without a
/// database default is bound, plus the default-bearing columns the caller set.
/// Default-bearing columns that are not bound come back through `RETURNING`.
pub(crate) fn insert_column_set<M: Model>(
    whitelist: &[&str],
    non_zero_defaults: &[&'static str],
) -> OrmResult<(Vec<&'static str>, Vec<&'static str>)> {
    let bound: Vec<&'static str> = if whitelist.is_empty() {
        M::COLUMNS
            .iter()
            .copied()
            .filter(|c| !M::COLUMNS_WITH_DEFAULT.contains(c) || non_zero_defaults.contains(c))
            .collect()
    } else {
        M::resolve_columns(whitelist)?
    };
    let returning = M::COLUMNS_WITH_DEFAULT
        .iter()
        .copied()
        .filter(|c| !bound.contains(c))
        .collect();
    Ok((bound, returning))
}

fn push_insert_head(q: &mut Sql, table: &str, columns: &[&'static str]) {
    q.push("INSERT INTO ").push_quoted(table);
    if columns.is_empty() {
        q.push(" DEFAULT VALUES");
        return;
    }
    q.push(" (").push(&quote_list(columns)).push(") VALUES (");
    for i in 1..=columns.len() {
        if i > 1 {
            q.push(",");
        }
        q.push(&format!("${i}"));
    }
    q.push(")");
}

fn push_returning(q: &mut Sql, returning: &[&'static str]) {
    if !returning.is_empty() {
        q.push(" RETURNING ").push(&quote_list(returning));
    }
}

pub(crate) fn build_insert<M: Model>(
    whitelist: &[&str],
    non_zero_defaults: &[&'static str],
) -> OrmResult<InsertStatement> {
    let (bound, returning) = insert_column_set::<M>(whitelist, non_zero_defaults)?;
    let mut q = Sql::empty();
    push_insert_head(&mut q, M::TABLE, &bound);
    push_returning(&mut q, &returning);
    Ok(InsertStatement {
        sql: q.to_sql(),
        value_columns: bound,
        returning_columns: returning,
    })
}

pub(crate) fn build_update<M: Model>(whitelist: &[&str]) -> OrmResult<UpdateStatement> {
    let set = if whitelist.is_empty() {
        M::non_pk_columns()
    } else {
        M::resolve_columns(whitelist)?
    };
    if set.is_empty() {
        return Err(OrmError::validation("could not build whitelist"));
    }

    let mut sql = format!("UPDATE {} SET ", quote(M::TABLE));
    let mut idx = 0;
    for (i, col) in set.iter().enumerate() {
        idx += 1;
        if i > 0 {
            sql.push(',');
        }
        sql.push_str(&format!("{}=${idx}", quote(col)));
    }
    sql.push_str(" WHERE ");
    for (i, col) in M::PRIMARY_KEY.iter().enumerate() {
        idx += 1;
        if i > 0 {
            sql.push_str(" AND ");
        }
        sql.push_str(&format!("{}=${idx}", quote(col)));
    }

    let mut value_columns = set;
    value_columns.extend_from_slice(M::PRIMARY_KEY);
    Ok(UpdateStatement { sql, value_columns })
}

pub(crate) fn build_upsert<M: Model>(
    opts: &UpsertOptions<'_>,
    non_zero_defaults: &[&'static str],
) -> OrmResult<InsertStatement> {
    let (bound, returning) = insert_column_set::<M>(opts.whitelist, non_zero_defaults)?;
    let update = if opts.update_columns.is_empty() {
        M::non_pk_columns()
    } else {
        M::resolve_columns(opts.update_columns)?
    };
    if opts.update_on_conflict && update.is_empty() {
        return Err(OrmError::validation("could not build update column list"));
    }
    let conflict = if opts.conflict_columns.is_empty() {
        M::PRIMARY_KEY.to_vec()
    } else {
        M::resolve_columns(opts.conflict_columns)?
    };

    let mut q = Sql::empty();
    push_insert_head(&mut q, M::TABLE, &bound);
    q.push(" ON CONFLICT ");
    if !opts.update_on_conflict {
        q.push("DO NOTHING");
    } else {
        q.push("(").push(&quote_list(&conflict)).push(") DO UPDATE SET ");
        for (i, col) in update.iter().enumerate() {
            if i > 0 {
                q.push(",");
            }
            let col = quote(col);
            q.push(&format!("{col} = EXCLUDED.{col}"));
        }
    }
    push_returning(&mut q, &returning);

    Ok(InsertStatement {
        sql: q.to_sql(),
        value_columns: bound,
        returning_columns: returning,
    })
}

/// Insert `model`, reading database defaults back into it.
pub async fn insert<M: Model>(
    conn: &impl GenericClient,
    model: &mut M,
    whitelist: &[&str],
) -> OrmResult<()> {
    model.touch(now(), Touch::Insert);
    let nz = model.non_zero_defaults();
    let key = cache_key(&[whitelist, &nz[..]]);
    let cache = &M::cache().insert;

    let context = || format!("kmodels: unable to insert into {}", M::TABLE);
    let (stmt, cached) = match cache.get(&key) {
        Some(stmt) => (stmt, true),
        None => (Arc::new(build_insert::<M>(whitelist, &nz).with_context(context)?), false),
    };

    let params = model.values(&stmt.value_columns).with_context(context)?;
    write_returning(conn, model, &stmt, &params)
        .await
        .with_context(context)?;

    if !cached {
        cache.insert(key, stmt);
    }
    Ok(())
}

async fn write_returning<M: Model>(
    conn: &impl GenericClient,
    model: &mut M,
    stmt: &InsertStatement,
    params: &[Param],
) -> OrmResult<()> {
    if stmt.returning_columns.is_empty() {
        conn.execute(&stmt.sql, &as_refs(params)).await?;
        return Ok(());
    }
    // `DO NOTHING` upserts return no row when the conflict hits.
    if let Some(row) = conn.query_opt(&stmt.sql, &as_refs(params)).await? {
        model.assign_from_row(&row)?;
    }
    Ok(())
}

/// Update `model` by primary key. An empty whitelist updates every non-key column.
pub async fn update<M: Model>(
    conn: &impl GenericClient,
    model: &mut M,
    whitelist: &[&str],
) -> OrmResult<u64> {
    model.touch(now(), Touch::Update);
    let key = cache_key(&[whitelist]);
    let cache = &M::cache().update;

    let context = || format!("kmodels: unable to update {}", M::TABLE);
    let (stmt, cached) = match cache.get(&key) {
        Some(stmt) => (stmt, true),
        None => (Arc::new(build_update::<M>(whitelist).with_context(context)?), false),
    };

    let params = model.values(&stmt.value_columns).with_context(context)?;
    let affected = conn
        .execute(&stmt.sql, &as_refs(&params))
        .await
        .with_context(context)?;

    if !cached {
        cache.insert(key, stmt);
    }
    Ok(affected)
}

/// Insert `model`, or resolve the conflict as `opts` says.
pub async fn upsert<M: Model>(
    conn: &impl GenericClient,
    model: &mut M,
    opts: &UpsertOptions<'_>,
) -> OrmResult<()> {
    model.touch(now(), Touch::Upsert);
    let nz = model.non_zero_defaults();
    let flag = if opts.update_on_conflict { "t" } else { "f" };
    let key = cache_key(&[
        &[flag][..],
        opts.conflict_columns,
        opts.update_columns,
        opts.whitelist,
        &nz[..],
    ]);
    let cache = &M::cache().upsert;

    let context = || format!("kmodels: unable to upsert {}", M::TABLE);
    let (stmt, cached) = match cache.get(&key) {
        Some(stmt) => (stmt, true),
        None => (Arc::new(build_upsert::<M>(opts, &nz).with_context(context)?), false),
    };

    let params = model.values(&stmt.value_columns).with_context(context)?;
    write_returning(conn, model, &stmt, &params)
        .await
        .with_context(context)?;

    if !cached {
        cache.insert(key, stmt);
    }
    Ok(())
}

fn push_pk_match<M: Model>(q: &mut Sql, pk: Vec<Param>) {
    for (i, (col, value)) in M::PRIMARY_KEY.iter().zip(pk).enumerate() {
        q.push(if i == 0 { " WHERE " } else { " AND " });
        q.push_quoted(col).push("=").push_param(value);
    }
}

/// Delete a single row by primary key.
pub async fn delete<M: Model>(conn: &impl GenericClient, model: &M) -> OrmResult<u64> {
    let context = || format!("kmodels: unable to delete from {}", M::TABLE);
    let mut q = sql("DELETE FROM ");
    q.push_quoted(M::TABLE);
    push_pk_match::<M>(&mut q, model.pk_values().with_context(context)?);
    q.execute(conn).await.with_context(context)
}

/// Fetch a row by primary key. `columns` limits the select list; empty means all.
pub async fn find<M: Model>(
    conn: &impl GenericClient,
    pk: Vec<Param>,
    columns: &[&str],
) -> OrmResult<M> {
    let context = || format!("kmodels: unable to select from {}", M::TABLE);
    let mut q = sql("SELECT ");
    if columns.is_empty() {
        q.push("*");
    } else {
        let columns = M::resolve_columns(columns).with_context(context)?;
        q.push(&quote_list(&columns));
    }
    q.push(" FROM ").push_quoted(M::TABLE);
    push_pk_match::<M>(&mut q, pk);

    match q.fetch_opt_as::<M>(conn).await.with_context(context)? {
        Some(found) => Ok(found),
        None => Err(OrmError::not_found(format!("{} not found", M::TABLE))),
    }
}

/// Whether a row with this primary key exists.
pub async fn exists<M: Model>(conn: &impl GenericClient, pk: Vec<Param>) -> OrmResult<bool> {
    let mut q = sql("SELECT EXISTS(SELECT 1 FROM ");
    q.push_quoted(M::TABLE);
    push_pk_match::<M>(&mut q, pk);
    q.push(" LIMIT 1)");
    q.fetch_scalar::<bool>(conn)
        .await
        .with_context(|| format!("kmodels: unable to check if {} exists", M::TABLE))
}

/// Refetch `model` by primary key, keeping loaded relationships.
pub async fn reload<M: Model>(conn: &impl GenericClient, model: &mut M) -> OrmResult<()> {
    let fresh = find::<M>(conn, model.pk_values()?, &[]).await?;
    model.replace_columns(fresh);
    Ok(())
}

/// ` WHERE ("pk") IN (($1),($2))` over every row of `models`.
fn push_pk_in<M: Model>(q: &mut Sql, models: &[M]) -> OrmResult<()> {
    q.push(" WHERE (")
        .push(&quote_list(M::PRIMARY_KEY))
        .push(") IN (");
    for (i, m) in models.iter().enumerate() {
        if i > 0 {
            q.push(",");
        }
        q.push("(").push_param_list(m.pk_values()?).push(")");
    }
    q.push(")");
    Ok(())
}

/// Delete every row of `models` by primary key.
pub async fn delete_all<M: Model>(conn: &impl GenericClient, models: &[M]) -> OrmResult<u64> {
    if models.is_empty() {
        return Ok(0);
    }
    let context = || format!("kmodels: unable to delete all from {} slice", M::TABLE);
    let mut q = sql("DELETE FROM ");
    q.push_quoted(M::TABLE);
    push_pk_in(&mut q, models).with_context(context)?;
    q.execute(conn).await.with_context(context)
}

pub(crate) fn push_set_list<M: Model>(q: &mut Sql, columns: &[(&str, Param)]) -> OrmResult<()> {
    if columns.is_empty() {
        return Err(OrmError::validation(
            "update all requires at least one column argument",
        ));
    }
    let names: Vec<&str> = columns.iter().map(|(c, _)| *c).collect();
    let resolved = M::resolve_columns(&names)?;
    q.push(" SET ");
    for (i, (col, (_, value))) in resolved.iter().zip(columns).enumerate() {
        if i > 0 {
            q.push(", ");
        }
        q.push_quoted(col).push(" = ").push_param(value.clone());
    }
    Ok(())
}

/// Apply the same column values to every row of `models`.
pub async fn update_all<M: Model>(
    conn: &impl GenericClient,
    models: &[M],
    columns: &[(&str, Param)],
) -> OrmResult<u64> {
    let context = || format!("kmodels: unable to update all in {} slice", M::TABLE);
    let mut q = sql("UPDATE ");
    q.push_quoted(M::TABLE);
    push_set_list::<M>(&mut q, columns).with_context(context)?;
    if models.is_empty() {
        return Ok(0);
    }
    push_pk_in(&mut q, models).with_context(context)?;
    q.execute(conn).await.with_context(context)
}

/// Refetch every row of `models` in one query.
///
/// Rows keep their position and loaded relationships; rows that no longer exist
/// are dropped.
pub async fn reload_all<M: Model>(conn: &impl GenericClient, models: &mut Vec<M>) -> OrmResult<()> {
    if models.is_empty() {
        return Ok(());
    }
    let context = || format!("kmodels: unable to reload all in {} slice", M::TABLE);
    let mut q = sql("SELECT * FROM ");
    q.push_quoted(M::TABLE);
    push_pk_in(&mut q, models).with_context(context)?;
    let mut fresh: Vec<M> = q.fetch_all_as(conn).await.with_context(context)?;

    models.retain_mut(|m| match fresh.iter().position(|f| f.same_pk(m)) {
        Some(pos) => {
            m.replace_columns(fresh.swap_remove(pos));
            true
        }
        None => false,
    });
    Ok(())
}

/// Slice-level operations on `Vec<M>`.
pub trait ModelSlice {
    /// Delete every row by primary key. An empty slice is a no-op.
    fn delete_all(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Set the given columns on every row. Requires at least one column.
    fn update_all(
        &self,
        conn: &impl GenericClient,
        columns: &[(&str, Param)],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Refetch every row from the database.
    fn reload_all(
        &mut self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<()>> + Send;
}

impl<M: Model> ModelSlice for Vec<M> {
    async fn delete_all(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        delete_all(conn, self).await
    }

    async fn update_all(
        &self,
        conn: &impl GenericClient,
        columns: &[(&str, Param)],
    ) -> OrmResult<u64> {
        update_all(conn, self, columns).await
    }

    async fn reload_all(&mut self, conn: &impl GenericClient) -> OrmResult<()> {
        reload_all(conn, self).await
    }
}
