//! Relationship plumbing: batch eager loading and association writes.
//!
//! Loaders run exactly one extra query per relation (`= ANY($1)` over the
//! de-duplicated keys) and hand the matches to an `attach` callback, which stores
//! them in the row's relationship struct and wires up back-references.

use crate::client::GenericClient;
use crate::error::{OrmResult, ResultExt};
use crate::ident::quote;
use crate::model::Model;
use crate::row::RowExt;
use crate::sql::{Param, sql};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tokio_postgres::types::{FromSqlOwned, ToSql};

pub type HasManyMap<K, T> = HashMap<K, Vec<T>>;
pub type BelongsToMap<K, T> = HashMap<K, T>;

const MANY_TO_MANY_PARENT_KEY_ALIAS: &str = "__kmedia_parent_key";

/// Bound for relationship key types (`i32` ids, `String` codes).
pub trait RelKey: ToSql + FromSqlOwned + Eq + Hash + Clone + Send + Sync + 'static {}

impl<K> RelKey for K where K: ToSql + FromSqlOwned + Eq + Hash + Clone + Send + Sync + 'static {}

fn dedup<K: Eq + Hash>(keys: Vec<K>) -> Vec<K> {
    keys.into_iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect()
}

/// Rows of `T` whose `key_col` is one of `keys`, keyed by that column.
pub async fn load_belongs_to_map<T, K>(
    conn: &impl GenericClient,
    key_col: &str,
    keys: Vec<K>,
) -> OrmResult<BelongsToMap<K, T>>
where
    T: Model,
    K: RelKey,
{
    let keys = dedup(keys);
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let mut q = sql("SELECT * FROM ");
    q.push_quoted(T::TABLE).push(" WHERE ").push_quoted(key_col);
    q.push(" = ANY(").push_bind(keys).push(")");

    let rows = q
        .fetch_all(conn)
        .await
        .with_context(|| format!("kmodels: failed to eager load {}", T::TABLE))?;
    let mut out = HashMap::new();
    for row in rows {
        let key: Option<K> = row.try_get_column(key_col)?;
        let Some(key) = key else { continue };
        out.insert(key, T::from_row(&row)?);
    }
    Ok(out)
}

/// Rows of `T` whose foreign key `fk_col` is one of `keys`, grouped by it.
pub async fn load_has_many_map<T, K>(
    conn: &impl GenericClient,
    fk_col: &str,
    keys: Vec<K>,
) -> OrmResult<HasManyMap<K, T>>
where
    T: Model,
    K: RelKey,
{
    let keys = dedup(keys);
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let mut q = sql("SELECT * FROM ");
    q.push_quoted(T::TABLE).push(" WHERE ").push_quoted(fk_col);
    q.push(" = ANY(").push_bind(keys).push(")");

    let rows = q
        .fetch_all(conn)
        .await
        .with_context(|| format!("kmodels: failed to eager load {}", T::TABLE))?;
    let mut out: HasManyMap<K, T> = HashMap::new();
    for row in rows {
        let fk: Option<K> = row.try_get_column(fk_col)?;
        let Some(fk) = fk else { continue };
        out.entry(fk).or_default().push(T::from_row(&row)?);
    }
    Ok(out)
}

/// A many-to-many hop through a join table.
#[derive(Debug, Clone, Copy)]
pub struct JoinTable {
    pub table: &'static str,
    /// Join column pointing at the local side.
    pub local_col: &'static str,
    /// Join column pointing at the related side.
    pub foreign_col: &'static str,
}

impl JoinTable {
    pub const fn new(
        table: &'static str,
        local_col: &'static str,
        foreign_col: &'static str,
    ) -> Self {
        Self {
            table,
            local_col,
            foreign_col,
        }
    }

    /// The same join table seen from the other side.
    pub const fn reversed(self) -> Self {
        Self {
            table: self.table,
            local_col: self.foreign_col,
            foreign_col: self.local_col,
        }
    }

    /// `"jt" ON "t"."id" = "jt"."foreign_col"`, for [`Query::through`](crate::Query::through).
    pub fn join_clause<T: Model>(&self) -> String {
        format!(
            "{jt} ON {t}.{pk} = {jt}.{fc}",
            jt = quote(self.table),
            t = quote(T::TABLE),
            pk = quote(T::PRIMARY_KEY[0]),
            fc = quote(self.foreign_col),
        )
    }
}

/// Related rows reachable through `jt` from any of `keys`, grouped by local key.
pub async fn load_many_to_many_map<T, K>(
    conn: &impl GenericClient,
    jt: JoinTable,
    keys: Vec<K>,
) -> OrmResult<HasManyMap<K, T>>
where
    T: Model,
    K: RelKey,
{
    let keys = dedup(keys);
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let mut q = sql("SELECT jt.");
    q.push_quoted(jt.local_col)
        .push(" AS ")
        .push_quoted(MANY_TO_MANY_PARENT_KEY_ALIAS)
        .push(", ")
        .push_quoted(T::TABLE)
        .push(".* FROM ")
        .push_quoted(T::TABLE)
        .push(" INNER JOIN ")
        .push_quoted(jt.table)
        .push(" jt ON jt.")
        .push_quoted(jt.foreign_col)
        .push(" = ")
        .push_quoted(T::TABLE)
        .push(".")
        .push_quoted(T::PRIMARY_KEY[0])
        .push(" WHERE jt.")
        .push_quoted(jt.local_col)
        .push(" = ANY(")
        .push_bind(keys)
        .push(")");

    let rows = q
        .fetch_all(conn)
        .await
        .with_context(|| format!("kmodels: failed to eager load {}", T::TABLE))?;
    let mut out: HasManyMap<K, T> = HashMap::new();
    for row in rows {
        let key: K = row.try_get_column(MANY_TO_MANY_PARENT_KEY_ALIAS)?;
        out.entry(key).or_default().push(T::from_row(&row)?);
    }
    Ok(out)
}

/// Eager load a to-one relation for every row of `locals`.
///
/// `attach` runs once per local row that found its target.
pub async fn load_to_one<L, T, K>(
    conn: &impl GenericClient,
    locals: &mut [L],
    target_key: &str,
    local_key: impl Fn(&L) -> Option<K>,
    attach: impl Fn(&mut L, T),
) -> OrmResult<()>
where
    T: Model,
    K: RelKey,
{
    let keys: Vec<K> = locals.iter().filter_map(&local_key).collect();
    let found = load_belongs_to_map::<T, K>(conn, target_key, keys).await?;
    for local in locals.iter_mut() {
        if let Some(target) = local_key(local).and_then(|k| found.get(&k)) {
            attach(local, target.clone());
        }
    }
    Ok(())
}

/// Eager load a one-to-many relation for every row of `locals`.
///
/// `attach` runs for every local row, with an empty list when nothing matched.
pub async fn load_to_many<L, T, K>(
    conn: &impl GenericClient,
    locals: &mut [L],
    fk_col: &str,
    local_key: impl Fn(&L) -> Option<K>,
    attach: impl Fn(&mut L, Vec<T>),
) -> OrmResult<()>
where
    T: Model,
    K: RelKey,
{
    let keys: Vec<K> = locals.iter().filter_map(&local_key).collect();
    let found = load_has_many_map::<T, K>(conn, fk_col, keys).await?;
    for local in locals.iter_mut() {
        let related = local_key(local)
            .and_then(|k| found.get(&k).cloned())
            .unwrap_or_default();
        attach(local, related);
    }
    Ok(())
}

/// Eager load a many-to-many relation for every row of `locals`.
pub async fn load_many_to_many<L, T, K>(
    conn: &impl GenericClient,
    locals: &mut [L],
    jt: JoinTable,
    local_key: impl Fn(&L) -> Option<K>,
    attach: impl Fn(&mut L, Vec<T>),
) -> OrmResult<()>
where
    T: Model,
    K: RelKey,
{
    let keys: Vec<K> = locals.iter().filter_map(&local_key).collect();
    let found = load_many_to_many_map::<T, K>(conn, jt, keys).await?;
    for local in locals.iter_mut() {
        let related = local_key(local)
            .and_then(|k| found.get(&k).cloned())
            .unwrap_or_default();
        attach(local, related);
    }
    Ok(())
}

/// `UPDATE "t" SET "fk"=$1 WHERE "pk"=$2` for one row of `M`.
pub async fn set_foreign_key<M: Model>(
    conn: &impl GenericClient,
    row: &M,
    fk_col: &str,
    value: Param,
) -> OrmResult<u64> {
    let context = || format!("kmodels: failed to update {} foreign key", M::TABLE);
    let mut q = sql("UPDATE ");
    q.push_quoted(M::TABLE)
        .push(" SET ")
        .push_quoted(fk_col)
        .push("=")
        .push_param(value);
    for (i, (col, pk)) in M::PRIMARY_KEY
        .iter()
        .zip(row.pk_values().with_context(context)?)
        .enumerate()
    {
        q.push(if i == 0 { " WHERE " } else { " AND " });
        q.push_quoted(col).push("=").push_param(pk);
    }
    q.execute(conn).await.with_context(context)
}

/// `UPDATE "t" SET "fk" = NULL WHERE "fk" = $1`: detach every `T` pointing at `value`.
pub async fn clear_foreign_keys<T: Model>(
    conn: &impl GenericClient,
    fk_col: &str,
    value: Param,
) -> OrmResult<u64> {
    let mut q = sql("UPDATE ");
    q.push_quoted(T::TABLE)
        .push(" SET ")
        .push_quoted(fk_col)
        .push(" = NULL WHERE ")
        .push_quoted(fk_col)
        .push(" = ")
        .push_param(value);
    q.execute(conn)
        .await
        .context("kmodels: failed to remove relationships before set")
}

/// Insert one join row per related key.
pub async fn insert_join_rows(
    conn: &impl GenericClient,
    jt: JoinTable,
    local: Param,
    related: Vec<Param>,
) -> OrmResult<()> {
    for foreign in related {
        let mut q = sql("INSERT INTO ");
        q.push_quoted(jt.table)
            .push(" (")
            .push_quoted(jt.local_col)
            .push(",")
            .push_quoted(jt.foreign_col)
            .push(") VALUES (")
            .push_param(local.clone())
            .push(",")
            .push_param(foreign)
            .push(")");
        q.execute(conn)
            .await
            .context("kmodels: unable to insert into join table")?;
    }
    Ok(())
}

/// Delete join rows for `local`; all of them when `related` is `None`.
pub async fn delete_join_rows(
    conn: &impl GenericClient,
    jt: JoinTable,
    local: Param,
    related: Option<Vec<Param>>,
) -> OrmResult<u64> {
    let mut q = sql("DELETE FROM ");
    q.push_quoted(jt.table)
        .push(" WHERE ")
        .push_quoted(jt.local_col)
        .push(" = ")
        .push_param(local);
    if let Some(related) = related {
        if related.is_empty() {
            return Ok(0);
        }
        q.push(" AND ")
            .push_quoted(jt.foreign_col)
            .push(" IN (")
            .push_param_list(related)
            .push(")");
    }
    q.execute(conn)
        .await
        .context("kmodels: unable to delete join table rows")
}

/// Remove the first row of `list` with the same primary key as `row` (swap-remove).
pub fn remove_by_pk<T: Model>(list: &mut Vec<T>, row: &T) -> Option<T> {
    let pos = list.iter().position(|r| r.same_pk(row))?;
    Some(list.swap_remove(pos))
}

/// Drop every row of `list` whose primary key matches one of `rows`, keeping order.
pub fn retain_not_in<T: Model>(list: &mut Vec<T>, rows: &[T]) {
    list.retain(|r| !rows.iter().any(|x| x.same_pk(r)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PanicClient, RecordingClient, Widget};
    use std::sync::Arc;

    const WIDGET_PARTS: JoinTable = JoinTable::new("widgets_parts", "widget_id", "part_id");

    fn widget(id: i32) -> Widget {
        Widget {
            id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn loaders_skip_the_database_without_keys() {
        let mut none: Vec<Widget> = Vec::new();
        load_to_one::<Widget, Widget, i32>(&PanicClient, &mut none, "id", |_| None, |_, _| {})
            .await
            .unwrap();

        let mut orphans = vec![widget(1), widget(2)];
        let by_label =
            load_belongs_to_map::<Widget, String>(&PanicClient, "label", Vec::new()).await;
        assert!(by_label.unwrap().is_empty());

        load_to_many::<Widget, Widget, i32>(
            &PanicClient,
            &mut orphans,
            "ordnum",
            |_| None,
            |w, parts| w.r.parts = parts,
        )
        .await
        .unwrap();
        assert!(orphans.iter().all(|w| w.r.parts.is_empty()));

        load_many_to_many::<Widget, Widget, i32>(
            &PanicClient,
            &mut orphans,
            WIDGET_PARTS,
            |_| None,
            |w, parts| w.r.parts = parts,
        )
        .await
        .unwrap();
    }

    #[test]
    fn keys_are_deduplicated() {
        let mut keys = dedup(vec![3, 1, 3, 2, 1]);
        keys.sort();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn join_table_sides() {
        let rev = WIDGET_PARTS.reversed();
        assert_eq!((rev.local_col, rev.foreign_col), ("part_id", "widget_id"));
        assert_eq!(
            WIDGET_PARTS.join_clause::<Widget>(),
            "\"widgets_parts\" ON \"widgets\".\"id\" = \"widgets_parts\".\"part_id\""
        );
    }

    #[tokio::test]
    async fn association_writes() {
        let conn = RecordingClient::default();
        set_foreign_key(&conn, &widget(4), "ordnum", Arc::new(Some(9))).await.unwrap();
        clear_foreign_keys::<Widget>(&conn, "ordnum", Arc::new(9)).await.unwrap();
        insert_join_rows(
            &conn,
            WIDGET_PARTS,
            Arc::new(1),
            vec![Arc::new(2) as Param, Arc::new(3) as Param],
        )
        .await
        .unwrap();
        delete_join_rows(&conn, WIDGET_PARTS, Arc::new(1), Some(vec![Arc::new(2) as Param]))
            .await
            .unwrap();
        delete_join_rows(&conn, WIDGET_PARTS, Arc::new(1), None).await.unwrap();

        let sent: Vec<String> = conn.statements().into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            sent,
            vec![
                "UPDATE \"widgets\" SET \"ordnum\"=$1 WHERE \"id\"=$2",
                "UPDATE \"widgets\" SET \"ordnum\" = NULL WHERE \"ordnum\" = $1",
                "INSERT INTO \"widgets_parts\" (\"widget_id\",\"part_id\") VALUES ($1,$2)",
                "INSERT INTO \"widgets_parts\" (\"widget_id\",\"part_id\") VALUES ($1,$2)",
                "DELETE FROM \"widgets_parts\" WHERE \"widget_id\" = $1 AND \"part_id\" IN ($2)",
                "DELETE FROM \"widgets_parts\" WHERE \"widget_id\" = $1",
            ]
        );
    }

    #[tokio::test]
    async fn removing_no_join_rows_is_a_no_op() {
        let n = delete_join_rows(&PanicClient, WIDGET_PARTS, Arc::new(1), Some(Vec::new()))
            .await
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn list_helpers_match_by_primary_key() {
        let mut list = vec![widget(1), widget(2), widget(3)];
        let removed = remove_by_pk(&mut list, &widget(1)).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(list.iter().map(|w| w.id).collect::<Vec<_>>(), vec![3, 2]);
        assert!(remove_by_pk(&mut list, &widget(7)).is_none());

        let mut list = vec![widget(1), widget(2), widget(3)];
        retain_not_in(&mut list, &[widget(2)]);
        assert_eq!(list.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 3]);
    }
}
