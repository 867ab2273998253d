//! `impl_model!`: the per-table glue between a plain struct and the runtime.
//!
//! The struct itself is written by hand (so field types, derives and docs stay
//! visible); the macro adds [`FromRow`](crate::FromRow), [`Model`](crate::Model) and
//! the inherent CRUD entry points. The struct must have one field per listed
//! column, named exactly like the column, plus a relationship field `r`.
//!
//! ```ignore
//! #[derive(Debug, Clone, Default, PartialEq)]
//! pub struct Lecturer {
//!     pub id: i32,
//!     pub name: String,
//!     pub ordnum: i32,
//!     pub created_at: Option<NaiveDateTime>,
//!     pub updated_at: Option<NaiveDateTime>,
//!     pub r: LecturerRels,
//! }
//!
//! kmedia_orm::impl_model! {
//!     Lecturer {
//!         table: "lecturers",
//!         rels: LecturerRels,
//!         primary_key: [id: i32],
//!         columns: [id, name, ordnum, created_at, updated_at],
//!         defaults: [id, name, ordnum],
//!         timestamps: (created_at, updated_at),
//!     }
//! }
//! ```

#[macro_export]
macro_rules! impl_model {
    (
        $model:ident {
            table: $table:literal,
            rels: $rels:ty,
            primary_key: [$($pk:ident: $pkty:ty),+ $(,)?],
            columns: [$($col:ident),+ $(,)?],
            defaults: [$($def:ident),* $(,)?],
            $(timestamps: ($created:ident, $updated:ident),)?
        }
    ) => {
        impl $crate::FromRow for $model {
            fn from_row(row: &$crate::__private::Row) -> $crate::OrmResult<Self> {
                use $crate::RowExt as _;
                Ok(Self {
                    $($col: row.get_or_default(stringify!($col))?,)+
                    r: ::core::default::Default::default(),
                })
            }
        }

        impl $crate::Model for $model {
            type Rels = $rels;

            const TABLE: &'static str = $table;
            const COLUMNS: &'static [&'static str] = &[$(stringify!($col)),+];
            const COLUMNS_WITH_DEFAULT: &'static [&'static str] = &[$(stringify!($def)),*];
            const PRIMARY_KEY: &'static [&'static str] = &[$(stringify!($pk)),+];

            fn cache() -> &'static $crate::cache::TableCache {
                static CACHE: ::std::sync::LazyLock<$crate::cache::TableCache> =
                    ::std::sync::LazyLock::new($crate::cache::TableCache::new);
                &CACHE
            }

            fn value(&self, column: &str) -> Option<$crate::Param> {
                match column {
                    $(stringify!($col) => Some(::std::sync::Arc::new(self.$col.clone()) as $crate::Param),)+
                    _ => None,
                }
            }

            fn is_zero(&self, column: &str) -> bool {
                match column {
                    $(stringify!($col) => $crate::model::IsZero::is_zero(&self.$col),)+
                    _ => true,
                }
            }

            fn assign_from_row(&mut self, row: &$crate::__private::Row) -> $crate::OrmResult<()> {
                use $crate::RowExt as _;
                for column in row.columns() {
                    match column.name() {
                        $(stringify!($col) => self.$col = row.try_get_column(stringify!($col))?,)+
                        _ => {}
                    }
                }
                Ok(())
            }

            fn rels(&self) -> &Self::Rels {
                &self.r
            }

            fn rels_mut(&mut self) -> &mut Self::Rels {
                &mut self.r
            }

            fn detached(&self) -> Self {
                Self {
                    $($col: self.$col.clone(),)+
                    r: ::core::default::Default::default(),
                }
            }

            fn same_pk(&self, other: &Self) -> bool {
                true $(&& self.$pk == other.$pk)+
            }

            $(
                fn touch(&mut self, now: $crate::__private::NaiveDateTime, touch: $crate::Touch) {
                    $crate::model::stamp(&mut self.$created, &mut self.$updated, now, touch);
                }
            )?
        }

        impl $model {
            /// A query over every row of this table.
            pub fn query() -> $crate::Query<Self> {
                $crate::Query::new()
            }

            /// Fetch one row by primary key.
            pub async fn find(
                conn: &impl $crate::GenericClient,
                $($pk: $pkty),+
            ) -> $crate::OrmResult<Self> {
                $crate::crud::find(
                    conn,
                    vec![$(::std::sync::Arc::new($pk.to_owned()) as $crate::Param),+],
                    &[],
                )
                .await
            }

            /// Fetch one row by primary key, selecting only `columns`.
            pub async fn find_with(
                conn: &impl $crate::GenericClient,
                $($pk: $pkty,)+
                columns: &[&str],
            ) -> $crate::OrmResult<Self> {
                $crate::crud::find(
                    conn,
                    vec![$(::std::sync::Arc::new($pk.to_owned()) as $crate::Param),+],
                    columns,
                )
                .await
            }

            pub async fn exists(
                conn: &impl $crate::GenericClient,
                $($pk: $pkty),+
            ) -> $crate::OrmResult<bool> {
                $crate::crud::exists::<Self>(
                    conn,
                    vec![$(::std::sync::Arc::new($pk.to_owned()) as $crate::Param),+],
                )
                .await
            }

            pub async fn all(conn: &impl $crate::GenericClient) -> $crate::OrmResult<Vec<Self>> {
                Self::query().all(conn).await
            }

            pub async fn count(conn: &impl $crate::GenericClient) -> $crate::OrmResult<i64> {
                Self::query().count(conn).await
            }

            /// Insert this row. An empty whitelist binds every column without a
            /// database default plus the defaulted columns already set.
            pub async fn insert(
                &mut self,
                conn: &impl $crate::GenericClient,
                whitelist: &[&str],
            ) -> $crate::OrmResult<()> {
                $crate::crud::insert(conn, self, whitelist).await
            }

            /// Update this row by primary key. An empty whitelist updates every
            /// non-key column. Returns the number of rows affected.
            pub async fn update(
                &mut self,
                conn: &impl $crate::GenericClient,
                whitelist: &[&str],
            ) -> $crate::OrmResult<u64> {
                $crate::crud::update(conn, self, whitelist).await
            }

            pub async fn upsert(
                &mut self,
                conn: &impl $crate::GenericClient,
                opts: &$crate::UpsertOptions<'_>,
            ) -> $crate::OrmResult<()> {
                $crate::crud::upsert(conn, self, opts).await
            }

            pub async fn delete(&self, conn: &impl $crate::GenericClient) -> $crate::OrmResult<u64> {
                $crate::crud::delete(conn, self).await
            }

            /// Refetch the column values, keeping loaded relationships.
            pub async fn reload(&mut self, conn: &impl $crate::GenericClient) -> $crate::OrmResult<()> {
                $crate::crud::reload(conn, self).await
            }
        }
    };
}
