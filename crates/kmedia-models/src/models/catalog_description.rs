//! `catalog_descriptions`: per-language names of a catalog.

use crate::models::{Catalog, Language};
use chrono::NaiveDateTime;
use kmedia_orm::relation::{load_to_one, remove_by_pk, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDescription {
    pub id: i32,
    pub catalog_id: i32,
    pub name: Option<String>,
    pub lang_id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: CatalogDescriptionRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogDescriptionRels {
    pub catalog: Option<Box<Catalog>>,
    pub lang: Option<Box<Language>>,
}

kmedia_orm::impl_model! {
    CatalogDescription {
        table: "catalog_descriptions",
        rels: CatalogDescriptionRels,
        primary_key: [id: i32],
        columns: [id, catalog_id, name, lang_id, created_at, updated_at],
        defaults: [id],
        timestamps: (created_at, updated_at),
    }
}

impl CatalogDescription {
    /// The described catalog.
    pub fn catalog(&self) -> Query<Catalog> {
        Catalog::query().where_eq("id", self.catalog_id)
    }

    /// The language, matched on `languages.code3`.
    pub fn lang(&self) -> Query<Language> {
        Language::query().where_eq("code3", self.lang_id.clone())
    }

    pub async fn load_catalog(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |d: &Self| Some(d.catalog_id),
            |d: &mut Self, mut catalog: Catalog| {
                catalog.r.catalog_descriptions.push(d.detached());
                d.r.catalog = Some(Box::new(catalog));
            },
        )
        .await
    }

    pub async fn load_lang(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "code3",
            |d: &Self| d.lang_id.clone(),
            |d: &mut Self, mut lang: Language| {
                lang.r.lang_catalog_descriptions.push(d.detached());
                d.r.lang = Some(Box::new(lang));
            },
        )
        .await
    }

    /// Attach this description to `related`, inserting `related` first when `insert` is set.
    pub async fn set_catalog(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut Catalog,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "catalog_id", Arc::new(related.id)).await?;
        self.catalog_id = related.id;
        self.r.catalog = Some(Box::new(related.detached()));
        related.r.catalog_descriptions.push(self.detached());
        Ok(())
    }

    pub async fn set_lang(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut Language,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "lang_id", Arc::new(related.code3.clone())).await?;
        self.lang_id = related.code3.clone();
        self.r.lang = Some(Box::new(related.detached()));
        related.r.lang_catalog_descriptions.push(self.detached());
        Ok(())
    }

    /// Clear `lang_id` and drop this row from `related`'s loaded descriptions.
    pub async fn remove_lang(
        &mut self,
        conn: &impl GenericClient,
        related: &mut Language,
    ) -> OrmResult<()> {
        self.lang_id = None;
        self.update(conn, &["lang_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.lang = None;
        remove_by_pk(&mut related.r.lang_catalog_descriptions, self);
        Ok(())
    }
}
