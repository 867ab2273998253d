//! `languages`: other tables refer to a language by its `code3`.

use crate::models::{CatalogDescription, Container, ContainerDescription, FileAsset};
use kmedia_orm::relation::{clear_foreign_keys, load_to_many, retain_not_in, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: i32,
    pub locale: Option<String>,
    pub code3: Option<String>,
    pub language: Option<String>,
    #[serde(skip)]
    pub r: LanguageRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageRels {
    pub lang_catalog_descriptions: Vec<CatalogDescription>,
    pub lang_container_descriptions: Vec<ContainerDescription>,
    pub lang_containers: Vec<Container>,
    pub lang_file_assets: Vec<FileAsset>,
}

kmedia_orm::impl_model! {
    Language {
        table: "languages",
        rels: LanguageRels,
        primary_key: [id: i32],
        columns: [id, locale, code3, language],
        defaults: [id],
    }
}

impl Language {
    pub fn lang_catalog_descriptions(&self) -> Query<CatalogDescription> {
        CatalogDescription::query().where_eq("lang_id", self.code3.clone())
    }

    pub fn lang_container_descriptions(&self) -> Query<ContainerDescription> {
        ContainerDescription::query().where_eq("lang_id", self.code3.clone())
    }

    pub fn lang_containers(&self) -> Query<Container> {
        Container::query().where_eq("lang_id", self.code3.clone())
    }

    pub fn lang_file_assets(&self) -> Query<FileAsset> {
        FileAsset::query().where_eq("lang_id", self.code3.clone())
    }

    pub async fn load_lang_catalog_descriptions(
        conn: &impl GenericClient,
        rows: &mut [Self],
    ) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "lang_id",
            |l: &Self| l.code3.clone(),
            |l: &mut Self, mut found: Vec<CatalogDescription>| {
                for d in &mut found {
                    d.r.lang = Some(Box::new(l.detached()));
                }
                l.r.lang_catalog_descriptions = found;
            },
        )
        .await
    }

    pub async fn load_lang_container_descriptions(
        conn: &impl GenericClient,
        rows: &mut [Self],
    ) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "lang_id",
            |l: &Self| l.code3.clone(),
            |l: &mut Self, mut found: Vec<ContainerDescription>| {
                for d in &mut found {
                    d.r.lang = Some(Box::new(l.detached()));
                }
                l.r.lang_container_descriptions = found;
            },
        )
        .await
    }

    pub async fn load_lang_containers(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "lang_id",
            |l: &Self| l.code3.clone(),
            |l: &mut Self, mut found: Vec<Container>| {
                for c in &mut found {
                    c.r.lang = Some(Box::new(l.detached()));
                }
                l.r.lang_containers = found;
            },
        )
        .await
    }

    pub async fn load_lang_file_assets(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "lang_id",
            |l: &Self| l.code3.clone(),
            |l: &mut Self, mut found: Vec<FileAsset>| {
                for f in &mut found {
                    f.r.lang = Some(Box::new(l.detached()));
                }
                l.r.lang_file_assets = found;
            },
        )
        .await
    }

    /// Point every row of `related` at this language, inserting them when `insert` is set.
    pub async fn add_lang_catalog_descriptions(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [CatalogDescription],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.lang_id = self.code3.clone();
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "lang_id", Arc::new(self.code3.clone())).await?;
                rel.lang_id = self.code3.clone();
            }
        }
        for rel in related.iter_mut() {
            rel.r.lang = Some(Box::new(self.detached()));
            self.r.lang_catalog_descriptions.push(rel.detached());
        }
        Ok(())
    }

    /// Replace the related set: detach every current row, then add `related`.
    pub async fn set_lang_catalog_descriptions(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [CatalogDescription],
    ) -> OrmResult<()> {
        clear_foreign_keys::<CatalogDescription>(conn, "lang_id", Arc::new(self.code3.clone()))
            .await?;
        self.r.lang_catalog_descriptions.clear();
        self.add_lang_catalog_descriptions(conn, insert, related).await
    }

    pub async fn remove_lang_catalog_descriptions(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [CatalogDescription],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.lang_id = None;
            rel.r.lang = None;
            rel.update(conn, &["lang_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.lang_catalog_descriptions, related);
        Ok(())
    }

    pub async fn add_lang_container_descriptions(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [ContainerDescription],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.lang_id = self.code3.clone();
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "lang_id", Arc::new(self.code3.clone())).await?;
                rel.lang_id = self.code3.clone();
            }
        }
        for rel in related.iter_mut() {
            rel.r.lang = Some(Box::new(self.detached()));
            self.r.lang_container_descriptions.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_lang_container_descriptions(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [ContainerDescription],
    ) -> OrmResult<()> {
        clear_foreign_keys::<ContainerDescription>(conn, "lang_id", Arc::new(self.code3.clone()))
            .await?;
        self.r.lang_container_descriptions.clear();
        self.add_lang_container_descriptions(conn, insert, related).await
    }

    pub async fn remove_lang_container_descriptions(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [ContainerDescription],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.lang_id = None;
            rel.r.lang = None;
            rel.update(conn, &["lang_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.lang_container_descriptions, related);
        Ok(())
    }

    pub async fn add_lang_containers(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Container],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.lang_id = self.code3.clone();
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "lang_id", Arc::new(self.code3.clone())).await?;
                rel.lang_id = self.code3.clone();
            }
        }
        for rel in related.iter_mut() {
            rel.r.lang = Some(Box::new(self.detached()));
            self.r.lang_containers.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_lang_containers(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Container],
    ) -> OrmResult<()> {
        clear_foreign_keys::<Container>(conn, "lang_id", Arc::new(self.code3.clone())).await?;
        self.r.lang_containers.clear();
        self.add_lang_containers(conn, insert, related).await
    }

    pub async fn remove_lang_containers(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Container],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.lang_id = None;
            rel.r.lang = None;
            rel.update(conn, &["lang_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.lang_containers, related);
        Ok(())
    }

    pub async fn add_lang_file_assets(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.lang_id = self.code3.clone();
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "lang_id", Arc::new(self.code3.clone())).await?;
                rel.lang_id = self.code3.clone();
            }
        }
        for rel in related.iter_mut() {
            rel.r.lang = Some(Box::new(self.detached()));
            self.r.lang_file_assets.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_lang_file_assets(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        clear_foreign_keys::<FileAsset>(conn, "lang_id", Arc::new(self.code3.clone())).await?;
        self.r.lang_file_assets.clear();
        self.add_lang_file_assets(conn, insert, related).await
    }

    pub async fn remove_lang_file_assets(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.lang_id = None;
            rel.r.lang = None;
            rel.update(conn, &["lang_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.lang_file_assets, related);
        Ok(())
    }
}
