use crate::models::{Container, Language};
use chrono::NaiveDateTime;
use kmedia_orm::relation::{load_to_one, remove_by_pk, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A localized description of a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerDescription {
    pub id: i32,
    pub container_id: i32,
    pub lang_id: Option<String>,
    pub container_desc: Option<String>,
    pub descr: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: ContainerDescriptionRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerDescriptionRels {
    pub container: Option<Box<Container>>,
    pub lang: Option<Box<Language>>,
}

kmedia_orm::impl_model! {
    ContainerDescription {
        table: "container_descriptions",
        rels: ContainerDescriptionRels,
        primary_key: [id: i32],
        columns: [id, container_id, lang_id, container_desc, descr, created_at, updated_at],
        defaults: [id],
        timestamps: (created_at, updated_at),
    }
}

impl ContainerDescription {
    pub fn container(&self) -> Query<Container> {
        Container::query().where_eq("id", self.container_id)
    }

    pub fn lang(&self) -> Query<Language> {
        Language::query().where_eq("code3", self.lang_id.clone())
    }

    pub async fn load_container(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |d: &Self| Some(d.container_id),
            |d: &mut Self, mut container: Container| {
                container.r.container_descriptions.push(d.detached());
                d.r.container = Some(Box::new(container));
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
                lang.r.lang_container_descriptions.push(d.detached());
                d.r.lang = Some(Box::new(lang));
            },
        )
        .await
    }

    pub async fn set_container(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut Container,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "container_id", Arc::new(related.id)).await?;
        self.container_id = related.id;
        self.r.container = Some(Box::new(related.detached()));
        related.r.container_descriptions.push(self.detached());
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
        related.r.lang_container_descriptions.push(self.detached());
        Ok(())
    }

    pub async fn remove_lang(&mut self, conn: &impl GenericClient, related: &mut Language) -> OrmResult<()> {
        self.lang_id = None;
        self.update(conn, &["lang_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.lang = None;
        remove_by_pk(&mut related.r.lang_container_descriptions, self);
        Ok(())
    }
}
