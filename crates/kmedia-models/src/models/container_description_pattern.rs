//! `container_description_patterns`: description templates offered per catalog.

use crate::joins::CATALOGS_CONTAINER_DESCRIPTION_PATTERNS;
use crate::models::Catalog;
use chrono::NaiveDateTime;
use kmedia_orm::relation::{
    JoinTable, delete_join_rows, insert_join_rows, load_many_to_many, remove_by_pk, retain_not_in,
};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CATALOGS: JoinTable = CATALOGS_CONTAINER_DESCRIPTION_PATTERNS.reversed();

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerDescriptionPattern {
    pub id: i32,
    pub pattern: Option<String>,
    pub description: Option<String>,
    pub lang: Option<String>,
    pub user_id: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: ContainerDescriptionPatternRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerDescriptionPatternRels {
    pub catalogs: Vec<Catalog>,
}

kmedia_orm::impl_model! {
    ContainerDescriptionPattern {
        table: "container_description_patterns",
        rels: ContainerDescriptionPatternRels,
        primary_key: [id: i32],
        columns: [id, pattern, description, lang, user_id, created_at, updated_at],
        defaults: [id],
        timestamps: (created_at, updated_at),
    }
}

fn key(id: i32) -> Param {
    Arc::new(id)
}

impl ContainerDescriptionPattern {
    pub fn catalogs(&self) -> Query<Catalog> {
        Catalog::query().through(CATALOGS, key(self.id))
    }

    pub async fn load_catalogs(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_many_to_many(
            conn,
            rows,
            CATALOGS,
            |p: &Self| Some(p.id),
            |p: &mut Self, mut found: Vec<Catalog>| {
                for c in &mut found {
                    c.r.container_description_patterns.push(p.detached());
                }
                p.r.catalogs = found;
            },
        )
        .await
    }

    pub async fn add_catalogs(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Catalog],
    ) -> OrmResult<()> {
        if insert {
            for rel in related.iter_mut() {
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            }
        }
        let ids = related.iter().map(|c| key(c.id)).collect();
        insert_join_rows(conn, CATALOGS, key(self.id), ids).await?;
        for rel in related.iter_mut() {
            rel.r.container_description_patterns.push(self.detached());
            self.r.catalogs.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_catalogs(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Catalog],
    ) -> OrmResult<()> {
        delete_join_rows(conn, CATALOGS, key(self.id), None).await?;
        self.r.catalogs.clear();
        self.add_catalogs(conn, insert, related).await
    }

    pub async fn remove_catalogs(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Catalog],
    ) -> OrmResult<()> {
        let ids = related.iter().map(|c| key(c.id)).collect();
        delete_join_rows(conn, CATALOGS, key(self.id), Some(ids)).await?;
        retain_not_in(&mut self.r.catalogs, related);
        for rel in related.iter_mut() {
            remove_by_pk(&mut rel.r.container_description_patterns, self);
        }
        Ok(())
    }
}
