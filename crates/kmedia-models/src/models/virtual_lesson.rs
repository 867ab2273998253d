//! `virtual_lessons`: containers filmed together as one lesson.

use crate::models::Container;
use chrono::{NaiveDate, NaiveDateTime};
use kmedia_orm::relation::{clear_foreign_keys, load_to_many, retain_not_in, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualLesson {
    pub id: i32,
    pub film_date: Option<NaiveDate>,
    pub user_id: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: VirtualLessonRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualLessonRels {
    pub containers: Vec<Container>,
}

kmedia_orm::impl_model! {
    VirtualLesson {
        table: "virtual_lessons",
        rels: VirtualLessonRels,
        primary_key: [id: i32],
        columns: [id, film_date, user_id, created_at, updated_at],
        defaults: [id],
        timestamps: (created_at, updated_at),
    }
}

fn key(id: i32) -> Param {
    Arc::new(id)
}

impl VirtualLesson {
    pub fn containers(&self) -> Query<Container> {
        Container::query().where_eq("virtual_lesson_id", self.id)
    }

    pub async fn load_containers(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "virtual_lesson_id",
            |v: &Self| Some(v.id),
            |v: &mut Self, mut found: Vec<Container>| {
                for c in &mut found {
                    c.r.virtual_lesson = Some(Box::new(v.detached()));
                }
                v.r.containers = found;
            },
        )
        .await
    }

    pub async fn add_containers(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Container],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.virtual_lesson_id = Some(self.id);
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "virtual_lesson_id", key(self.id)).await?;
                rel.virtual_lesson_id = Some(self.id);
            }
        }
        for rel in related.iter_mut() {
            rel.r.virtual_lesson = Some(Box::new(self.detached()));
            self.r.containers.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_containers(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Container],
    ) -> OrmResult<()> {
        clear_foreign_keys::<Container>(conn, "virtual_lesson_id", key(self.id)).await?;
        self.r.containers.clear();
        self.add_containers(conn, insert, related).await
    }

    pub async fn remove_containers(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Container],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.virtual_lesson_id = None;
            rel.r.virtual_lesson = None;
            rel.update(conn, &["virtual_lesson_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.containers, related);
        Ok(())
    }
}
