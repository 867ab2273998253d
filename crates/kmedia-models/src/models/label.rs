use crate::joins::CONTAINERS_LABELS;
use crate::models::Container;
use chrono::NaiveDateTime;
use kmedia_orm::relation::{
    JoinTable, delete_join_rows, insert_join_rows, load_many_to_many, remove_by_pk, retain_not_in,
};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CONTAINERS: JoinTable = CONTAINERS_LABELS.reversed();

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: i32,
    pub dictionary_id: Option<i32>,
    pub suid: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: LabelRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelRels {
    pub containers: Vec<Container>,
}

kmedia_orm::impl_model! {
    Label {
        table: "labels",
        rels: LabelRels,
        primary_key: [id: i32],
        columns: [id, dictionary_id, suid, created_at, updated_at],
        defaults: [id],
        timestamps: (created_at, updated_at),
    }
}

fn key(id: i32) -> Param {
    Arc::new(id)
}

impl Label {
    pub fn containers(&self) -> Query<Container> {
        Container::query().through(CONTAINERS, key(self.id))
    }

    pub async fn load_containers(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_many_to_many(
            conn,
            rows,
            CONTAINERS,
            |l: &Self| Some(l.id),
            |l: &mut Self, mut found: Vec<Container>| {
                for c in &mut found {
                    c.r.labels.push(l.detached());
                }
                l.r.containers = found;
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
        if insert {
            for rel in related.iter_mut() {
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            }
        }
        let ids = related.iter().map(|c| key(c.id)).collect();
        insert_join_rows(conn, CONTAINERS, key(self.id), ids).await?;
        for rel in related.iter_mut() {
            rel.r.labels.push(self.detached());
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
        delete_join_rows(conn, CONTAINERS, key(self.id), None).await?;
        self.r.containers.clear();
        self.add_containers(conn, insert, related).await
    }

    pub async fn remove_containers(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Container],
    ) -> OrmResult<()> {
        let ids = related.iter().map(|c| key(c.id)).collect();
        delete_join_rows(conn, CONTAINERS, key(self.id), Some(ids)).await?;
        retain_not_in(&mut self.r.containers, related);
        for rel in related.iter_mut() {
            remove_by_pk(&mut rel.r.labels, self);
        }
        Ok(())
    }
}
