use crate::models::Container;
use kmedia_orm::relation::{clear_foreign_keys, load_to_many, retain_not_in, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    pub id: i32,
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub secure: i32,
    #[serde(skip)]
    pub r: ContentTypeRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentTypeRels {
    pub containers: Vec<Container>,
}

kmedia_orm::impl_model! {
    ContentType {
        table: "content_types",
        rels: ContentTypeRels,
        primary_key: [id: i32],
        columns: [id, name, pattern, secure],
        defaults: [id, secure],
    }
}

fn key(id: i32) -> Param {
    Arc::new(id)
}

impl ContentType {
    pub fn containers(&self) -> Query<Container> {
        Container::query().where_eq("content_type_id", self.id)
    }

    pub async fn load_containers(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "content_type_id",
            |t: &Self| Some(t.id),
            |t: &mut Self, mut found: Vec<Container>| {
                for c in &mut found {
                    c.r.content_type = Some(Box::new(t.detached()));
                }
                t.r.containers = found;
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
                rel.content_type_id = Some(self.id);
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "content_type_id", key(self.id)).await?;
                rel.content_type_id = Some(self.id);
            }
        }
        for rel in related.iter_mut() {
            rel.r.content_type = Some(Box::new(self.detached()));
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
        clear_foreign_keys::<Container>(conn, "content_type_id", key(self.id)).await?;
        self.r.containers.clear();
        self.add_containers(conn, insert, related).await
    }

    pub async fn remove_containers(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Container],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.content_type_id = None;
            rel.r.content_type = None;
            rel.update(conn, &["content_type_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.containers, related);
        Ok(())
    }
}
