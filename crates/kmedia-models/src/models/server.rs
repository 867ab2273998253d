//! `servers`: storage hosts. File assets refer to a server by its `servername`.

use crate::models::FileAsset;
use chrono::NaiveDateTime;
use kmedia_orm::relation::{clear_foreign_keys, load_to_many, retain_not_in, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: i32,
    pub servername: String,
    pub httpurl: Option<String>,
    pub path: Option<String>,
    pub lastuser: Option<String>,
    pub created: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: ServerRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerRels {
    pub servername_file_assets: Vec<FileAsset>,
}

// `created` / `updated` are maintained by the importer, not stamped on write.
kmedia_orm::impl_model! {
    Server {
        table: "servers",
        rels: ServerRels,
        primary_key: [id: i32],
        columns: [id, servername, httpurl, path, lastuser, created, updated],
        defaults: [id],
    }
}

impl Server {
    fn name_key(&self) -> Param {
        Arc::new(self.servername.clone())
    }

    pub fn servername_file_assets(&self) -> Query<FileAsset> {
        FileAsset::query().where_eq("servername_id", self.servername.clone())
    }

    pub async fn load_servername_file_assets(
        conn: &impl GenericClient,
        rows: &mut [Self],
    ) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "servername_id",
            |s: &Self| Some(s.servername.clone()),
            |s: &mut Self, mut found: Vec<FileAsset>| {
                for f in &mut found {
                    f.r.servername = Some(Box::new(s.detached()));
                }
                s.r.servername_file_assets = found;
            },
        )
        .await
    }

    pub async fn add_servername_file_assets(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.servername_id = Some(self.servername.clone());
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "servername_id", self.name_key()).await?;
                rel.servername_id = Some(self.servername.clone());
            }
        }
        for rel in related.iter_mut() {
            rel.r.servername = Some(Box::new(self.detached()));
            self.r.servername_file_assets.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_servername_file_assets(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        clear_foreign_keys::<FileAsset>(conn, "servername_id", self.name_key()).await?;
        self.r.servername_file_assets.clear();
        self.add_servername_file_assets(conn, insert, related).await
    }

    pub async fn remove_servername_file_assets(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.servername_id = None;
            rel.r.servername = None;
            rel.update(conn, &["servername_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.servername_file_assets, related);
        Ok(())
    }
}
