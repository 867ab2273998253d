//! `file_assets`: one physical media file, stored on a [`Server`].

use crate::joins::CONTAINERS_FILE_ASSETS;
use crate::models::{Container, FileAssetDescription, Language, Server, User};
use chrono::NaiveDateTime;
use kmedia_orm::relation::{
    JoinTable, delete_join_rows, insert_join_rows, load_many_to_many, load_to_many, load_to_one,
    remove_by_pk, retain_not_in, set_foreign_key,
};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CONTAINERS: JoinTable = CONTAINERS_FILE_ASSETS.reversed();

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileAsset {
    pub id: i32,
    pub name: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub asset_type: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub lang_id: Option<String>,
    pub lastuser: Option<String>,
    pub servername_id: Option<String>,
    pub status: Option<String>,
    pub size: Option<i32>,
    pub playtime_secs: Option<i32>,
    pub secure: i32,
    pub user_id: Option<i32>,
    pub clicks: Option<i32>,
    #[serde(skip)]
    pub r: FileAssetRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAssetRels {
    pub lang: Option<Box<Language>>,
    pub user: Option<Box<User>>,
    /// The [`Server`] named by `servername_id`.
    pub servername: Option<Box<Server>>,
    pub containers: Vec<Container>,
    pub file_asset_descriptions: Vec<FileAssetDescription>,
}

kmedia_orm::impl_model! {
    FileAsset {
        table: "file_assets",
        rels: FileAssetRels,
        primary_key: [id: i32],
        columns: [
            id, name, date, asset_type, created_at, updated_at, lang_id, lastuser,
            servername_id, status, size, playtime_secs, secure, user_id, clicks,
        ],
        defaults: [id, secure],
        timestamps: (created_at, updated_at),
    }
}

fn key(id: i32) -> Param {
    Arc::new(id)
}

impl FileAsset {
    pub fn lang(&self) -> Query<Language> {
        Language::query().where_eq("code3", self.lang_id.clone())
    }

    pub fn user(&self) -> Query<User> {
        User::query().where_eq("id", self.user_id)
    }

    pub fn servername(&self) -> Query<Server> {
        Server::query().where_eq("servername", self.servername_id.clone())
    }

    pub fn containers(&self) -> Query<Container> {
        Container::query().through(CONTAINERS, key(self.id))
    }

    pub fn file_asset_descriptions(&self) -> Query<FileAssetDescription> {
        FileAssetDescription::query().where_eq("file_id", self.id)
    }

    // ============================================
    // Eager loading
    // ============================================

    pub async fn load_lang(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "code3",
            |f: &Self| f.lang_id.clone(),
            |f: &mut Self, mut lang: Language| {
                lang.r.lang_file_assets.push(f.detached());
                f.r.lang = Some(Box::new(lang));
            },
        )
        .await
    }

    pub async fn load_user(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |f: &Self| f.user_id,
            |f: &mut Self, mut user: User| {
                user.r.file_assets.push(f.detached());
                f.r.user = Some(Box::new(user));
            },
        )
        .await
    }

    pub async fn load_servername(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "servername",
            |f: &Self| f.servername_id.clone(),
            |f: &mut Self, mut server: Server| {
                server.r.servername_file_assets.push(f.detached());
                f.r.servername = Some(Box::new(server));
            },
        )
        .await
    }

    pub async fn load_containers(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_many_to_many(
            conn,
            rows,
            CONTAINERS,
            |f: &Self| Some(f.id),
            |f: &mut Self, mut found: Vec<Container>| {
                for c in &mut found {
                    c.r.file_assets.push(f.detached());
                }
                f.r.containers = found;
            },
        )
        .await
    }

    pub async fn load_file_asset_descriptions(
        conn: &impl GenericClient,
        rows: &mut [Self],
    ) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "file_id",
            |f: &Self| Some(f.id),
            |f: &mut Self, mut found: Vec<FileAssetDescription>| {
                for d in &mut found {
                    d.r.file = Some(Box::new(f.detached()));
                }
                f.r.file_asset_descriptions = found;
            },
        )
        .await
    }

    // ============================================
    // To-one associations
    // ============================================

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
        related.r.lang_file_assets.push(self.detached());
        Ok(())
    }

    pub async fn remove_lang(&mut self, conn: &impl GenericClient, related: &mut Language) -> OrmResult<()> {
        self.lang_id = None;
        self.update(conn, &["lang_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.lang = None;
        remove_by_pk(&mut related.r.lang_file_assets, self);
        Ok(())
    }

    pub async fn set_user(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut User,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "user_id", key(related.id)).await?;
        self.user_id = Some(related.id);
        self.r.user = Some(Box::new(related.detached()));
        related.r.file_assets.push(self.detached());
        Ok(())
    }

    pub async fn remove_user(&mut self, conn: &impl GenericClient, related: &mut User) -> OrmResult<()> {
        self.user_id = None;
        self.update(conn, &["user_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.user = None;
        remove_by_pk(&mut related.r.file_assets, self);
        Ok(())
    }

    /// Point `servername_id` at `related`.
    pub async fn set_servername(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut Server,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "servername_id", Arc::new(related.servername.clone()))
            .await?;
        self.servername_id = Some(related.servername.clone());
        self.r.servername = Some(Box::new(related.detached()));
        related.r.servername_file_assets.push(self.detached());
        Ok(())
    }

    pub async fn remove_servername(
        &mut self,
        conn: &impl GenericClient,
        related: &mut Server,
    ) -> OrmResult<()> {
        self.servername_id = None;
        self.update(conn, &["servername_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.servername = None;
        remove_by_pk(&mut related.r.servername_file_assets, self);
        Ok(())
    }

    // ============================================
    // To-many associations
    // ============================================

    pub async fn add_file_asset_descriptions(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [FileAssetDescription],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.file_id = self.id;
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "file_id", key(self.id)).await?;
                rel.file_id = self.id;
            }
        }
        for rel in related.iter_mut() {
            rel.r.file = Some(Box::new(self.detached()));
            self.r.file_asset_descriptions.push(rel.detached());
        }
        Ok(())
    }

    // ============================================
    // Many-to-many associations
    // ============================================

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
            rel.r.file_assets.push(self.detached());
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
            remove_by_pk(&mut rel.r.file_assets, self);
        }
        Ok(())
    }
}
