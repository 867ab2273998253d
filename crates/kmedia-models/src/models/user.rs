//! `users`: back-office accounts.

use crate::models::{Catalog, FileAsset, RolesUser};
use chrono::NaiveDateTime;
use kmedia_orm::relation::{clear_foreign_keys, load_to_many, retain_not_in, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub encrypted_password: String,
    pub reset_password_token: Option<String>,
    pub reset_password_sent_at: Option<NaiveDateTime>,
    pub remember_created_at: Option<NaiveDateTime>,
    pub sign_in_count: i32,
    pub current_sign_in_at: Option<NaiveDateTime>,
    pub last_sign_in_at: Option<NaiveDateTime>,
    pub current_sign_in_ip: Option<String>,
    pub last_sign_in_ip: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub authentication_token: Option<String>,
    pub department_id: Option<i32>,
    #[serde(skip)]
    pub r: UserRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRels {
    pub catalogs: Vec<Catalog>,
    pub file_assets: Vec<FileAsset>,
    pub roles_users: Vec<RolesUser>,
}

kmedia_orm::impl_model! {
    User {
        table: "users",
        rels: UserRels,
        primary_key: [id: i32],
        columns: [
            id, email, encrypted_password, reset_password_token, reset_password_sent_at,
            remember_created_at, sign_in_count, current_sign_in_at, last_sign_in_at,
            current_sign_in_ip, last_sign_in_ip, created_at, updated_at, first_name,
            last_name, authentication_token, department_id,
        ],
        defaults: [id, email, encrypted_password, sign_in_count],
        timestamps: (created_at, updated_at),
    }
}

fn key(id: i32) -> Param {
    Arc::new(id)
}

impl User {
    pub fn catalogs(&self) -> Query<Catalog> {
        Catalog::query().where_eq("user_id", self.id)
    }

    pub fn file_assets(&self) -> Query<FileAsset> {
        FileAsset::query().where_eq("user_id", self.id)
    }

    pub fn roles_users(&self) -> Query<RolesUser> {
        RolesUser::query().where_eq("user_id", self.id)
    }

    // ============================================
    // Eager loading
    // ============================================

    pub async fn load_catalogs(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "user_id",
            |u: &Self| Some(u.id),
            |u: &mut Self, mut found: Vec<Catalog>| {
                for c in &mut found {
                    c.r.user = Some(Box::new(u.detached()));
                }
                u.r.catalogs = found;
            },
        )
        .await
    }

    pub async fn load_file_assets(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "user_id",
            |u: &Self| Some(u.id),
            |u: &mut Self, mut found: Vec<FileAsset>| {
                for f in &mut found {
                    f.r.user = Some(Box::new(u.detached()));
                }
                u.r.file_assets = found;
            },
        )
        .await
    }

    pub async fn load_roles_users(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "user_id",
            |u: &Self| Some(u.id),
            |u: &mut Self, mut found: Vec<RolesUser>| {
                for g in &mut found {
                    g.r.user = Some(Box::new(u.detached()));
                }
                u.r.roles_users = found;
            },
        )
        .await
    }

    // ============================================
    // To-many associations
    // ============================================

    pub async fn add_catalogs(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Catalog],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.user_id = Some(self.id);
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "user_id", key(self.id)).await?;
                rel.user_id = Some(self.id);
            }
        }
        for rel in related.iter_mut() {
            rel.r.user = Some(Box::new(self.detached()));
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
        clear_foreign_keys::<Catalog>(conn, "user_id", key(self.id)).await?;
        self.r.catalogs.clear();
        self.add_catalogs(conn, insert, related).await
    }

    pub async fn remove_catalogs(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Catalog],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.user_id = None;
            rel.r.user = None;
            rel.update(conn, &["user_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.catalogs, related);
        Ok(())
    }

    pub async fn add_file_assets(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.user_id = Some(self.id);
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "user_id", key(self.id)).await?;
                rel.user_id = Some(self.id);
            }
        }
        for rel in related.iter_mut() {
            rel.r.user = Some(Box::new(self.detached()));
            self.r.file_assets.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_file_assets(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        clear_foreign_keys::<FileAsset>(conn, "user_id", key(self.id)).await?;
        self.r.file_assets.clear();
        self.add_file_assets(conn, insert, related).await
    }

    pub async fn remove_file_assets(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.user_id = None;
            rel.r.user = None;
            rel.update(conn, &["user_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.file_assets, related);
        Ok(())
    }

    /// Grant every row of `related` to this user. `user_id` is part of the
    /// grant's key and cannot be nulled, so there is no set/remove.
    pub async fn add_roles_users(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [RolesUser],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.user_id = self.id;
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "user_id", key(self.id)).await?;
                rel.user_id = self.id;
            }
        }
        for rel in related.iter_mut() {
            rel.r.user = Some(Box::new(self.detached()));
            self.r.roles_users.push(rel.detached());
        }
        Ok(())
    }
}
