use crate::models::User;
use kmedia_orm::relation::{load_to_one, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Grants `role_id` to `user_id`. Both columns form the primary key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolesUser {
    pub role_id: i32,
    pub user_id: i32,
    #[serde(skip)]
    pub r: RolesUserRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolesUserRels {
    pub user: Option<Box<User>>,
}

kmedia_orm::impl_model! {
    RolesUser {
        table: "roles_users",
        rels: RolesUserRels,
        primary_key: [role_id: i32, user_id: i32],
        columns: [role_id, user_id],
        defaults: [],
    }
}

impl RolesUser {
    pub fn user(&self) -> Query<User> {
        User::query().where_eq("id", self.user_id)
    }

    pub async fn load_user(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |g: &Self| Some(g.user_id),
            |g: &mut Self, mut user: User| {
                user.r.roles_users.push(g.detached());
                g.r.user = Some(Box::new(user));
            },
        )
        .await
    }

    /// Move this grant to `related`. The row is matched on its current key, so
    /// `user_id` changes only after the update succeeds.
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
        set_foreign_key(conn, &*self, "user_id", Arc::new(related.id)).await?;
        self.user_id = related.id;
        self.r.user = Some(Box::new(related.detached()));
        related.r.roles_users.push(self.detached());
        Ok(())
    }
}
