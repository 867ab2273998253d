//! `catalogs`: the catalog tree that containers are filed under.

use crate::joins::{CATALOGS_CONTAINERS, CATALOGS_CONTAINER_DESCRIPTION_PATTERNS};
use crate::models::{CatalogDescription, Container, ContainerDescriptionPattern, User};
use chrono::NaiveDateTime;
use kmedia_orm::relation::{
    clear_foreign_keys, delete_join_rows, insert_join_rows, load_many_to_many, load_to_many,
    load_to_one, remove_by_pk, retain_not_in, set_foreign_key,
};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub catorder: i32,
    pub secure: i32,
    pub visible: Option<bool>,
    pub open: Option<bool>,
    pub label: Option<String>,
    pub selected_catalog: Option<i32>,
    pub user_id: Option<i32>,
    pub books_catalog: Option<bool>,
    #[serde(skip)]
    pub r: CatalogRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRels {
    pub parent: Option<Box<Catalog>>,
    pub user: Option<Box<User>>,
    pub containers: Vec<Container>,
    pub catalog_descriptions: Vec<CatalogDescription>,
    /// Catalogs whose `parent_id` points here.
    pub children: Vec<Catalog>,
    pub container_description_patterns: Vec<ContainerDescriptionPattern>,
}

kmedia_orm::impl_model! {
    Catalog {
        table: "catalogs",
        rels: CatalogRels,
        primary_key: [id: i32],
        columns: [
            id, name, parent_id, created_at, updated_at, catorder, secure, visible, open,
            label, selected_catalog, user_id, books_catalog,
        ],
        defaults: [id, name, catorder, secure, visible, open],
        timestamps: (created_at, updated_at),
    }
}

fn key(id: i32) -> Param {
    Arc::new(id)
}

impl Catalog {
    pub fn parent(&self) -> Query<Catalog> {
        Catalog::query().where_eq("id", self.parent_id)
    }

    pub fn user(&self) -> Query<User> {
        User::query().where_eq("id", self.user_id)
    }

    pub fn containers(&self) -> Query<Container> {
        Container::query().through(CATALOGS_CONTAINERS, key(self.id))
    }

    pub fn catalog_descriptions(&self) -> Query<CatalogDescription> {
        CatalogDescription::query().where_eq("catalog_id", self.id)
    }

    pub fn children(&self) -> Query<Catalog> {
        Catalog::query().where_eq("parent_id", self.id)
    }

    pub fn container_description_patterns(&self) -> Query<ContainerDescriptionPattern> {
        ContainerDescriptionPattern::query()
            .through(CATALOGS_CONTAINER_DESCRIPTION_PATTERNS, key(self.id))
    }

    // ============================================
    // Eager loading
    // ============================================

    pub async fn load_parent(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |c: &Self| c.parent_id,
            |c: &mut Self, mut parent: Catalog| {
                parent.r.children.push(c.detached());
                c.r.parent = Some(Box::new(parent));
            },
        )
        .await
    }

    pub async fn load_user(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |c: &Self| c.user_id,
            |c: &mut Self, mut user: User| {
                user.r.catalogs.push(c.detached());
                c.r.user = Some(Box::new(user));
            },
        )
        .await
    }

    pub async fn load_containers(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_many_to_many(
            conn,
            rows,
            CATALOGS_CONTAINERS,
            |c: &Self| Some(c.id),
            |c: &mut Self, mut found: Vec<Container>| {
                for x in &mut found {
                    x.r.catalogs.push(c.detached());
                }
                c.r.containers = found;
            },
        )
        .await
    }

    pub async fn load_catalog_descriptions(
        conn: &impl GenericClient,
        rows: &mut [Self],
    ) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "catalog_id",
            |c: &Self| Some(c.id),
            |c: &mut Self, mut found: Vec<CatalogDescription>| {
                for d in &mut found {
                    d.r.catalog = Some(Box::new(c.detached()));
                }
                c.r.catalog_descriptions = found;
            },
        )
        .await
    }

    pub async fn load_children(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "parent_id",
            |c: &Self| Some(c.id),
            |c: &mut Self, mut found: Vec<Catalog>| {
                for child in &mut found {
                    child.r.parent = Some(Box::new(c.detached()));
                }
                c.r.children = found;
            },
        )
        .await
    }

    pub async fn load_container_description_patterns(
        conn: &impl GenericClient,
        rows: &mut [Self],
    ) -> OrmResult<()> {
        load_many_to_many(
            conn,
            rows,
            CATALOGS_CONTAINER_DESCRIPTION_PATTERNS,
            |c: &Self| Some(c.id),
            |c: &mut Self, mut found: Vec<ContainerDescriptionPattern>| {
                for p in &mut found {
                    p.r.catalogs.push(c.detached());
                }
                c.r.container_description_patterns = found;
            },
        )
        .await
    }

    // ============================================
    // To-one associations
    // ============================================

    pub async fn set_parent(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut Catalog,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "parent_id", key(related.id)).await?;
        self.parent_id = Some(related.id);
        self.r.parent = Some(Box::new(related.detached()));
        related.r.children.push(self.detached());
        Ok(())
    }

    pub async fn remove_parent(
        &mut self,
        conn: &impl GenericClient,
        related: &mut Catalog,
    ) -> OrmResult<()> {
        self.parent_id = None;
        self.update(conn, &["parent_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.parent = None;
        remove_by_pk(&mut related.r.children, self);
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
        related.r.catalogs.push(self.detached());
        Ok(())
    }

    pub async fn remove_user(&mut self, conn: &impl GenericClient, related: &mut User) -> OrmResult<()> {
        self.user_id = None;
        self.update(conn, &["user_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.user = None;
        remove_by_pk(&mut related.r.catalogs, self);
        Ok(())
    }

    // ============================================
    // To-many associations
    // ============================================

    pub async fn add_catalog_descriptions(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [CatalogDescription],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.catalog_id = self.id;
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "catalog_id", key(self.id)).await?;
                rel.catalog_id = self.id;
            }
        }
        for rel in related.iter_mut() {
            rel.r.catalog = Some(Box::new(self.detached()));
            self.r.catalog_descriptions.push(rel.detached());
        }
        Ok(())
    }

    /// Make every row of `related` a child of this catalog.
    pub async fn add_children(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Catalog],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.parent_id = Some(self.id);
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "parent_id", key(self.id)).await?;
                rel.parent_id = Some(self.id);
            }
        }
        for rel in related.iter_mut() {
            rel.r.parent = Some(Box::new(self.detached()));
            self.r.children.push(rel.detached());
        }
        Ok(())
    }

    /// Orphan the current children, then adopt `related`.
    pub async fn set_children(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Catalog],
    ) -> OrmResult<()> {
        clear_foreign_keys::<Catalog>(conn, "parent_id", key(self.id)).await?;
        self.r.children.clear();
        self.add_children(conn, insert, related).await
    }

    pub async fn remove_children(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Catalog],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            rel.parent_id = None;
            rel.r.parent = None;
            rel.update(conn, &["parent_id"])
                .await
                .context("kmodels: failed to update foreign table")?;
        }
        retain_not_in(&mut self.r.children, related);
        Ok(())
    }

    // ============================================
    // Many-to-many associations
    // ============================================

    /// Link `related` to this catalog through `catalogs_containers`.
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
        insert_join_rows(conn, CATALOGS_CONTAINERS, key(self.id), ids).await?;
        for rel in related.iter_mut() {
            rel.r.catalogs.push(self.detached());
            self.r.containers.push(rel.detached());
        }
        Ok(())
    }

    /// Drop every `catalogs_containers` row of this catalog, then add `related`.
    pub async fn set_containers(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Container],
    ) -> OrmResult<()> {
        delete_join_rows(conn, CATALOGS_CONTAINERS, key(self.id), None).await?;
        self.r.containers.clear();
        self.add_containers(conn, insert, related).await
    }

    pub async fn remove_containers(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Container],
    ) -> OrmResult<()> {
        let ids = related.iter().map(|c| key(c.id)).collect();
        delete_join_rows(conn, CATALOGS_CONTAINERS, key(self.id), Some(ids)).await?;
        retain_not_in(&mut self.r.containers, related);
        for rel in related.iter_mut() {
            remove_by_pk(&mut rel.r.catalogs, self);
        }
        Ok(())
    }

    pub async fn add_container_description_patterns(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [ContainerDescriptionPattern],
    ) -> OrmResult<()> {
        if insert {
            for rel in related.iter_mut() {
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            }
        }
        let ids = related.iter().map(|p| key(p.id)).collect();
        insert_join_rows(conn, CATALOGS_CONTAINER_DESCRIPTION_PATTERNS, key(self.id), ids).await?;
        for rel in related.iter_mut() {
            rel.r.catalogs.push(self.detached());
            self.r.container_description_patterns.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_container_description_patterns(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [ContainerDescriptionPattern],
    ) -> OrmResult<()> {
        delete_join_rows(conn, CATALOGS_CONTAINER_DESCRIPTION_PATTERNS, key(self.id), None).await?;
        self.r.container_description_patterns.clear();
        self.add_container_description_patterns(conn, insert, related).await
    }

    pub async fn remove_container_description_patterns(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [ContainerDescriptionPattern],
    ) -> OrmResult<()> {
        let ids = related.iter().map(|p| key(p.id)).collect();
        delete_join_rows(conn, CATALOGS_CONTAINER_DESCRIPTION_PATTERNS, key(self.id), Some(ids))
            .await?;
        retain_not_in(&mut self.r.container_description_patterns, related);
        for rel in related.iter_mut() {
            remove_by_pk(&mut rel.r.catalogs, self);
        }
        Ok(())
    }
}
