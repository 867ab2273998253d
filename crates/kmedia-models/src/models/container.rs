//! `containers`: a unit of media (a lesson, a clip) grouping its file assets.

use crate::joins::{CATALOGS_CONTAINERS, CONTAINERS_FILE_ASSETS, CONTAINERS_LABELS};
use crate::models::{
    Catalog, ContainerDescription, ContentType, FileAsset, Label, Language, VirtualLesson,
};
use chrono::{NaiveDate, NaiveDateTime};
use kmedia_orm::relation::{
    JoinTable, delete_join_rows, insert_join_rows, load_many_to_many, load_to_many, load_to_one,
    remove_by_pk, retain_not_in, set_foreign_key,
};
use kmedia_orm::{GenericClient, Model, OrmResult, Param, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CATALOGS: JoinTable = CATALOGS_CONTAINERS.reversed();

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: i32,
    pub name: Option<String>,
    pub filmdate: Option<NaiveDate>,
    pub lang_id: Option<String>,
    pub lecturer_id: Option<i32>,
    pub secure: i32,
    pub content_type_id: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub marked_for_merge: Option<bool>,
    pub secure_changed: Option<bool>,
    pub auto_parsed: Option<bool>,
    pub virtual_lesson_id: Option<i32>,
    pub playtime_secs: Option<i32>,
    pub user_id: Option<i32>,
    pub for_censorship: Option<bool>,
    pub opened_by_censor: Option<bool>,
    pub closed_by_censor: Option<bool>,
    pub censor_id: Option<i32>,
    pub position: Option<i32>,
    #[serde(skip)]
    pub r: ContainerRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerRels {
    pub lang: Option<Box<Language>>,
    pub content_type: Option<Box<ContentType>>,
    pub virtual_lesson: Option<Box<VirtualLesson>>,
    pub catalogs: Vec<Catalog>,
    pub container_descriptions: Vec<ContainerDescription>,
    pub file_assets: Vec<FileAsset>,
    pub labels: Vec<Label>,
}

kmedia_orm::impl_model! {
    Container {
        table: "containers",
        rels: ContainerRels,
        primary_key: [id: i32],
        columns: [
            id, name, filmdate, lang_id, lecturer_id, secure, content_type_id, created_at,
            updated_at, marked_for_merge, secure_changed, auto_parsed, virtual_lesson_id,
            playtime_secs, user_id, for_censorship, opened_by_censor, closed_by_censor,
            censor_id, position,
        ],
        defaults: [id, secure],
        timestamps: (created_at, updated_at),
    }
}

fn key(id: i32) -> Param {
    Arc::new(id)
}

impl Container {
    pub fn lang(&self) -> Query<Language> {
        Language::query().where_eq("code3", self.lang_id.clone())
    }

    pub fn content_type(&self) -> Query<ContentType> {
        ContentType::query().where_eq("id", self.content_type_id)
    }

    pub fn virtual_lesson(&self) -> Query<VirtualLesson> {
        VirtualLesson::query().where_eq("id", self.virtual_lesson_id)
    }

    pub fn catalogs(&self) -> Query<Catalog> {
        Catalog::query().through(CATALOGS, key(self.id))
    }

    pub fn container_descriptions(&self) -> Query<ContainerDescription> {
        ContainerDescription::query().where_eq("container_id", self.id)
    }

    pub fn file_assets(&self) -> Query<FileAsset> {
        FileAsset::query().through(CONTAINERS_FILE_ASSETS, key(self.id))
    }

    pub fn labels(&self) -> Query<Label> {
        Label::query().through(CONTAINERS_LABELS, key(self.id))
    }

    // ============================================
    // Eager loading
    // ============================================

    pub async fn load_lang(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "code3",
            |c: &Self| c.lang_id.clone(),
            |c: &mut Self, mut lang: Language| {
                lang.r.lang_containers.push(c.detached());
                c.r.lang = Some(Box::new(lang));
            },
        )
        .await
    }

    pub async fn load_content_type(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |c: &Self| c.content_type_id,
            |c: &mut Self, mut ct: ContentType| {
                ct.r.containers.push(c.detached());
                c.r.content_type = Some(Box::new(ct));
            },
        )
        .await
    }

    pub async fn load_virtual_lesson(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |c: &Self| c.virtual_lesson_id,
            |c: &mut Self, mut lesson: VirtualLesson| {
                lesson.r.containers.push(c.detached());
                c.r.virtual_lesson = Some(Box::new(lesson));
            },
        )
        .await
    }

    pub async fn load_catalogs(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_many_to_many(
            conn,
            rows,
            CATALOGS,
            |c: &Self| Some(c.id),
            |c: &mut Self, mut found: Vec<Catalog>| {
                for x in &mut found {
                    x.r.containers.push(c.detached());
                }
                c.r.catalogs = found;
            },
        )
        .await
    }

    pub async fn load_container_descriptions(
        conn: &impl GenericClient,
        rows: &mut [Self],
    ) -> OrmResult<()> {
        load_to_many(
            conn,
            rows,
            "container_id",
            |c: &Self| Some(c.id),
            |c: &mut Self, mut found: Vec<ContainerDescription>| {
                for d in &mut found {
                    d.r.container = Some(Box::new(c.detached()));
                }
                c.r.container_descriptions = found;
            },
        )
        .await
    }

    pub async fn load_file_assets(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_many_to_many(
            conn,
            rows,
            CONTAINERS_FILE_ASSETS,
            |c: &Self| Some(c.id),
            |c: &mut Self, mut found: Vec<FileAsset>| {
                for f in &mut found {
                    f.r.containers.push(c.detached());
                }
                c.r.file_assets = found;
            },
        )
        .await
    }

    pub async fn load_labels(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_many_to_many(
            conn,
            rows,
            CONTAINERS_LABELS,
            |c: &Self| Some(c.id),
            |c: &mut Self, mut found: Vec<Label>| {
                for l in &mut found {
                    l.r.containers.push(c.detached());
                }
                c.r.labels = found;
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
        related.r.lang_containers.push(self.detached());
        Ok(())
    }

    pub async fn remove_lang(&mut self, conn: &impl GenericClient, related: &mut Language) -> OrmResult<()> {
        self.lang_id = None;
        self.update(conn, &["lang_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.lang = None;
        remove_by_pk(&mut related.r.lang_containers, self);
        Ok(())
    }

    pub async fn set_content_type(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut ContentType,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "content_type_id", key(related.id)).await?;
        self.content_type_id = Some(related.id);
        self.r.content_type = Some(Box::new(related.detached()));
        related.r.containers.push(self.detached());
        Ok(())
    }

    pub async fn remove_content_type(
        &mut self,
        conn: &impl GenericClient,
        related: &mut ContentType,
    ) -> OrmResult<()> {
        self.content_type_id = None;
        self.update(conn, &["content_type_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.content_type = None;
        remove_by_pk(&mut related.r.containers, self);
        Ok(())
    }

    pub async fn set_virtual_lesson(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut VirtualLesson,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "virtual_lesson_id", key(related.id)).await?;
        self.virtual_lesson_id = Some(related.id);
        self.r.virtual_lesson = Some(Box::new(related.detached()));
        related.r.containers.push(self.detached());
        Ok(())
    }

    pub async fn remove_virtual_lesson(
        &mut self,
        conn: &impl GenericClient,
        related: &mut VirtualLesson,
    ) -> OrmResult<()> {
        self.virtual_lesson_id = None;
        self.update(conn, &["virtual_lesson_id"])
            .await
            .context("kmodels: failed to update local table")?;
        self.r.virtual_lesson = None;
        remove_by_pk(&mut related.r.containers, self);
        Ok(())
    }

    // ============================================
    // To-many associations
    // ============================================

    pub async fn add_container_descriptions(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [ContainerDescription],
    ) -> OrmResult<()> {
        for rel in related.iter_mut() {
            if insert {
                rel.container_id = self.id;
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            } else {
                set_foreign_key(conn, &*rel, "container_id", key(self.id)).await?;
                rel.container_id = self.id;
            }
        }
        for rel in related.iter_mut() {
            rel.r.container = Some(Box::new(self.detached()));
            self.r.container_descriptions.push(rel.detached());
        }
        Ok(())
    }

    // ============================================
    // Many-to-many associations
    // ============================================

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
            rel.r.containers.push(self.detached());
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
            remove_by_pk(&mut rel.r.containers, self);
        }
        Ok(())
    }

    pub async fn add_file_assets(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        if insert {
            for rel in related.iter_mut() {
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            }
        }
        let ids = related.iter().map(|f| key(f.id)).collect();
        insert_join_rows(conn, CONTAINERS_FILE_ASSETS, key(self.id), ids).await?;
        for rel in related.iter_mut() {
            rel.r.containers.push(self.detached());
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
        delete_join_rows(conn, CONTAINERS_FILE_ASSETS, key(self.id), None).await?;
        self.r.file_assets.clear();
        self.add_file_assets(conn, insert, related).await
    }

    pub async fn remove_file_assets(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [FileAsset],
    ) -> OrmResult<()> {
        let ids = related.iter().map(|f| key(f.id)).collect();
        delete_join_rows(conn, CONTAINERS_FILE_ASSETS, key(self.id), Some(ids)).await?;
        retain_not_in(&mut self.r.file_assets, related);
        for rel in related.iter_mut() {
            remove_by_pk(&mut rel.r.containers, self);
        }
        Ok(())
    }

    pub async fn add_labels(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Label],
    ) -> OrmResult<()> {
        if insert {
            for rel in related.iter_mut() {
                rel.insert(conn, &[])
                    .await
                    .context("kmodels: failed to insert into foreign table")?;
            }
        }
        let ids = related.iter().map(|l| key(l.id)).collect();
        insert_join_rows(conn, CONTAINERS_LABELS, key(self.id), ids).await?;
        for rel in related.iter_mut() {
            rel.r.containers.push(self.detached());
            self.r.labels.push(rel.detached());
        }
        Ok(())
    }

    pub async fn set_labels(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut [Label],
    ) -> OrmResult<()> {
        delete_join_rows(conn, CONTAINERS_LABELS, key(self.id), None).await?;
        self.r.labels.clear();
        self.add_labels(conn, insert, related).await
    }

    pub async fn remove_labels(
        &mut self,
        conn: &impl GenericClient,
        related: &mut [Label],
    ) -> OrmResult<()> {
        let ids = related.iter().map(|l| key(l.id)).collect();
        delete_join_rows(conn, CONTAINERS_LABELS, key(self.id), Some(ids)).await?;
        retain_not_in(&mut self.r.labels, related);
        for rel in related.iter_mut() {
            remove_by_pk(&mut rel.r.containers, self);
        }
        Ok(())
    }
}
