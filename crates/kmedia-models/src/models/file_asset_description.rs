use crate::models::FileAsset;
use chrono::NaiveDateTime;
use kmedia_orm::relation::{load_to_one, set_foreign_key};
use kmedia_orm::{GenericClient, Model, OrmResult, Query, ResultExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileAssetDescription {
    pub id: i32,
    pub file_id: i32,
    pub filedesc: Option<String>,
    pub lang: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: FileAssetDescriptionRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAssetDescriptionRels {
    pub file: Option<Box<FileAsset>>,
}

kmedia_orm::impl_model! {
    FileAssetDescription {
        table: "file_asset_descriptions",
        rels: FileAssetDescriptionRels,
        primary_key: [id: i32],
        columns: [id, file_id, filedesc, lang, created_at, updated_at],
        defaults: [id],
        timestamps: (created_at, updated_at),
    }
}

impl FileAssetDescription {
    pub fn file(&self) -> Query<FileAsset> {
        FileAsset::query().where_eq("id", self.file_id)
    }

    pub async fn load_file(conn: &impl GenericClient, rows: &mut [Self]) -> OrmResult<()> {
        load_to_one(
            conn,
            rows,
            "id",
            |d: &Self| Some(d.file_id),
            |d: &mut Self, mut file: FileAsset| {
                file.r.file_asset_descriptions.push(d.detached());
                d.r.file = Some(Box::new(file));
            },
        )
        .await
    }

    pub async fn set_file(
        &mut self,
        conn: &impl GenericClient,
        insert: bool,
        related: &mut FileAsset,
    ) -> OrmResult<()> {
        if insert {
            related
                .insert(conn, &[])
                .await
                .context("kmodels: failed to insert into foreign table")?;
        }
        set_foreign_key(conn, &*self, "file_id", Arc::new(related.id)).await?;
        self.file_id = related.id;
        self.r.file = Some(Box::new(related.detached()));
        related.r.file_asset_descriptions.push(self.detached());
        Ok(())
    }
}
