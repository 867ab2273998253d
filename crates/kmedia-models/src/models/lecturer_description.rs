use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A localized description of a lecturer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LecturerDescription {
    pub id: i32,
    pub lecturer_id: Option<i32>,
    pub desc: Option<String>,
    pub lang: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: LecturerDescriptionRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LecturerDescriptionRels;

kmedia_orm::impl_model! {
    LecturerDescription {
        table: "lecturer_descriptions",
        rels: LecturerDescriptionRels,
        primary_key: [id: i32],
        columns: [id, lecturer_id, desc, lang, created_at, updated_at],
        defaults: [id],
        timestamps: (created_at, updated_at),
    }
}
