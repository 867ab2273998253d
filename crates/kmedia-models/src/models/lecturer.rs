use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: i32,
    pub name: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub ordnum: i32,
    #[serde(skip)]
    pub r: LecturerRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LecturerRels;

kmedia_orm::impl_model! {
    Lecturer {
        table: "lecturers",
        rels: LecturerRels,
        primary_key: [id: i32],
        columns: [id, name, created_at, updated_at, ordnum],
        defaults: [id, name, ordnum],
        timestamps: (created_at, updated_at),
    }
}
