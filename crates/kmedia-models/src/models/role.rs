use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub r: RoleRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleRels;

kmedia_orm::impl_model! {
    Role {
        table: "roles",
        rels: RoleRels,
        primary_key: [id: i32],
        columns: [id, name, description, created_at, updated_at],
        defaults: [id],
        timestamps: (created_at, updated_at),
    }
}
