//! `file_types`: known file extensions and their icons, keyed by name.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileType {
    pub name: String,
    pub extlist: Option<String>,
    pub pic: Option<String>,
    #[serde(skip)]
    pub r: FileTypeRels,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileTypeRels;

kmedia_orm::impl_model! {
    FileType {
        table: "file_types",
        rels: FileTypeRels,
        primary_key: [name: &str],
        columns: [name, extlist, pic],
        defaults: [],
    }
}
