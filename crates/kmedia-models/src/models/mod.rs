//! Table structs.

mod catalog;
mod catalog_description;
mod container;
mod container_description;
mod container_description_pattern;
mod content_type;
mod file_asset;
mod file_asset_description;
mod file_type;
mod label;
mod language;
mod lecturer;
mod lecturer_description;
mod role;
mod roles_user;
mod server;
mod user;
mod virtual_lesson;

pub use catalog::{Catalog, CatalogRels};
pub use catalog_description::{CatalogDescription, CatalogDescriptionRels};
pub use container::{Container, ContainerRels};
pub use container_description::{ContainerDescription, ContainerDescriptionRels};
pub use container_description_pattern::{ContainerDescriptionPattern, ContainerDescriptionPatternRels};
pub use content_type::{ContentType, ContentTypeRels};
pub use file_asset::{FileAsset, FileAssetRels};
pub use file_asset_description::{FileAssetDescription, FileAssetDescriptionRels};
pub use file_type::{FileType, FileTypeRels};
pub use label::{Label, LabelRels};
pub use language::{Language, LanguageRels};
pub use lecturer::{Lecturer, LecturerRels};
pub use lecturer_description::{LecturerDescription, LecturerDescriptionRels};
pub use role::{Role, RoleRels};
pub use roles_user::{RolesUser, RolesUserRels};
pub use server::{Server, ServerRels};
pub use user::{User, UserRels};
pub use virtual_lesson::{VirtualLesson, VirtualLessonRels};
