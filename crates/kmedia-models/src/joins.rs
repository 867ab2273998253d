//! Join tables behind the many-to-many relationships, seen from the table named first.

use kmedia_orm::relation::JoinTable;

pub const CATALOGS_CONTAINERS: JoinTable =
    JoinTable::new("catalogs_containers", "catalog_id", "container_id");

pub const CATALOGS_CONTAINER_DESCRIPTION_PATTERNS: JoinTable = JoinTable::new(
    "catalogs_container_description_patterns",
    "catalog_id",
    "container_description_pattern_id",
);

pub const CONTAINERS_FILE_ASSETS: JoinTable =
    JoinTable::new("containers_file_assets", "container_id", "file_asset_id");

pub const CONTAINERS_LABELS: JoinTable =
    JoinTable::new("containers_labels", "container_id", "label_id");
