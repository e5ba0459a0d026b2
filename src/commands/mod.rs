use std::path::{Path, PathBuf};

pub mod compose;
pub mod ingest;
pub mod inventory;
pub mod resolve;
pub mod status;

pub(crate) fn default_db_path(cache_root: &Path) -> PathBuf {
    cache_root.join("cop_supplementary.sqlite")
}
