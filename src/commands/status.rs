use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::default_db_path;
use crate::model::CorpusInventoryManifest;
use crate::store::CorpusStore;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let inventory_path = manifest_dir.join("corpus_inventory.json");
    let db_path = args
        .db_path
        .unwrap_or_else(|| default_db_path(&args.cache_root));

    info!(cache_root = %args.cache_root.display(), "status requested");

    match CorpusStore::discover_chapter_numbers(&args.corpus_dir) {
        Ok(chapter_numbers) => info!(
            corpus_dir = %args.corpus_dir.display(),
            chapters = chapter_numbers.len(),
            "corpus directory status"
        ),
        Err(_) => warn!(corpus_dir = %args.corpus_dir.display(), "corpus directory unreadable"),
    }

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: CorpusInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            chapter_count = inventory.chapter_count,
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    if db_path.exists() {
        let connection = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;

        let sections_count =
            query_count(&connection, "SELECT COUNT(*) FROM sections").unwrap_or(0);
        let details_count = query_count(&connection, "SELECT COUNT(*) FROM details").unwrap_or(0);
        let guidance_count =
            query_count(&connection, "SELECT COUNT(*) FROM htg_content").unwrap_or(0);
        let case_count =
            query_count(&connection, "SELECT COUNT(*) FROM failure_cases").unwrap_or(0);

        info!(
            path = %db_path.display(),
            sections = sections_count,
            details = details_count,
            guidance_blocks = guidance_count,
            failure_cases = case_count,
            "database status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
