use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::IngestArgs;
use crate::commands::default_db_path;
use crate::model::{IngestCounts, IngestRunManifest, SeedEntry};
use crate::store::CorpusStore;
use crate::util::{ensure_directory, now_utc_string, run_id, sha256_file, write_json_pretty};

use super::*;

pub fn run(args: IngestArgs) -> Result<()> {
    ensure_directory(&args.cache_root)?;

    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| default_db_path(&args.cache_root));
    if let Some(parent) = db_path.parent() {
        ensure_directory(parent)?;
    }

    let mut connection = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;

    let mut counts = IngestCounts::default();
    let mut warnings = Vec::new();

    ingest_corpus_sections(&mut connection, &args.corpus_dir, &mut counts)?;
    let source_hashes =
        ingest_seed_files(&mut connection, &args.seed_dir, &mut counts, &mut warnings)?;

    let manifest = IngestRunManifest {
        manifest_version: 1,
        run_id: run_id("ingest"),
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        generated_at: now_utc_string(),
        db_path: db_path.display().to_string(),
        corpus_directory: args.corpus_dir.display().to_string(),
        seed_directory: args.seed_dir.display().to_string(),
        counts,
        source_hashes,
        warnings,
    };

    let manifest_path = args
        .ingest_manifest_path
        .unwrap_or_else(|| args.cache_root.join("manifests").join("ingest_run.json"));
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote ingest manifest");
    info!(
        chapters = manifest.counts.chapters_seen,
        sections = manifest.counts.sections_upserted,
        details = manifest.counts.details_upserted,
        guidance_blocks = manifest.counts.guidance_blocks_upserted,
        failure_cases = manifest.counts.failure_cases_upserted,
        "ingest completed"
    );

    Ok(())
}

fn ingest_corpus_sections(
    connection: &mut Connection,
    corpus_dir: &Path,
    counts: &mut IngestCounts,
) -> Result<()> {
    let chapter_numbers = CorpusStore::discover_chapter_numbers(corpus_dir)?;
    if chapter_numbers.is_empty() {
        bail!("no chapter files found in {}", corpus_dir.display());
    }

    let corpus = CorpusStore::new(corpus_dir);
    for chapter_number in chapter_numbers {
        let path = corpus.chapter_path(chapter_number);
        let chapter = CorpusStore::read_chapter_document(&path)?
            .with_context(|| format!("chapter {chapter_number} missing from corpus"))?;

        let upserted = upsert_sections(connection, &chapter)?;
        counts.chapters_seen += 1;
        counts.sections_upserted += upserted;

        info!(
            chapter = chapter.chapter_number,
            sections = upserted,
            "ingested chapter sections"
        );
    }

    Ok(())
}

fn ingest_seed_files(
    connection: &mut Connection,
    seed_dir: &Path,
    counts: &mut IngestCounts,
    warnings: &mut Vec<String>,
) -> Result<Vec<SeedEntry>> {
    let mut source_hashes = Vec::new();

    match load_seed_list::<DetailSeed>(seed_dir, DETAILS_SEED)? {
        Some(seeds) => {
            counts.details_upserted = upsert_details(connection, &seeds)?;
            source_hashes.push(seed_entry(seed_dir, DETAILS_SEED)?);
        }
        None => record_missing_seed(seed_dir, DETAILS_SEED, warnings),
    }

    match load_seed_list::<GuidanceSeed>(seed_dir, GUIDANCE_SEED)? {
        Some(seeds) => {
            counts.guidance_blocks_upserted = upsert_guidance_blocks(connection, &seeds)?;
            source_hashes.push(seed_entry(seed_dir, GUIDANCE_SEED)?);
        }
        None => record_missing_seed(seed_dir, GUIDANCE_SEED, warnings),
    }

    match load_seed_list::<FailureCaseSeed>(seed_dir, FAILURE_CASES_SEED)? {
        Some(seeds) => {
            counts.failure_cases_upserted = upsert_failure_cases(connection, &seeds)?;
            source_hashes.push(seed_entry(seed_dir, FAILURE_CASES_SEED)?);
        }
        None => record_missing_seed(seed_dir, FAILURE_CASES_SEED, warnings),
    }

    match load_seed_list::<SectionDetailLinkSeed>(seed_dir, SECTION_DETAILS_SEED)? {
        Some(seeds) => {
            counts.detail_links_upserted = upsert_detail_links(connection, &seeds)?;
            source_hashes.push(seed_entry(seed_dir, SECTION_DETAILS_SEED)?);
        }
        None => record_missing_seed(seed_dir, SECTION_DETAILS_SEED, warnings),
    }

    match load_seed_list::<SectionGuidanceLinkSeed>(seed_dir, SECTION_HTG_SEED)? {
        Some(seeds) => {
            counts.guidance_links_upserted = upsert_guidance_links(connection, &seeds)?;
            source_hashes.push(seed_entry(seed_dir, SECTION_HTG_SEED)?);
        }
        None => record_missing_seed(seed_dir, SECTION_HTG_SEED, warnings),
    }

    match load_seed_list::<DetailFailureLinkSeed>(seed_dir, DETAIL_FAILURE_LINKS_SEED)? {
        Some(seeds) => {
            counts.failure_links_upserted = upsert_failure_links(connection, &seeds)?;
            source_hashes.push(seed_entry(seed_dir, DETAIL_FAILURE_LINKS_SEED)?);
        }
        None => record_missing_seed(seed_dir, DETAIL_FAILURE_LINKS_SEED, warnings),
    }

    Ok(source_hashes)
}

fn seed_entry(seed_dir: &Path, filename: &str) -> Result<SeedEntry> {
    let sha256 = sha256_file(&seed_dir.join(filename))?;
    Ok(SeedEntry {
        filename: filename.to_string(),
        sha256,
    })
}

fn record_missing_seed(seed_dir: &Path, filename: &str, warnings: &mut Vec<String>) {
    let message = format!("seed file missing: {}", seed_dir.join(filename).display());
    warn!(path = %seed_dir.join(filename).display(), "seed file missing, skipping");
    warnings.push(message);
}
