use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::info;

use crate::cli::InventoryArgs;
use crate::model::{CorpusEntry, CorpusInventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.corpus_dir)?;

    if args.dry_run {
        info!(
            chapter_count = manifest.chapter_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.cache_root.join("manifests").join("corpus_inventory.json"));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(chapter_count = manifest.chapter_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(corpus_dir: &Path) -> Result<CorpusInventoryManifest> {
    let pattern = Regex::new(r"^chapter-(\d+)\.json$")
        .context("failed to compile corpus filename regex")?;

    let mut chapter_paths = discover_chapter_files(corpus_dir)?;
    chapter_paths.sort();

    if chapter_paths.is_empty() {
        bail!("no chapter files found in {}", corpus_dir.display());
    }

    let mut chapters = Vec::with_capacity(chapter_paths.len());
    for path in chapter_paths {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        let chapter_number = parse_chapter_number(&filename, &pattern)?;
        let sha256 = sha256_file(&path)?;

        chapters.push(CorpusEntry {
            filename,
            chapter_number,
            sha256,
        });
    }

    chapters.sort_by(|a, b| a.chapter_number.cmp(&b.chapter_number));

    Ok(CorpusInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: corpus_dir.display().to_string(),
        chapter_count: chapters.len(),
        chapters,
    })
}

fn discover_chapter_files(corpus_dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut chapter_files = Vec::new();

    let entries = std::fs::read_dir(corpus_dir)
        .with_context(|| format!("failed to read {}", corpus_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", corpus_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_chapter = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("chapter-") && name.ends_with(".json"))
            .unwrap_or(false);

        if is_chapter {
            chapter_files.push(path);
        }
    }

    Ok(chapter_files)
}

fn parse_chapter_number(filename: &str, pattern: &Regex) -> Result<u32> {
    let captures = pattern
        .captures(filename)
        .with_context(|| format!("filename does not match expected chapter pattern: {filename}"))?;

    captures
        .get(1)
        .map(|m| m.as_str())
        .context("missing chapter number capture")?
        .parse::<u32>()
        .with_context(|| format!("invalid chapter number in filename: {filename}"))
}
