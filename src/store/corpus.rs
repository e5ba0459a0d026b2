use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tokio::task;

use crate::model::ChapterDocument;

use super::ChapterStore;

/// Chapter corpus stored as `chapter-{n}.json` files in one directory.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    corpus_dir: PathBuf,
}

impl CorpusStore {
    pub fn new(corpus_dir: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
        }
    }

    pub fn chapter_path(&self, chapter_number: u32) -> PathBuf {
        self.corpus_dir.join(format!("chapter-{chapter_number}.json"))
    }

    pub(crate) fn discover_chapter_numbers(corpus_dir: &Path) -> Result<Vec<u32>> {
        let pattern = Regex::new(r"^chapter-(\d+)\.json$")
            .context("failed to compile corpus filename regex")?;

        let entries = fs::read_dir(corpus_dir)
            .with_context(|| format!("failed to read {}", corpus_dir.display()))?;

        let mut numbers = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to read entry in {}", corpus_dir.display()))?;

            let filename = entry.file_name();
            let Some(filename) = filename.to_str() else {
                continue;
            };

            if let Some(captures) = pattern.captures(filename) {
                let number = captures
                    .get(1)
                    .map(|value| value.as_str())
                    .context("missing chapter number capture")?
                    .parse::<u32>()
                    .with_context(|| format!("invalid chapter number in filename: {filename}"))?;
                numbers.push(number);
            }
        }

        numbers.sort_unstable();
        Ok(numbers)
    }

    pub(crate) fn read_chapter_document(path: &Path) -> Result<Option<ChapterDocument>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let chapter = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        Ok(Some(chapter))
    }
}

#[async_trait]
impl ChapterStore for CorpusStore {
    async fn chapter_numbers(&self) -> Result<Vec<u32>> {
        let corpus_dir = self.corpus_dir.clone();
        task::spawn_blocking(move || Self::discover_chapter_numbers(&corpus_dir))
            .await
            .context("corpus discovery task failed")?
    }

    async fn load_chapter_document(
        &self,
        chapter_number: u32,
    ) -> Result<Option<ChapterDocument>> {
        let path = self.chapter_path(chapter_number);
        task::spawn_blocking(move || Self::read_chapter_document(&path))
            .await
            .context("chapter load task failed")?
    }
}
