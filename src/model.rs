use serde::{Deserialize, Serialize};

/// One chapter of the Code of Practice corpus, loaded from its
/// `chapter-{n}.json` backing file. Immutable at request time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDocument {
    pub chapter_number: u32,
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A node in a chapter's section tree. The dotted code (e.g. "8.5.4A")
/// is globally unique across the whole corpus; each section exclusively
/// owns its subsections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<SectionImage>,
    #[serde(default)]
    pub subsections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionImage {
    pub src: String,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub filename: String,
    pub chapter_number: u32,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub chapter_count: usize,
    pub chapters: Vec<CorpusEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedEntry {
    pub filename: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestCounts {
    pub chapters_seen: usize,
    pub sections_upserted: usize,
    pub details_upserted: usize,
    pub guidance_blocks_upserted: usize,
    pub failure_cases_upserted: usize,
    pub detail_links_upserted: usize,
    pub guidance_links_upserted: usize,
    pub failure_links_upserted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub generated_at: String,
    pub db_path: String,
    pub corpus_directory: String,
    pub seed_directory: String,
    pub counts: IngestCounts,
    pub source_hashes: Vec<SeedEntry>,
    pub warnings: Vec<String>,
}
