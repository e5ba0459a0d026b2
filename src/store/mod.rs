use anyhow::Result;
use async_trait::async_trait;

use crate::encyclopedia::supplementary::{
    CaseLawAnnotation, DetailAnnotation, GuidanceAnnotation, GuidanceContentBlock,
};
use crate::model::ChapterDocument;

mod corpus;
mod sqlite;

pub use corpus::CorpusStore;
pub use sqlite::SqliteStore;
#[cfg(test)]
pub(crate) use sqlite::{
    query_case_law, query_guidance_full_text, query_linked_details, query_linked_guidance,
};

/// Backing store for the chapter document corpus.
#[async_trait]
pub trait ChapterStore: Send + Sync {
    async fn chapter_numbers(&self) -> Result<Vec<u32>>;

    async fn load_chapter_document(&self, chapter_number: u32)
    -> Result<Option<ChapterDocument>>;
}

/// Black-box async lookups over the supplementary annotation sources. Each
/// returns a flat list of (section code, annotation) pairs scoped to one
/// chapter's sections, and may fail with a generic data-access error.
#[async_trait]
pub trait SupplementaryStore: Send + Sync {
    async fn fetch_linked_details(
        &self,
        chapter_number: u32,
    ) -> Result<Vec<(String, DetailAnnotation)>>;

    async fn fetch_linked_guidance(
        &self,
        chapter_number: u32,
    ) -> Result<Vec<(String, GuidanceAnnotation)>>;

    async fn fetch_guidance_full_text(
        &self,
        chapter_number: u32,
    ) -> Result<Vec<(String, GuidanceContentBlock)>>;

    async fn fetch_case_law(&self, chapter_number: u32)
    -> Result<Vec<(String, CaseLawAnnotation)>>;
}
