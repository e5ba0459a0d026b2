use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::{ChapterDocument, Section, SectionImage};
use crate::store::{ChapterStore, SupplementaryStore};

use super::crosslink::{CrossLinker, Segment};
use super::reference::ReferenceResolver;
use super::supplementary::{
    CaseLawAnnotation, DetailAnnotation, GuidanceAnnotation, GuidanceContentBlock,
    fetch_details_and_guides, group_by_section,
};

/// All supplementary content composed for one section: linked details, guide
/// links, full-text guidance blocks, and case-law entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedAnnotation {
    pub details: Vec<DetailAnnotation>,
    pub htg_guides: Vec<GuidanceAnnotation>,
    pub htg_content: Vec<GuidanceContentBlock>,
    pub case_law: Vec<CaseLawAnnotation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedSection {
    pub number: String,
    pub title: String,
    pub level: u32,
    pub paragraphs: Vec<Vec<Segment>>,
    pub images: Vec<SectionImage>,
    pub subsections: Vec<ComposedSection>,
}

/// Presentation-facing output for one chapter render: the ordered section
/// tree with cross-linked paragraph segments, plus the per-section
/// annotation map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedArticle {
    pub chapter_number: u32,
    pub title: String,
    pub version: Option<String>,
    pub sections: Vec<ComposedSection>,
    pub supplementary: HashMap<String, ComposedAnnotation>,
}

/// Merges the three supplementary sources for one chapter into a single
/// lookup keyed by section code.
///
/// The detail/guide pair lookup, the guidance-full-text lookup and the
/// case-law lookup run concurrently; the result is a pure merge over the
/// union of their key sets, with empty lists where a source has no entry.
/// Failure of any constituent fetch fails the whole composition.
pub async fn compose_supplementary(
    store: &dyn SupplementaryStore,
    chapter_number: u32,
) -> Result<HashMap<String, ComposedAnnotation>> {
    let ((mut details, mut guides), content_rows, case_rows) = tokio::try_join!(
        fetch_details_and_guides(store, chapter_number),
        store.fetch_guidance_full_text(chapter_number),
        store.fetch_case_law(chapter_number),
    )?;

    let mut content = group_by_section(content_rows);
    let mut case_law = group_by_section(case_rows);

    let section_codes: HashSet<String> = details
        .keys()
        .chain(guides.keys())
        .chain(content.keys())
        .chain(case_law.keys())
        .cloned()
        .collect();

    let mut composed = HashMap::with_capacity(section_codes.len());
    for code in section_codes {
        let annotation = ComposedAnnotation {
            details: details.remove(&code).unwrap_or_default(),
            htg_guides: guides.remove(&code).unwrap_or_default(),
            htg_content: content.remove(&code).unwrap_or_default(),
            case_law: case_law.remove(&code).unwrap_or_default(),
        };
        composed.insert(code, annotation);
    }

    Ok(composed)
}

/// Composes one chapter for rendering: loads the chapter document and the
/// supplementary map concurrently, then normalizes and cross-links every
/// section's prose. Supplementary annotations are merged as-is; only chapter
/// body text is normalized and cross-linked.
pub async fn compose_article(
    corpus: &dyn ChapterStore,
    store: &dyn SupplementaryStore,
    resolver: &ReferenceResolver,
    linker: &CrossLinker,
    chapter_number: u32,
) -> Result<ComposedArticle> {
    let (chapter, supplementary) = tokio::try_join!(
        load_required_chapter(corpus, chapter_number),
        compose_supplementary(store, chapter_number),
    )?;

    let sections = chapter
        .sections
        .iter()
        .map(|section| compose_section(section, resolver, linker))
        .collect();

    Ok(ComposedArticle {
        chapter_number: chapter.chapter_number,
        title: chapter.title,
        version: chapter.version,
        sections,
        supplementary,
    })
}

async fn load_required_chapter(
    corpus: &dyn ChapterStore,
    chapter_number: u32,
) -> Result<ChapterDocument> {
    corpus
        .load_chapter_document(chapter_number)
        .await
        .with_context(|| format!("failed to load chapter {chapter_number}"))?
        .with_context(|| format!("chapter {chapter_number} missing from corpus"))
}

fn compose_section(
    section: &Section,
    resolver: &ReferenceResolver,
    linker: &CrossLinker,
) -> ComposedSection {
    let paragraphs = section
        .content
        .as_deref()
        .map(|content| linker.link_text(content, resolver))
        .unwrap_or_default();

    ComposedSection {
        number: section.number.clone(),
        title: section.title.clone(),
        level: section.level,
        paragraphs,
        images: section.images.clone(),
        subsections: section
            .subsections
            .iter()
            .map(|child| compose_section(child, resolver, linker))
            .collect(),
    }
}
