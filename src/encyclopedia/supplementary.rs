use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::SupplementaryStore;

/// Installation-detail record linked to a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailAnnotation {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub source_name: String,
    pub relationship_type: String,
}

/// Lightweight how-to-guide link (no full text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceAnnotation {
    pub id: String,
    pub guide_name: String,
    pub source_document: String,
    #[serde(default)]
    pub relevance: Option<String>,
}

/// How-to-guide excerpt with its full text and source page, for inline
/// "Practical Guidance" rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceContentBlock {
    pub id: String,
    pub guide_name: String,
    pub source_document: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub pdf_page: Option<i64>,
    #[serde(default)]
    pub relevance: Option<String>,
}

/// Failure/determination record linked to a section through its details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLawAnnotation {
    pub id: String,
    pub case_id: String,
    pub case_type: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub failure_type: Option<String>,
}

/// The three independently-sourced annotation lists for one section. A
/// section with no annotations in a source simply has that list empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSet {
    pub details: Vec<DetailAnnotation>,
    pub guides: Vec<GuidanceAnnotation>,
    pub case_law: Vec<CaseLawAnnotation>,
}

pub(crate) trait ExternalId {
    fn external_id(&self) -> &str;
}

impl ExternalId for DetailAnnotation {
    fn external_id(&self) -> &str {
        &self.id
    }
}

impl ExternalId for GuidanceAnnotation {
    fn external_id(&self) -> &str {
        &self.id
    }
}

impl ExternalId for GuidanceContentBlock {
    fn external_id(&self) -> &str {
        &self.id
    }
}

impl ExternalId for CaseLawAnnotation {
    fn external_id(&self) -> &str {
        &self.id
    }
}

/// Groups flat (section code, annotation) rows into per-section lists,
/// dropping rows whose external id was already seen for that section. The
/// join paths run through link tables, so upstream fan-out can legitimately
/// duplicate rows; first occurrence wins.
pub(crate) fn group_by_section<T: ExternalId>(rows: Vec<(String, T)>) -> HashMap<String, Vec<T>> {
    let mut grouped: HashMap<String, Vec<T>> = HashMap::new();

    for (section_code, annotation) in rows {
        let entries = grouped.entry(section_code).or_default();
        if entries
            .iter()
            .any(|existing| existing.external_id() == annotation.external_id())
        {
            continue;
        }
        entries.push(annotation);
    }

    grouped
}

/// Runs the detail and guidance-link lookups concurrently and groups both
/// result sets by section code. Shared between the aggregator and the
/// article composer.
pub(crate) async fn fetch_details_and_guides(
    store: &dyn SupplementaryStore,
    chapter_number: u32,
) -> Result<(
    HashMap<String, Vec<DetailAnnotation>>,
    HashMap<String, Vec<GuidanceAnnotation>>,
)> {
    let (detail_rows, guide_rows) = tokio::try_join!(
        store.fetch_linked_details(chapter_number),
        store.fetch_linked_guidance(chapter_number),
    )?;

    Ok((group_by_section(detail_rows), group_by_section(guide_rows)))
}

/// Fetches every annotation attached to the sections of one chapter and
/// merges the three sources into one lookup keyed by section code.
///
/// The key set is the union of codes seen across all three lookups; a section
/// present in only one source still gets a full `AnnotationSet` with the other
/// lists empty. Any single lookup failure fails the whole aggregation.
pub async fn get_supplementary(
    store: &dyn SupplementaryStore,
    chapter_number: u32,
) -> Result<HashMap<String, AnnotationSet>> {
    let ((mut details, mut guides), case_rows) = tokio::try_join!(
        fetch_details_and_guides(store, chapter_number),
        store.fetch_case_law(chapter_number),
    )?;

    let mut case_law = group_by_section(case_rows);

    let section_codes: HashSet<String> = details
        .keys()
        .chain(guides.keys())
        .chain(case_law.keys())
        .cloned()
        .collect();

    let mut aggregated = HashMap::with_capacity(section_codes.len());
    for code in section_codes {
        let set = AnnotationSet {
            details: details.remove(&code).unwrap_or_default(),
            guides: guides.remove(&code).unwrap_or_default(),
            case_law: case_law.remove(&code).unwrap_or_default(),
        };
        aggregated.insert(code, set);
    }

    Ok(aggregated)
}
