use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub(super) const DETAILS_SEED: &str = "details.json";
pub(super) const GUIDANCE_SEED: &str = "htg-content.json";
pub(super) const FAILURE_CASES_SEED: &str = "failure-cases.json";
pub(super) const SECTION_DETAILS_SEED: &str = "section-details.json";
pub(super) const SECTION_HTG_SEED: &str = "section-htg.json";
pub(super) const DETAIL_FAILURE_LINKS_SEED: &str = "detail-failure-links.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DetailSeed {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GuidanceSeed {
    pub id: String,
    pub guide_name: String,
    pub source_document: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub pdf_page: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FailureCaseSeed {
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

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SectionDetailLinkSeed {
    pub section_code: String,
    pub detail_id: String,
    #[serde(default = "default_relationship_type")]
    pub relationship_type: String,
}

fn default_relationship_type() -> String {
    "referenced".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SectionGuidanceLinkSeed {
    pub section_code: String,
    pub htg_id: String,
    #[serde(default)]
    pub relevance: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DetailFailureLinkSeed {
    pub detail_id: String,
    pub failure_case_id: String,
}

/// Loads one seed file from the seed directory. Missing files are reported
/// as `None` so the caller can record a warning and continue; each seed
/// source is imported independently.
pub(super) fn load_seed_list<T: DeserializeOwned>(
    seed_dir: &Path,
    filename: &str,
) -> Result<Option<Vec<T>>> {
    let path = seed_dir.join(filename);
    if !path.exists() {
        return Ok(None);
    }

    let raw =
        std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let seeds = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(Some(seeds))
}
