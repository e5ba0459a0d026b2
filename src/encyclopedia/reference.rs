use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::model::Section;
use crate::store::ChapterStore;

const CHAPTER_BASE_PATH: &str = "/encyclopedia/cop";

/// Immutable lookup from section code to navigation target.
///
/// Built once over the whole chapter corpus and shared by reference for the
/// process lifetime; entries exist for chapter-level codes ("8") and for every
/// nested section code ("8.5.4", "8.5.4A"). Never mutated after construction.
#[derive(Debug, Default)]
pub struct ReferenceResolver {
    targets: HashMap<String, String>,
}

impl ReferenceResolver {
    /// Walks every chapter document in the corpus and indexes its section
    /// tree. A missing or unparseable chapter fails the whole build.
    pub async fn build(corpus: &dyn ChapterStore) -> Result<Self> {
        let chapter_numbers = corpus.chapter_numbers().await?;

        let mut targets = HashMap::new();
        let mut collisions = 0_usize;

        for chapter_number in chapter_numbers {
            let chapter = corpus
                .load_chapter_document(chapter_number)
                .await
                .with_context(|| format!("failed to load chapter {chapter_number}"))?
                .with_context(|| format!("chapter {chapter_number} missing from corpus"))?;

            let base = format!("{CHAPTER_BASE_PATH}/{}", chapter.chapter_number);
            if targets
                .insert(chapter.chapter_number.to_string(), base.clone())
                .is_some()
            {
                warn!(code = %chapter.chapter_number, "duplicate chapter code in corpus, keeping later entry");
                collisions += 1;
            }

            collisions += walk_sections(&chapter.sections, &base, &mut targets);
        }

        info!(entries = targets.len(), collisions, "reference map built");

        Ok(Self { targets })
    }

    /// Pure map lookup. Unknown codes return `None`; callers must treat an
    /// unresolved reference as plain text, never as a broken link.
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.targets.get(code).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.targets.len()
    }

    #[cfg(test)]
    pub(crate) fn from_targets(targets: HashMap<String, String>) -> Self {
        Self { targets }
    }
}

fn walk_sections(
    sections: &[Section],
    base: &str,
    targets: &mut HashMap<String, String>,
) -> usize {
    let mut collisions = 0;

    for section in sections {
        let target = format!("{base}#section-{}", section.number);
        if targets.insert(section.number.clone(), target).is_some() {
            warn!(code = %section.number, "duplicate section code in corpus, keeping later entry");
            collisions += 1;
        }

        collisions += walk_sections(&section.subsections, base, targets);
    }

    collisions
}
