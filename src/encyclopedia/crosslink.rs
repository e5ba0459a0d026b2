use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use super::normalize::normalize_content;
use super::reference::ReferenceResolver;

/// Maximum number of link segments produced for a single paragraph.
const MAX_LINKS_PER_PARAGRAPH: usize = 5;

/// Atomic output unit of cross-linking. Concatenating the `content` of every
/// segment in order reproduces the input paragraph exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    Text {
        content: String,
    },
    Link {
        content: String,
        href: String,
        code: String,
    },
}

impl Segment {
    pub fn content(&self) -> &str {
        match self {
            Segment::Text { content } | Segment::Link { content, .. } => content,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Segment::Link { .. })
    }
}

struct ReferenceCandidate {
    start: usize,
    end: usize,
    code: String,
}

/// Detects inline section references in running prose and rewrites resolvable
/// ones as link segments.
///
/// Detection matches cue-word forms ("See 8.5.4", "refer to Section 3.7",
/// "as specified in 5.1A", "Section 12.3.2", "clause 4.2") plus bare dotted
/// codes at word boundaries. Policy is applied as a post-filter over the raw
/// candidates, left to right: unresolvable codes stay plain text, only the
/// first mention of a code links within a paragraph, and at most
/// `MAX_LINKS_PER_PARAGRAPH` links are produced per paragraph.
pub struct CrossLinker {
    pattern: Regex,
}

impl CrossLinker {
    pub fn new() -> Result<Self> {
        // Cue-word alternatives come first so they win over the bare form at
        // the same start offset. The code itself is always in a capture group;
        // only the code becomes link text, cue words stay plain.
        let pattern = Regex::new(
            r"(?:[Ss]ee|[Rr]efer\s+to(?:\s+[Ss]ection)?|[Aa]s\s+(?:specified|described)\s+in|[Ss]ection|[Cc]lause)\s+(\d+(?:\.\d+){0,3}[A-Z]?)|(\d+\.\d+(?:\.\d+){0,2}[A-Z]?)",
        )
        .context("failed to compile section reference pattern")?;

        Ok(Self { pattern })
    }

    /// Cross-links one paragraph. First-mention tracking and the link budget
    /// are scoped to this paragraph; the same code may link again in another
    /// paragraph.
    pub fn link_paragraph(&self, text: &str, resolver: &ReferenceResolver) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut linked_codes = HashSet::new();
        let mut link_count = 0_usize;
        let mut last_index = 0_usize;

        for candidate in self.candidates(text) {
            if link_count >= MAX_LINKS_PER_PARAGRAPH {
                break;
            }

            let Some(href) = resolver.resolve(&candidate.code) else {
                continue;
            };

            if !linked_codes.insert(candidate.code.clone()) {
                continue;
            }

            if candidate.start > last_index {
                segments.push(Segment::Text {
                    content: text[last_index..candidate.start].to_string(),
                });
            }

            segments.push(Segment::Link {
                content: candidate.code.clone(),
                href: href.to_string(),
                code: candidate.code,
            });

            link_count += 1;
            last_index = candidate.end;
        }

        if last_index < text.len() {
            segments.push(Segment::Text {
                content: text[last_index..].to_string(),
            });
        }

        if segments.is_empty() {
            segments.push(Segment::Text {
                content: text.to_string(),
            });
        }

        segments
    }

    /// Normalizes raw section content and cross-links each resulting
    /// paragraph independently.
    pub fn link_text(&self, raw: &str, resolver: &ReferenceResolver) -> Vec<Vec<Segment>> {
        normalize_content(raw)
            .iter()
            .map(|paragraph| self.link_paragraph(paragraph, resolver))
            .collect()
    }

    fn candidates(&self, text: &str) -> Vec<ReferenceCandidate> {
        let mut candidates = Vec::new();

        for captures in self.pattern.captures_iter(text) {
            let Some(group) = captures.get(1).or_else(|| captures.get(2)) else {
                continue;
            };

            // The bare form has no cue word anchoring it, so it must sit at a
            // word boundary: "8.5.4 mm" style false positives are a known
            // limit of the heuristic, but "8.5.4mm" never matches.
            if captures.get(2).is_some() && !bare_code_at_word_boundary(text, group.start(), group.end())
            {
                continue;
            }

            candidates.push(ReferenceCandidate {
                start: group.start(),
                end: group.end(),
                code: group.as_str().to_string(),
            });
        }

        candidates
    }
}

fn bare_code_at_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map(|ch| ch.is_whitespace() || ch == '(')
        .unwrap_or(true);

    let after_ok = text[end..]
        .chars()
        .next()
        .map(|ch| ch.is_whitespace() || matches!(ch, '.' | ',' | ';' | ':' | ')'))
        .unwrap_or(true);

    before_ok && after_ok
}
