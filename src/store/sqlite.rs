use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{Connection, params};
use tokio::task;

use crate::encyclopedia::supplementary::{
    CaseLawAnnotation, DetailAnnotation, GuidanceAnnotation, GuidanceContentBlock,
};

use super::SupplementaryStore;

/// Supplementary annotation database produced by the ingest command. Opens a
/// fresh read connection per lookup under `spawn_blocking`.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    async fn with_connection<T, F>(&self, query: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let connection = Connection::open(&db_path)
                .with_context(|| format!("failed to open {}", db_path.display()))?;
            query(&connection)
        })
        .await
        .context("database task failed")?
    }
}

#[async_trait]
impl SupplementaryStore for SqliteStore {
    async fn fetch_linked_details(
        &self,
        chapter_number: u32,
    ) -> Result<Vec<(String, DetailAnnotation)>> {
        self.with_connection(move |connection| query_linked_details(connection, chapter_number))
            .await
    }

    async fn fetch_linked_guidance(
        &self,
        chapter_number: u32,
    ) -> Result<Vec<(String, GuidanceAnnotation)>> {
        self.with_connection(move |connection| query_linked_guidance(connection, chapter_number))
            .await
    }

    async fn fetch_guidance_full_text(
        &self,
        chapter_number: u32,
    ) -> Result<Vec<(String, GuidanceContentBlock)>> {
        self.with_connection(move |connection| {
            query_guidance_full_text(connection, chapter_number)
        })
        .await
    }

    async fn fetch_case_law(
        &self,
        chapter_number: u32,
    ) -> Result<Vec<(String, CaseLawAnnotation)>> {
        self.with_connection(move |connection| query_case_law(connection, chapter_number))
            .await
    }
}

pub(crate) fn query_linked_details(
    connection: &Connection,
    chapter_number: u32,
) -> Result<Vec<(String, DetailAnnotation)>> {
    let mut statement = connection.prepare(
        "
        SELECT
          s.code,
          d.detail_id,
          d.code,
          d.name,
          d.description,
          d.model_url,
          d.thumbnail_url,
          d.source_name,
          sd.relationship_type
        FROM section_details sd
        JOIN sections s ON s.code = sd.section_code
        JOIN details d ON d.detail_id = sd.detail_id
        WHERE s.chapter_number = ?1
        ORDER BY s.code, d.code, sd.relationship_type
        ",
    )?;

    let mut rows = statement.query(params![chapter_number])?;
    let mut linked = Vec::new();

    while let Some(row) = rows.next()? {
        let section_code: String = row.get(0)?;
        linked.push((
            section_code,
            DetailAnnotation {
                id: row.get(1)?,
                code: row.get(2)?,
                name: row.get(3)?,
                description: row.get(4)?,
                model_url: row.get(5)?,
                thumbnail_url: row.get(6)?,
                source_name: row
                    .get::<_, Option<String>>(7)?
                    .unwrap_or_else(|| "Unknown".to_string()),
                relationship_type: row.get(8)?,
            },
        ));
    }

    Ok(linked)
}

pub(crate) fn query_linked_guidance(
    connection: &Connection,
    chapter_number: u32,
) -> Result<Vec<(String, GuidanceAnnotation)>> {
    let mut statement = connection.prepare(
        "
        SELECT s.code, h.htg_id, h.guide_name, h.source_document, sh.relevance
        FROM section_htg sh
        JOIN sections s ON s.code = sh.section_code
        JOIN htg_content h ON h.htg_id = sh.htg_id
        WHERE s.chapter_number = ?1
        ORDER BY s.code, h.guide_name
        ",
    )?;

    let mut rows = statement.query(params![chapter_number])?;
    let mut linked = Vec::new();

    while let Some(row) = rows.next()? {
        let section_code: String = row.get(0)?;
        linked.push((
            section_code,
            GuidanceAnnotation {
                id: row.get(1)?,
                guide_name: row.get(2)?,
                source_document: row.get(3)?,
                relevance: row.get(4)?,
            },
        ));
    }

    Ok(linked)
}

pub(crate) fn query_guidance_full_text(
    connection: &Connection,
    chapter_number: u32,
) -> Result<Vec<(String, GuidanceContentBlock)>> {
    let mut statement = connection.prepare(
        "
        SELECT
          s.code,
          h.htg_id,
          h.guide_name,
          h.source_document,
          h.content,
          h.pdf_page,
          sh.relevance
        FROM section_htg sh
        JOIN sections s ON s.code = sh.section_code
        JOIN htg_content h ON h.htg_id = sh.htg_id
        WHERE s.chapter_number = ?1
        ORDER BY s.code, h.guide_name
        ",
    )?;

    let mut rows = statement.query(params![chapter_number])?;
    let mut blocks = Vec::new();

    while let Some(row) = rows.next()? {
        let section_code: String = row.get(0)?;
        blocks.push((
            section_code,
            GuidanceContentBlock {
                id: row.get(1)?,
                guide_name: row.get(2)?,
                source_document: row.get(3)?,
                content: row.get(4)?,
                pdf_page: row.get(5)?,
                relevance: row.get(6)?,
            },
        ));
    }

    Ok(blocks)
}

/// Case law reaches sections through their linked details, so one case can
/// surface for the same section via several details. The aggregator
/// deduplicates; this query returns the raw join rows.
pub(crate) fn query_case_law(
    connection: &Connection,
    chapter_number: u32,
) -> Result<Vec<(String, CaseLawAnnotation)>> {
    let mut statement = connection.prepare(
        "
        SELECT
          s.code,
          f.failure_case_id,
          f.case_id,
          f.case_type,
          f.summary,
          f.outcome,
          f.pdf_url,
          f.failure_type
        FROM sections s
        JOIN section_details sd ON sd.section_code = s.code
        JOIN details d ON d.detail_id = sd.detail_id
        JOIN detail_failure_links dfl ON dfl.detail_id = d.detail_id
        JOIN failure_cases f ON f.failure_case_id = dfl.failure_case_id
        WHERE s.chapter_number = ?1
        ORDER BY s.code, f.case_id
        ",
    )?;

    let mut rows = statement.query(params![chapter_number])?;
    let mut cases = Vec::new();

    while let Some(row) = rows.next()? {
        let section_code: String = row.get(0)?;
        cases.push((
            section_code,
            CaseLawAnnotation {
                id: row.get(1)?,
                case_id: row.get(2)?,
                case_type: row.get(3)?,
                summary: row.get(4)?,
                outcome: row.get(5)?,
                pdf_url: row.get(6)?,
                failure_type: row.get(7)?,
            },
        ));
    }

    Ok(cases)
}
