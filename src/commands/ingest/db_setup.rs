use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::model::{ChapterDocument, Section};
use crate::util::now_utc_string;

use super::DB_SCHEMA_VERSION;
use super::seed::{
    DetailFailureLinkSeed, DetailSeed, FailureCaseSeed, GuidanceSeed, SectionDetailLinkSeed,
    SectionGuidanceLinkSeed,
};

pub(crate) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub(crate) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sections (
          code TEXT PRIMARY KEY,
          chapter_number INTEGER NOT NULL,
          title TEXT NOT NULL,
          level INTEGER DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS details (
          detail_id TEXT PRIMARY KEY,
          code TEXT NOT NULL,
          name TEXT NOT NULL,
          description TEXT,
          model_url TEXT,
          thumbnail_url TEXT,
          source_name TEXT
        );

        CREATE TABLE IF NOT EXISTS section_details (
          section_code TEXT NOT NULL,
          detail_id TEXT NOT NULL,
          relationship_type TEXT NOT NULL DEFAULT 'referenced',
          PRIMARY KEY (section_code, detail_id, relationship_type),
          FOREIGN KEY(section_code) REFERENCES sections(code),
          FOREIGN KEY(detail_id) REFERENCES details(detail_id)
        );

        CREATE TABLE IF NOT EXISTS htg_content (
          htg_id TEXT PRIMARY KEY,
          guide_name TEXT NOT NULL,
          source_document TEXT NOT NULL,
          content TEXT,
          pdf_page INTEGER
        );

        CREATE TABLE IF NOT EXISTS section_htg (
          section_code TEXT NOT NULL,
          htg_id TEXT NOT NULL,
          relevance TEXT,
          PRIMARY KEY (section_code, htg_id),
          FOREIGN KEY(section_code) REFERENCES sections(code),
          FOREIGN KEY(htg_id) REFERENCES htg_content(htg_id)
        );

        CREATE TABLE IF NOT EXISTS failure_cases (
          failure_case_id TEXT PRIMARY KEY,
          case_id TEXT NOT NULL,
          case_type TEXT NOT NULL,
          summary TEXT,
          outcome TEXT,
          pdf_url TEXT,
          failure_type TEXT
        );

        CREATE TABLE IF NOT EXISTS detail_failure_links (
          detail_id TEXT NOT NULL,
          failure_case_id TEXT NOT NULL,
          PRIMARY KEY (detail_id, failure_case_id),
          FOREIGN KEY(detail_id) REFERENCES details(detail_id),
          FOREIGN KEY(failure_case_id) REFERENCES failure_cases(failure_case_id)
        );

        CREATE INDEX IF NOT EXISTS idx_sections_chapter ON sections(chapter_number);
        CREATE INDEX IF NOT EXISTS idx_section_details_section ON section_details(section_code);
        CREATE INDEX IF NOT EXISTS idx_section_htg_section ON section_htg(section_code);
        CREATE INDEX IF NOT EXISTS idx_detail_failure_links_detail ON detail_failure_links(detail_id);
        ",
    )?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

pub(super) fn upsert_sections(
    connection: &mut Connection,
    chapter: &ChapterDocument,
) -> Result<usize> {
    let tx = connection.transaction()?;
    let mut upserted = 0_usize;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO sections(code, chapter_number, title, level)
            VALUES(?1, ?2, ?3, ?4)
            ON CONFLICT(code) DO UPDATE SET
              chapter_number=excluded.chapter_number,
              title=excluded.title,
              level=excluded.level
            ",
        )?;

        upserted += insert_section_rows(&mut statement, &chapter.sections, chapter.chapter_number)?;
    }

    tx.commit()?;
    Ok(upserted)
}

fn insert_section_rows(
    statement: &mut rusqlite::Statement<'_>,
    sections: &[Section],
    chapter_number: u32,
) -> Result<usize> {
    let mut upserted = 0_usize;

    for section in sections {
        statement.execute(params![
            &section.number,
            chapter_number,
            &section.title,
            section.level
        ])?;
        upserted += 1;
        upserted += insert_section_rows(statement, &section.subsections, chapter_number)?;
    }

    Ok(upserted)
}

pub(super) fn upsert_details(connection: &mut Connection, seeds: &[DetailSeed]) -> Result<usize> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO details(detail_id, code, name, description, model_url, thumbnail_url, source_name)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(detail_id) DO UPDATE SET
              code=excluded.code,
              name=excluded.name,
              description=excluded.description,
              model_url=excluded.model_url,
              thumbnail_url=excluded.thumbnail_url,
              source_name=excluded.source_name
            ",
        )?;

        for seed in seeds {
            statement.execute(params![
                &seed.id,
                &seed.code,
                &seed.name,
                &seed.description,
                &seed.model_url,
                &seed.thumbnail_url,
                &seed.source_name,
            ])?;
        }
    }

    tx.commit()?;
    Ok(seeds.len())
}

pub(super) fn upsert_guidance_blocks(
    connection: &mut Connection,
    seeds: &[GuidanceSeed],
) -> Result<usize> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO htg_content(htg_id, guide_name, source_document, content, pdf_page)
            VALUES(?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(htg_id) DO UPDATE SET
              guide_name=excluded.guide_name,
              source_document=excluded.source_document,
              content=excluded.content,
              pdf_page=excluded.pdf_page
            ",
        )?;

        for seed in seeds {
            statement.execute(params![
                &seed.id,
                &seed.guide_name,
                &seed.source_document,
                &seed.content,
                seed.pdf_page,
            ])?;
        }
    }

    tx.commit()?;
    Ok(seeds.len())
}

pub(super) fn upsert_failure_cases(
    connection: &mut Connection,
    seeds: &[FailureCaseSeed],
) -> Result<usize> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO failure_cases(failure_case_id, case_id, case_type, summary, outcome, pdf_url, failure_type)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(failure_case_id) DO UPDATE SET
              case_id=excluded.case_id,
              case_type=excluded.case_type,
              summary=excluded.summary,
              outcome=excluded.outcome,
              pdf_url=excluded.pdf_url,
              failure_type=excluded.failure_type
            ",
        )?;

        for seed in seeds {
            statement.execute(params![
                &seed.id,
                &seed.case_id,
                &seed.case_type,
                &seed.summary,
                &seed.outcome,
                &seed.pdf_url,
                &seed.failure_type,
            ])?;
        }
    }

    tx.commit()?;
    Ok(seeds.len())
}

pub(super) fn upsert_detail_links(
    connection: &mut Connection,
    seeds: &[SectionDetailLinkSeed],
) -> Result<usize> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO section_details(section_code, detail_id, relationship_type)
            VALUES(?1, ?2, ?3)
            ON CONFLICT(section_code, detail_id, relationship_type) DO NOTHING
            ",
        )?;

        for seed in seeds {
            statement.execute(params![
                &seed.section_code,
                &seed.detail_id,
                &seed.relationship_type,
            ])?;
        }
    }

    tx.commit()?;
    Ok(seeds.len())
}

pub(super) fn upsert_guidance_links(
    connection: &mut Connection,
    seeds: &[SectionGuidanceLinkSeed],
) -> Result<usize> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO section_htg(section_code, htg_id, relevance)
            VALUES(?1, ?2, ?3)
            ON CONFLICT(section_code, htg_id) DO UPDATE SET relevance=excluded.relevance
            ",
        )?;

        for seed in seeds {
            statement.execute(params![&seed.section_code, &seed.htg_id, &seed.relevance])?;
        }
    }

    tx.commit()?;
    Ok(seeds.len())
}

pub(super) fn upsert_failure_links(
    connection: &mut Connection,
    seeds: &[DetailFailureLinkSeed],
) -> Result<usize> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO detail_failure_links(detail_id, failure_case_id)
            VALUES(?1, ?2)
            ON CONFLICT(detail_id, failure_case_id) DO NOTHING
            ",
        )?;

        for seed in seeds {
            statement.execute(params![&seed.detail_id, &seed.failure_case_id])?;
        }
    }

    tx.commit()?;
    Ok(seeds.len())
}
