use std::path::Path;

use rusqlite::Connection;

use crate::model::{ChapterDocument, Section};
use crate::store::{
    query_case_law, query_guidance_full_text, query_linked_details, query_linked_guidance,
};

use super::*;

fn memory_db() -> Connection {
    let connection = Connection::open_in_memory().expect("open in-memory database");
    ensure_schema(&connection).expect("schema applies");
    connection
}

fn section(number: &str, title: &str, subsections: Vec<Section>) -> Section {
    Section {
        number: number.to_string(),
        title: title.to_string(),
        level: number.split('.').count() as u32,
        content: None,
        images: Vec::new(),
        subsections,
    }
}

fn chapter_eight() -> ChapterDocument {
    ChapterDocument {
        chapter_number: 8,
        title: "Roof Cladding".to_string(),
        version: Some("2024".to_string()),
        sections: vec![section(
            "8.5",
            "Underlay",
            vec![
                section("8.5.4", "Underlay support", vec![]),
                section("8.5.5", "Laps", vec![]),
            ],
        )],
    }
}

fn detail_seed(id: &str, source_name: Option<&str>) -> DetailSeed {
    DetailSeed {
        id: id.to_string(),
        code: format!("RANZ-{id}"),
        name: format!("Detail {id}"),
        description: None,
        model_url: None,
        thumbnail_url: None,
        source_name: source_name.map(ToOwned::to_owned),
    }
}

fn count(connection: &Connection, table: &str) -> i64 {
    connection
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .expect("count query")
}

#[test]
fn ensure_schema_is_idempotent_and_records_version() {
    let connection = memory_db();
    ensure_schema(&connection).expect("second application succeeds");

    let version: String = connection
        .query_row(
            "SELECT value FROM metadata WHERE key = 'db_schema_version'",
            [],
            |row| row.get(0),
        )
        .expect("version row present");
    assert_eq!(version, DB_SCHEMA_VERSION);
}

#[test]
fn upsert_sections_flattens_nested_tree() {
    let mut connection = memory_db();

    let upserted = upsert_sections(&mut connection, &chapter_eight()).expect("sections upsert");

    assert_eq!(upserted, 3);
    assert_eq!(count(&connection, "sections"), 3);

    let level: i64 = connection
        .query_row(
            "SELECT level FROM sections WHERE code = '8.5.4'",
            [],
            |row| row.get(0),
        )
        .expect("nested section row");
    assert_eq!(level, 3);
}

#[test]
fn upsert_sections_replays_without_duplicating_rows() {
    let mut connection = memory_db();

    upsert_sections(&mut connection, &chapter_eight()).expect("first upsert");
    let mut updated = chapter_eight();
    updated.sections[0].title = "Roofing Underlay".to_string();
    upsert_sections(&mut connection, &updated).expect("second upsert");

    assert_eq!(count(&connection, "sections"), 3);
    let title: String = connection
        .query_row("SELECT title FROM sections WHERE code = '8.5'", [], |row| {
            row.get(0)
        })
        .expect("updated row");
    assert_eq!(title, "Roofing Underlay");
}

#[test]
fn seed_lists_parse_camel_case_with_defaults() {
    let details: Vec<DetailSeed> = serde_json::from_str(
        r#"[{"id": "d1", "code": "RANZ-d1", "name": "Apron flashing", "modelUrl": "https://example.test/d1"}]"#,
    )
    .expect("detail seed parses");
    assert_eq!(details[0].model_url.as_deref(), Some("https://example.test/d1"));
    assert!(details[0].description.is_none());
    assert!(details[0].source_name.is_none());

    let links: Vec<SectionDetailLinkSeed> = serde_json::from_str(
        r#"[{"sectionCode": "8.5.4", "detailId": "d1"},
            {"sectionCode": "8.5.4", "detailId": "d2", "relationshipType": "illustrated"}]"#,
    )
    .expect("link seed parses");
    assert_eq!(links[0].relationship_type, "referenced");
    assert_eq!(links[1].relationship_type, "illustrated");
}

#[test]
fn load_seed_list_reports_missing_file_as_none() {
    let loaded: Option<Vec<DetailSeed>> =
        load_seed_list(Path::new("no-such-seed-dir"), DETAILS_SEED).expect("missing file is ok");
    assert!(loaded.is_none());
}

#[test]
fn linked_details_query_joins_sections_and_fills_unknown_source() {
    let mut connection = memory_db();
    upsert_sections(&mut connection, &chapter_eight()).expect("sections");
    upsert_details(
        &mut connection,
        &[detail_seed("d1", Some("RANZ")), detail_seed("d2", None)],
    )
    .expect("details");
    upsert_detail_links(
        &mut connection,
        &[
            SectionDetailLinkSeed {
                section_code: "8.5.4".to_string(),
                detail_id: "d1".to_string(),
                relationship_type: "referenced".to_string(),
            },
            SectionDetailLinkSeed {
                section_code: "8.5.5".to_string(),
                detail_id: "d2".to_string(),
                relationship_type: "referenced".to_string(),
            },
        ],
    )
    .expect("links");

    let linked = query_linked_details(&connection, 8).expect("query");

    assert_eq!(linked.len(), 2);
    assert_eq!(linked[0].0, "8.5.4");
    assert_eq!(linked[0].1.source_name, "RANZ");
    assert_eq!(linked[1].0, "8.5.5");
    assert_eq!(linked[1].1.source_name, "Unknown");

    assert!(query_linked_details(&connection, 9).expect("query").is_empty());
}

#[test]
fn detail_link_relationship_types_produce_separate_rows() {
    let mut connection = memory_db();
    upsert_sections(&mut connection, &chapter_eight()).expect("sections");
    upsert_details(&mut connection, &[detail_seed("d1", Some("RANZ"))]).expect("details");
    upsert_detail_links(
        &mut connection,
        &[
            SectionDetailLinkSeed {
                section_code: "8.5.4".to_string(),
                detail_id: "d1".to_string(),
                relationship_type: "referenced".to_string(),
            },
            SectionDetailLinkSeed {
                section_code: "8.5.4".to_string(),
                detail_id: "d1".to_string(),
                relationship_type: "illustrated".to_string(),
            },
            SectionDetailLinkSeed {
                section_code: "8.5.4".to_string(),
                detail_id: "d1".to_string(),
                relationship_type: "illustrated".to_string(),
            },
        ],
    )
    .expect("links");

    let linked = query_linked_details(&connection, 8).expect("query");

    assert_eq!(linked.len(), 2);
    assert!(linked.iter().all(|(code, _)| code == "8.5.4"));
}

#[test]
fn guidance_queries_split_lightweight_and_full_text_shapes() {
    let mut connection = memory_db();
    upsert_sections(&mut connection, &chapter_eight()).expect("sections");
    upsert_guidance_blocks(
        &mut connection,
        &[GuidanceSeed {
            id: "g1".to_string(),
            guide_name: "Underlay installation".to_string(),
            source_document: "HTG Volume 1".to_string(),
            content: Some("Install the underlay before fixing battens.".to_string()),
            pdf_page: Some(12),
        }],
    )
    .expect("guidance");
    upsert_guidance_links(
        &mut connection,
        &[SectionGuidanceLinkSeed {
            section_code: "8.5.4".to_string(),
            htg_id: "g1".to_string(),
            relevance: Some("primary".to_string()),
        }],
    )
    .expect("links");

    let lightweight = query_linked_guidance(&connection, 8).expect("query");
    assert_eq!(lightweight.len(), 1);
    assert_eq!(lightweight[0].1.guide_name, "Underlay installation");
    assert_eq!(lightweight[0].1.relevance.as_deref(), Some("primary"));

    let full = query_guidance_full_text(&connection, 8).expect("query");
    assert_eq!(full.len(), 1);
    assert_eq!(
        full[0].1.content.as_deref(),
        Some("Install the underlay before fixing battens.")
    );
    assert_eq!(full[0].1.pdf_page, Some(12));
}

#[test]
fn case_law_query_fans_out_across_linked_details() {
    let mut connection = memory_db();
    upsert_sections(&mut connection, &chapter_eight()).expect("sections");
    upsert_details(
        &mut connection,
        &[detail_seed("d1", Some("RANZ")), detail_seed("d2", Some("RANZ"))],
    )
    .expect("details");
    upsert_detail_links(
        &mut connection,
        &[
            SectionDetailLinkSeed {
                section_code: "8.5.4".to_string(),
                detail_id: "d1".to_string(),
                relationship_type: "referenced".to_string(),
            },
            SectionDetailLinkSeed {
                section_code: "8.5.4".to_string(),
                detail_id: "d2".to_string(),
                relationship_type: "referenced".to_string(),
            },
        ],
    )
    .expect("detail links");
    upsert_failure_cases(
        &mut connection,
        &[FailureCaseSeed {
            id: "f1".to_string(),
            case_id: "WHRS-f1".to_string(),
            case_type: "determination".to_string(),
            summary: Some("Moisture ingress at the apron flashing.".to_string()),
            outcome: Some("claim upheld".to_string()),
            pdf_url: None,
            failure_type: Some("moisture ingress".to_string()),
        }],
    )
    .expect("cases");
    upsert_failure_links(
        &mut connection,
        &[
            DetailFailureLinkSeed {
                detail_id: "d1".to_string(),
                failure_case_id: "f1".to_string(),
            },
            DetailFailureLinkSeed {
                detail_id: "d2".to_string(),
                failure_case_id: "f1".to_string(),
            },
        ],
    )
    .expect("failure links");

    let cases = query_case_law(&connection, 8).expect("query");

    // One case reached through two details: the raw join keeps both rows.
    assert_eq!(cases.len(), 2);
    assert!(cases.iter().all(|(code, case)| code == "8.5.4" && case.id == "f1"));
}
