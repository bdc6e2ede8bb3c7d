//! End-to-end round trip: fabricate a styled workbook in memory, import it,
//! then run faceted queries against the stored documents.
//!
//! The reference rows carry no component columns, so the enrichment client
//! short-circuits and the whole path runs without a network.

use backend::config::EnrichmentConfig;
use backend::enrichment::EnrichmentClient;
use backend::import::parse_workbook;
use backend::query::orchestrator::QueryEngine;
use backend::store::{solutions, Db};
use common::model::query::{Pagination, QueryRequest};
use serde_json::{json, Map, Value};
use std::io::Cursor;
use umya_spreadsheet::Worksheet;

const BLUE: &str = "FF0000FF";
const RED: &str = "FFFF0000";

fn set_cell(sheet: &mut Worksheet, col: u32, row: u32, value: &str, fill: Option<&str>) {
    let cell = sheet.get_cell_mut((col, row));
    cell.set_value(value);
    if let Some(argb) = fill {
        cell.get_style_mut().set_background_color(argb);
    }
}

/// Three documents of category `widget-1` with stored size windows
/// (1,5), (4,8), (10,12).
fn widget_workbook() -> Vec<u8> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).unwrap();
    set_cell(sheet, 1, 1, "颜色", Some(BLUE));
    set_cell(sheet, 2, 1, "size_min", Some(RED));
    set_cell(sheet, 3, 1, "size_max", Some(RED));
    set_cell(sheet, 4, 1, "备注", None);

    let rows = [
        ("蓝色", "1", "5", ""),
        ("红色", "4", "8", "特殊涂层"),
        ("蓝色", "10", "12", ""),
    ];
    for (i, (color, min, max, note)) in rows.iter().enumerate() {
        let row = (i + 2) as u32;
        set_cell(sheet, 1, row, color, None);
        set_cell(sheet, 2, row, min, None);
        set_cell(sheet, 3, row, max, None);
        set_cell(sheet, 4, row, note, None);
    }

    let mut buffer = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer).unwrap();
    buffer.into_inner()
}

fn engine_for(db: &Db) -> QueryEngine {
    // never reached in these tests: no document carries a product code
    let enrichment = EnrichmentClient::new(EnrichmentConfig {
        url: "http://127.0.0.1:1/unreachable".to_string(),
        dbname: String::new(),
        query_id: String::new(),
        image_base_url: String::new(),
    });
    QueryEngine::new(db.clone(), enrichment)
}

fn import_widget(db: &Db) -> i64 {
    let details = parse_workbook(&widget_workbook()).unwrap();
    assert_eq!(details.len(), 3);
    let mut conn = db.conn().unwrap();
    conn.execute("INSERT OR IGNORE INTO t_group (id, name) VALUES (1, '刀具')", [])
        .unwrap();
    let device_type = solutions::find_or_create_device_type(&conn, "widget-1", 1).unwrap();
    solutions::replace_solutions(&mut conn, device_type.id, &details).unwrap();
    device_type.id
}

fn request(device_type_id: i64, filters: Value) -> QueryRequest {
    QueryRequest {
        device_type_id: device_type_id as u32,
        current_filters: filters.as_object().cloned().unwrap_or_else(Map::new),
        pagination: Pagination {
            page: 1,
            page_size: 20,
        },
    }
}

#[tokio::test]
async fn unfiltered_query_returns_one_document_per_data_row() {
    let db = Db::open_in_memory().unwrap();
    let dt = import_widget(&db);
    let resp = engine_for(&db).query(0, &request(dt, json!({}))).await.unwrap();

    assert_eq!(resp.solutions.total, 3);
    assert_eq!(resp.solutions.list.len(), 3);
    assert_eq!(resp.solutions.pages, 1);
    assert_eq!(resp.solutions.list[0].name, "方案1");

    // 颜色 facets over the full set; the stored size windows never surface
    let names: Vec<&str> = resp
        .available_filters
        .iter()
        .map(|f| f.filter_name.as_str())
        .collect();
    assert_eq!(names, vec!["颜色"]);
    let values: Vec<&str> = resp.available_filters[0]
        .options
        .iter()
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(values, vec!["红色", "蓝色"]);
}

#[tokio::test]
async fn range_query_matches_overlapping_windows() {
    let db = Db::open_in_memory().unwrap();
    let dt = import_widget(&db);
    let resp = engine_for(&db)
        .query(0, &request(dt, json!({"size_min": 6})))
        .await
        .unwrap();

    // (4,8) and (10,12) overlap min=6; (1,5) does not
    assert_eq!(resp.solutions.total, 2);
    let names: Vec<&str> = resp.solutions.list.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["方案2", "方案3"]);
}

#[tokio::test]
async fn exact_filter_narrows_facets_to_the_match_set() {
    let db = Db::open_in_memory().unwrap();
    let dt = import_widget(&db);
    let resp = engine_for(&db)
        .query(0, &request(dt, json!({"颜色": "蓝色"})))
        .await
        .unwrap();

    assert_eq!(resp.solutions.total, 2);
    let options: Vec<&str> = resp.available_filters[0]
        .options
        .iter()
        .map(|o| o.value.as_str())
        .collect();
    // aggregation runs over the already-filtered set, so only 蓝色 remains
    assert_eq!(options, vec!["蓝色"]);
}

#[tokio::test]
async fn facet_options_carry_configured_images() {
    let db = Db::open_in_memory().unwrap();
    let dt = import_widget(&db);
    {
        let conn = db.conn().unwrap();
        solutions::upsert_filter_image(&conn, dt, "蓝色", "/img/blue.png").unwrap();
    }
    let resp = engine_for(&db).query(0, &request(dt, json!({}))).await.unwrap();
    let options = &resp.available_filters[0].options;
    let blue = options.iter().find(|o| o.value == "蓝色").unwrap();
    assert_eq!(blue.image_url.as_deref(), Some("/img/blue.png"));
    let red = options.iter().find(|o| o.value == "红色").unwrap();
    assert_eq!(red.image_url, None);
}

#[tokio::test]
async fn reimport_fully_replaces_the_category() {
    let db = Db::open_in_memory().unwrap();
    let dt = import_widget(&db);
    let old_ids: Vec<i64> = {
        let resp = engine_for(&db).query(0, &request(dt, json!({}))).await.unwrap();
        resp.solutions.list.iter().map(|s| s.id).collect()
    };

    // second import of the same workbook: same count, same facets, new rows
    let details = parse_workbook(&widget_workbook()).unwrap();
    {
        let mut conn = db.conn().unwrap();
        solutions::replace_solutions(&mut conn, dt, &details).unwrap();
    }
    let resp = engine_for(&db).query(0, &request(dt, json!({}))).await.unwrap();
    assert_eq!(resp.solutions.total, 3);
    assert!(resp.solutions.list.iter().all(|s| !old_ids.contains(&s.id)));
    let values: Vec<&str> = resp.available_filters[0]
        .options
        .iter()
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(values, vec!["红色", "蓝色"]);
}

#[test]
fn workbook_without_data_rows_is_rejected() {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).unwrap();
    set_cell(sheet, 1, 1, "颜色", Some(BLUE));
    let mut buffer = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer).unwrap();
    assert!(parse_workbook(buffer.get_ref()).is_err());
}

#[test]
fn component_columns_round_trip_through_the_workbook() {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).unwrap();
    set_cell(sheet, 1, 1, "颜色", Some(BLUE));
    set_cell(sheet, 2, 1, "工序", Some("FF00FF00"));
    set_cell(sheet, 3, 1, "商品编码", Some("FF00FF00"));
    set_cell(sheet, 4, 1, "规格型号", Some("FF00FF00"));
    // row with a component and a row whose key field is empty
    set_cell(sheet, 1, 2, "蓝色", None);
    set_cell(sheet, 2, 2, "切割", None);
    set_cell(sheet, 3, 2, "P-001", None);
    set_cell(sheet, 4, 2, "S-1", None);
    set_cell(sheet, 1, 3, "红色", None);
    set_cell(sheet, 2, 3, "切割", None);

    let mut buffer = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer).unwrap();
    let details = parse_workbook(buffer.get_ref()).unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].components.len(), 1);
    assert_eq!(details[0].components[0].product_code, "P-001");
    // empty 商品编码 skips the slot but keeps the document
    assert!(details[1].components.is_empty());
    assert!(!details[1].is_empty());
}
