//! Document store adapter: solution documents, device types (categories)
//! and facet-value images.
//!
//! Importing a category is a full replace — all prior documents of the
//! category are deleted and the new batch inserted inside one transaction.
//! There are no merge semantics.

use crate::error::{AppError, AppResult};
use crate::query::predicate::Predicate;
use common::model::solution::SolutionDetail;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct SolutionRow {
    pub id: i64,
    pub name: String,
    pub details: String,
}

#[derive(Debug, Clone)]
pub struct DeviceType {
    pub id: i64,
    pub name: String,
    pub group_id: i64,
    pub icon_path: Option<String>,
}

pub fn count_solutions(conn: &Connection, pred: &Predicate) -> AppResult<i64> {
    let (clause, sql_params) = pred.where_clause();
    let sql = format!("SELECT COUNT(*) FROM t_device WHERE {clause}");
    let count = conn.query_row(&sql, params_from_iter(sql_params), |row| row.get(0))?;
    Ok(count)
}

pub fn query_page(
    conn: &Connection,
    pred: &Predicate,
    page: u32,
    page_size: u32,
) -> AppResult<Vec<SolutionRow>> {
    let (clause, mut sql_params) = pred.where_clause();
    let sql = format!(
        "SELECT id, name, details FROM t_device WHERE {clause} ORDER BY id LIMIT ? OFFSET ?"
    );
    sql_params.push(rusqlite::types::Value::Integer(i64::from(page_size)));
    sql_params.push(rusqlite::types::Value::Integer(
        i64::from(page - 1) * i64::from(page_size),
    ));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(sql_params), |row| {
            Ok(SolutionRow {
                id: row.get(0)?,
                name: row.get(1)?,
                details: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Projects only the `filters` sub-object of every matching document, for
/// facet aggregation over the full match set.
pub fn scan_filters(conn: &Connection, pred: &Predicate) -> AppResult<Vec<String>> {
    let (clause, sql_params) = pred.where_clause();
    let sql = format!("SELECT json_extract(details, '$.filters') FROM t_device WHERE {clause}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(sql_params), |row| {
            row.get::<_, Option<String>>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().flatten().collect())
}

pub fn group_exists(conn: &Connection, group_id: i64) -> AppResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM t_group WHERE id = ?1",
            params![group_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn get_device_type(conn: &Connection, id: i64) -> AppResult<Option<DeviceType>> {
    let row = conn
        .query_row(
            "SELECT id, name, group_id, icon_path FROM t_device_type WHERE id = ?1",
            params![id],
            |row| {
                Ok(DeviceType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    group_id: row.get(2)?,
                    icon_path: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn find_or_create_device_type(
    conn: &Connection,
    name: &str,
    group_id: i64,
) -> AppResult<DeviceType> {
    let existing = conn
        .query_row(
            "SELECT id, name, group_id, icon_path FROM t_device_type \
             WHERE name = ?1 AND group_id = ?2",
            params![name, group_id],
            |row| {
                Ok(DeviceType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    group_id: row.get(2)?,
                    icon_path: row.get(3)?,
                })
            },
        )
        .optional()?;
    if let Some(dt) = existing {
        return Ok(dt);
    }
    conn.execute(
        "INSERT INTO t_device_type (name, group_id) VALUES (?1, ?2)",
        params![name, group_id],
    )?;
    Ok(DeviceType {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        group_id,
        icon_path: None,
    })
}

/// Full replace of a category's documents: delete-then-insert inside one
/// transaction. Generated document names follow the import row order.
pub fn replace_solutions(
    conn: &mut Connection,
    device_type_id: i64,
    details: &[SolutionDetail],
) -> AppResult<usize> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM t_device WHERE device_type_id = ?1",
        params![device_type_id],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO t_device (name, device_type_id, details) VALUES (?1, ?2, ?3)",
        )?;
        for (i, detail) in details.iter().enumerate() {
            let name = format!("方案{}", i + 1);
            let json = serde_json::to_string(detail).map_err(AppError::from)?;
            stmt.execute(params![name, device_type_id, json])?;
        }
    }
    tx.commit()?;
    Ok(details.len())
}

pub fn set_device_type_icon(conn: &Connection, id: i64, icon_path: &str) -> AppResult<()> {
    conn.execute(
        "UPDATE t_device_type SET icon_path = ?1 WHERE id = ?2",
        params![icon_path, id],
    )?;
    Ok(())
}

/// `filter_value -> image_url` for a category, used to attach illustrative
/// images to facet options.
pub fn filter_images_for(
    conn: &Connection,
    device_type_id: i64,
) -> AppResult<HashMap<String, String>> {
    let mut stmt = conn
        .prepare("SELECT filter_value, image_url FROM t_filter_image WHERE device_type_id = ?1")?;
    let rows = stmt
        .query_map(params![device_type_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(rows)
}

pub fn upsert_filter_image(
    conn: &Connection,
    device_type_id: i64,
    filter_value: &str,
    image_url: &str,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO t_filter_image (device_type_id, filter_value, image_url) \
         VALUES (?1, ?2, ?3) \
         ON CONFLICT(device_type_id, filter_value) DO UPDATE SET image_url = excluded.image_url",
        params![device_type_id, filter_value, image_url],
    )?;
    Ok(())
}
