//! Re-import: replace an existing category's documents from a new
//! spreadsheet. Fails with not-found when the category id is unknown.

use super::{read_field_bytes, save_upload};
use crate::error::{AppError, AppResult};
use crate::import::parse_workbook;
use crate::response;
use crate::state::AppState;
use crate::store::solutions;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;

async fn collect_workbook(mut payload: Multipart) -> AppResult<Vec<u8>> {
    let mut workbook = None;
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::invalid(format!("malformed multipart payload: {e}")))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() == Some("device") {
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                .unwrap_or_default();
            if !filename.ends_with(".xlsx") {
                return Err(AppError::invalid("the device file must end with .xlsx"));
            }
            workbook = Some(read_field_bytes(&mut field).await?);
        } else {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AppError::invalid(format!("malformed multipart payload: {e}")))?;
            }
        }
    }
    workbook.ok_or_else(|| AppError::invalid("missing device spreadsheet"))
}

async fn update_import(
    state: &AppState,
    device_type_id: i64,
    payload: Multipart,
) -> AppResult<usize> {
    let workbook = collect_workbook(payload).await?;
    let details = parse_workbook(&workbook)?;

    let mut conn = state.db.conn()?;
    if solutions::get_device_type(&conn, device_type_id)?.is_none() {
        return Err(AppError::not_found(format!(
            "device type {device_type_id} does not exist"
        )));
    }
    let imported = solutions::replace_solutions(&mut conn, device_type_id, &details)?;
    save_upload(&state.config.upload_dir, "import.xlsx", &workbook)?;
    Ok(imported)
}

pub async fn process(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: Multipart,
) -> HttpResponse {
    let device_type_id = path.into_inner();
    match update_import(&state, device_type_id, payload).await {
        Ok(imported) => response::ok(json!({ "imported": imported })),
        Err(e) => {
            log::error!("/api/solutions/import/{device_type_id} failed: {e}");
            response::fail(&e)
        }
    }
}
