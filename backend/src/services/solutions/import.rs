//! Multipart import: create or refresh a category from a spreadsheet.

use super::{read_field_bytes, read_field_text, save_upload};
use crate::error::{AppError, AppResult};
use crate::import::parse_workbook;
use crate::response;
use crate::state::AppState;
use crate::store::solutions;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;

struct ImportUpload {
    group_id: Option<i64>,
    device_type_name: Option<String>,
    workbook: Option<Vec<u8>>,
    image: Option<(String, Vec<u8>)>,
}

async fn collect_fields(mut payload: Multipart) -> AppResult<ImportUpload> {
    let mut upload = ImportUpload {
        group_id: None,
        device_type_name: None,
        workbook: None,
        image: None,
    };

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::invalid(format!("malformed multipart payload: {e}")))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        match name.as_deref() {
            Some("group_id") => {
                let text = read_field_text(&mut field).await?;
                let id = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::invalid("group_id must be a positive integer"))?;
                upload.group_id = Some(id);
            }
            Some("device_type_name") => {
                upload.device_type_name = Some(read_field_text(&mut field).await?);
            }
            Some("device") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if !filename.ends_with(".xlsx") {
                    return Err(AppError::invalid("the device file must end with .xlsx"));
                }
                upload.workbook = Some(read_field_bytes(&mut field).await?);
            }
            Some("image") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                upload.image = Some((filename, read_field_bytes(&mut field).await?));
            }
            _ => {
                // drain and ignore unknown parts
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| {
                        AppError::invalid(format!("malformed multipart payload: {e}"))
                    })?;
                }
            }
        }
    }
    Ok(upload)
}

async fn import_solutions(state: &AppState, payload: Multipart) -> AppResult<usize> {
    let upload = collect_fields(payload).await?;
    let group_id = upload.group_id.ok_or_else(|| AppError::invalid("missing group_id"))?;
    let device_type_name = upload
        .device_type_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::invalid("missing device_type_name"))?;
    let workbook = upload
        .workbook
        .ok_or_else(|| AppError::invalid("missing device spreadsheet"))?;
    let (image_name, image_bytes) = upload
        .image
        .ok_or_else(|| AppError::invalid("missing category image"))?;

    // parse first: nothing touches the store for an unparseable spreadsheet
    let details = parse_workbook(&workbook)?;

    let mut conn = state.db.conn()?;
    if !solutions::group_exists(&conn, group_id)? {
        return Err(AppError::not_found(format!("group {group_id} does not exist")));
    }
    let device_type =
        solutions::find_or_create_device_type(&conn, device_type_name.trim(), group_id)?;
    let imported = solutions::replace_solutions(&mut conn, device_type.id, &details)?;

    let icon_path = save_upload(&state.config.upload_dir, &image_name, &image_bytes)?;
    save_upload(&state.config.upload_dir, "import.xlsx", &workbook)?;
    solutions::set_device_type_icon(&conn, device_type.id, &icon_path)?;

    Ok(imported)
}

pub async fn process(state: web::Data<AppState>, payload: Multipart) -> HttpResponse {
    match import_solutions(&state, payload).await {
        Ok(imported) => response::ok(json!({ "imported": imported })),
        Err(e) => {
            log::error!("/api/solutions/import failed: {e}");
            response::fail(&e)
        }
    }
}
