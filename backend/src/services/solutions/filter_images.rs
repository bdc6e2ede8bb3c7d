use crate::error::{AppError, AppResult};
use crate::response;
use crate::state::AppState;
use crate::store::solutions;
use actix_web::{web, HttpResponse};
use common::model::query::CreateFilterImageRequest;

async fn create(state: &AppState, req: &CreateFilterImageRequest) -> AppResult<()> {
    if req.filter_value.trim().is_empty() {
        return Err(AppError::invalid("filter_value must not be empty"));
    }
    let conn = state.db.conn()?;
    let device_type_id = i64::from(req.device_type_id);
    if solutions::get_device_type(&conn, device_type_id)?.is_none() {
        return Err(AppError::not_found(format!(
            "device type {device_type_id} does not exist"
        )));
    }
    solutions::upsert_filter_image(&conn, device_type_id, &req.filter_value, &req.image_url)
}

pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<CreateFilterImageRequest>,
) -> HttpResponse {
    match create(&state, &payload).await {
        Ok(()) => response::ok_empty(),
        Err(e) => {
            log::error!("/api/solutions/filter-images failed: {e}");
            response::fail(&e)
        }
    }
}
