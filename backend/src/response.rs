//! The `{code, msg, data}` response envelope shared by every endpoint.

use crate::error::AppError;
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    code: u16,
    msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        code: 200,
        msg: "ok".to_string(),
        data: Some(data),
    })
}

pub fn ok_empty() -> HttpResponse {
    HttpResponse::Ok().json(Envelope::<()> {
        code: 200,
        msg: "ok".to_string(),
        data: None,
    })
}

/// Maps an `AppError` onto the envelope. Validation and not-found errors keep
/// their specific message; everything else gets a generic one (the cause is
/// logged by the handler before calling this).
pub fn fail(err: &AppError) -> HttpResponse {
    let (status, code, msg) = match err {
        AppError::InvalidParams(m) => (HttpResponse::BadRequest(), 400, m.clone()),
        AppError::NotFound(m) => (HttpResponse::NotFound(), 404, m.clone()),
        AppError::SpreadsheetParse(_) => (
            HttpResponse::BadRequest(),
            400,
            "failed to parse spreadsheet".to_string(),
        ),
        AppError::ExternalApi(_) => (
            HttpResponse::InternalServerError(),
            500,
            "external service failure".to_string(),
        ),
        AppError::Db(_) | AppError::Json(_) | AppError::Internal(_) => (
            HttpResponse::InternalServerError(),
            500,
            "internal server error".to_string(),
        ),
    };
    let mut builder = status;
    builder.json(Envelope::<()> {
        code,
        msg,
        data: None,
    })
}
