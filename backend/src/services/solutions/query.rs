use crate::response;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::query::QueryRequest;

/// The acting user id, used only for price-tier resolution. Authentication
/// lives outside this service; absent or unparseable headers resolve to uid
/// 0, which prices at tier 1.
fn user_id_from(req: &HttpRequest) -> i64 {
    req.headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<QueryRequest>,
) -> HttpResponse {
    let uid = user_id_from(&req);
    match state.engine.query(uid, &payload).await {
        Ok(resp) => response::ok(resp),
        Err(e) => {
            log::error!("/api/solutions/query failed: {e}");
            response::fail(&e)
        }
    }
}
