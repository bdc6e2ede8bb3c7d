//! HTTP surface of the selection engine.
//!
//! The provided routes are:
//! - `POST /api/solutions/query`: faceted query — narrows the category's
//!   documents by the chosen filters and returns the matching page together
//!   with the still-choosable filter options.
//! - `POST /api/solutions/import`: multipart import — `group_id`,
//!   `device_type_name`, the `device` spreadsheet and a representative
//!   `image`; fully replaces the category's documents.
//! - `POST /api/solutions/import/{device_type_id}`: re-import an existing
//!   category from a replacement spreadsheet.
//! - `POST /api/solutions/filter-images`: map a (category, facet value) pair
//!   to an illustrative image URL.

mod filter_images;
mod import;
mod query;
mod update_import;

use crate::error::{AppError, AppResult};
use actix_multipart::Field;
use actix_web::web::{post, scope};
use actix_web::Scope;
use futures_util::StreamExt;
use std::path::Path;

const API_PATH: &str = "/api/solutions";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/query", post().to(query::process))
        .route("/import", post().to(import::process))
        .route("/import/{device_type_id}", post().to(update_import::process))
        .route("/filter-images", post().to(filter_images::process))
}

pub(crate) async fn read_field_bytes(field: &mut Field) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::invalid(format!("multipart read failed: {e}")))?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub(crate) async fn read_field_text(field: &mut Field) -> AppResult<String> {
    let bytes = read_field_bytes(field).await?;
    String::from_utf8(bytes).map_err(|_| AppError::invalid("multipart field is not valid UTF-8"))
}

/// Stores an uploaded file under a content-addressed (md5) name, keeping the
/// original extension. Returns the stored path.
pub(crate) fn save_upload(upload_dir: &str, filename: &str, bytes: &[u8]) -> AppResult<String> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let digest = md5::compute(bytes);
    let stored = format!("{upload_dir}/{digest:x}.{extension}");
    std::fs::create_dir_all(upload_dir)
        .and_then(|_| std::fs::write(&stored, bytes))
        .map_err(|e| AppError::internal(format!("cannot store upload {stored}: {e}")))?;
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_are_stored_under_content_hash_names() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap();

        let stored = save_upload(base, "icon.png", b"pixels").unwrap();
        assert!(stored.ends_with(".png"));
        assert_eq!(std::fs::read(&stored).unwrap(), b"pixels");

        // same bytes, same name: the second save is a no-op overwrite
        let again = save_upload(base, "renamed.png", b"pixels").unwrap();
        assert_eq!(stored, again);

        let other = save_upload(base, "noext", b"pixels").unwrap();
        assert!(other.ends_with(".bin"));
    }
}
