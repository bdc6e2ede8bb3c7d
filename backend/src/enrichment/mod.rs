//! Batched client for the external brand/inventory/image service.
//!
//! One POST per query request carries every distinct product code of the
//! current page. A transport error or a non-zero business `errno` fails the
//! whole request; there is no retry, no timeout and no partial result.
//! Records live for the single request and are never cached.

use crate::config::EnrichmentConfig;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize)]
struct ApiRequestDetail {
    limitelength: String,
}

#[derive(Serialize)]
struct ApiRequest {
    dbname: String,
    queryid: String,
    detail: ApiRequestDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiRecord {
    pub itemcode: String,
    #[serde(default)]
    pub brand: String,
    /// May be absent or null in the response.
    #[serde(default)]
    pub onhand: Option<f64>,
    #[serde(default)]
    pub bsonhand: f64,
    #[serde(default)]
    pub pic: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub data: Vec<ApiRecord>,
    #[serde(default)]
    pub errmsg: String,
    pub errno: String,
}

/// Per-product enrichment merged onto components.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentRecord {
    pub brand: String,
    pub inventory_x: f64,
    pub inventory_y: f64,
    pub image_url: String,
}

#[derive(Clone)]
pub struct EnrichmentClient {
    http: reqwest::Client,
    config: EnrichmentConfig,
}

impl EnrichmentClient {
    pub fn new(config: EnrichmentConfig) -> Self {
        EnrichmentClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Fetches enrichment for a deduplicated code set in one call. An empty
    /// set short-circuits without touching the network.
    pub async fn fetch_batch(
        &self,
        product_codes: &[String],
    ) -> AppResult<HashMap<String, EnrichmentRecord>> {
        if product_codes.is_empty() {
            return Ok(HashMap::new());
        }

        let body = ApiRequest {
            dbname: self.config.dbname.clone(),
            queryid: self.config.query_id.clone(),
            detail: ApiRequestDetail {
                limitelength: product_codes.join(","),
            },
        };
        let response = self.http.post(&self.config.url).json(&body).send().await?;
        let api: ApiResponse = response.json().await?;
        index_response(api, &self.config.image_base_url)
    }
}

/// Indexes a decoded response by product code. Split out of the client so the
/// business-error and merge rules are testable without a live service.
pub fn index_response(
    api: ApiResponse,
    image_base_url: &str,
) -> AppResult<HashMap<String, EnrichmentRecord>> {
    if api.errno != "0" {
        return Err(AppError::ExternalApi(format!(
            "enrichment service error {}: {}",
            api.errno, api.errmsg
        )));
    }
    let mut indexed = HashMap::with_capacity(api.data.len());
    for record in api.data {
        let image_url = if record.pic.is_empty() {
            String::new()
        } else {
            format!("{}{}", image_base_url, record.pic.trim_start_matches('/'))
        };
        indexed.insert(
            record.itemcode.clone(),
            EnrichmentRecord {
                brand: record.brand,
                inventory_x: record.onhand.unwrap_or(0.0),
                inventory_y: record.bsonhand,
                image_url,
            },
        );
    }
    Ok(indexed)
}
