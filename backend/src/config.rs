//! Environment-based configuration with working defaults.

use std::env;

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Endpoint of the external brand/inventory service.
    pub url: String,
    pub dbname: String,
    pub query_id: String,
    /// Prefix joined onto the relative image paths the service returns.
    pub image_base_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub upload_dir: String,
    pub enrichment: EnrichmentConfig,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env_or("APP_PORT", "8080").parse().unwrap_or(8080);
        AppConfig {
            host: env_or("APP_HOST", "127.0.0.1"),
            port,
            db_path: env_or("APP_DB_PATH", "selector.sqlite"),
            upload_dir: env_or("APP_UPLOAD_DIR", "uploads"),
            enrichment: EnrichmentConfig {
                url: env_or("ENRICHMENT_URL", "http://127.0.0.1:9000/query"),
                dbname: env_or("ENRICHMENT_DBNAME", ""),
                query_id: env_or("ENRICHMENT_QUERY_ID", ""),
                image_base_url: env_or("ENRICHMENT_IMAGE_BASE_URL", ""),
            },
        }
    }
}
