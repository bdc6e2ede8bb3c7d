//! Shared application state, injected into handlers as actix app data.

use crate::config::AppConfig;
use crate::enrichment::EnrichmentClient;
use crate::query::orchestrator::QueryEngine;
use crate::store::Db;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<AppConfig>,
    pub engine: QueryEngine,
}

impl AppState {
    pub fn new(db: Db, config: AppConfig) -> Self {
        let enrichment = EnrichmentClient::new(config.enrichment.clone());
        let engine = QueryEngine::new(db.clone(), enrichment);
        AppState {
            db,
            config: Arc::new(config),
            engine,
        }
    }
}
