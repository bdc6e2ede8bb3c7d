pub mod config;
pub mod enrichment;
pub mod error;
pub mod import;
pub mod query;
pub mod response;
pub mod services;
pub mod state;
pub mod store;
