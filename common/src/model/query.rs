//! Request and response DTOs for the solution query endpoint.

use crate::model::solution::FilterValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            page_size: 20,
        }
    }
}

/// Body of `POST /api/solutions/query`. An empty `current_filters` map is the
/// initial "all options" state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub device_type_id: u32,
    #[serde(default)]
    pub current_filters: Map<String, Value>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// A component of a solution after merging in external enrichment data and
/// the resolved tier price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentData {
    pub name: String,
    pub product_code: String,
    pub spec_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub inventory_x: String,
    pub inventory_y: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsData {
    pub filters: BTreeMap<String, FilterValue>,
    pub components: Vec<ComponentData>,
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionData {
    pub id: i64,
    pub name: String,
    pub details: DetailsData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionsPage {
    pub list: Vec<SolutionData>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub pages: i64,
}

/// One still-choosable value of a facet, with an optional illustrative image
/// configured for that (category, value) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableFilter {
    pub filter_name: String,
    pub options: Vec<FilterOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub solutions: SolutionsPage,
    pub available_filters: Vec<AvailableFilter>,
}

/// Body of `POST /api/solutions/filter-images`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFilterImageRequest {
    pub device_type_id: u32,
    pub filter_value: String,
    pub image_url: String,
}
