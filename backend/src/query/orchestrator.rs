//! The single-pass, state-free query cycle: match, facet, enrich, price,
//! assemble. Any step failing aborts the whole request; the path is
//! read-only, so there is nothing to roll back.

use crate::enrichment::{EnrichmentClient, EnrichmentRecord};
use crate::error::{AppError, AppResult};
use crate::query::{facets, predicate::Predicate};
use crate::store::{prices, solutions, Db};
use common::model::query::{
    AvailableFilter, ComponentData, DetailsData, FilterOption, QueryRequest, QueryResponse,
    SolutionData, SolutionsPage,
};
use common::model::solution::SolutionDetail;
use std::collections::{BTreeSet, HashMap};

#[derive(Clone)]
pub struct QueryEngine {
    db: Db,
    enrichment: EnrichmentClient,
}

impl QueryEngine {
    pub fn new(db: Db, enrichment: EnrichmentClient) -> Self {
        QueryEngine { db, enrichment }
    }

    pub async fn query(&self, uid: i64, req: &QueryRequest) -> AppResult<QueryResponse> {
        validate(req)?;
        let pred = Predicate::build(i64::from(req.device_type_id), &req.current_filters)?;
        let page = req.pagination.page;
        let page_size = req.pagination.page_size;

        // 1-2: page of matches, total, and the full match set's filters.
        // One lock scope; the guard must not be held across an await.
        let (total, rows, filter_rows, image_map) = {
            let conn = self.db.conn()?;
            let total = solutions::count_solutions(&conn, &pred)?;
            let rows = solutions::query_page(&conn, &pred, page, page_size)?;
            let filter_rows = solutions::scan_filters(&conn, &pred)?;
            let image_map = solutions::filter_images_for(&conn, i64::from(req.device_type_id))?;
            (total, rows, filter_rows, image_map)
        };

        let aggregated = facets::aggregate(&filter_rows);

        let mut parsed: Vec<(i64, String, SolutionDetail)> = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_str::<SolutionDetail>(&row.details) {
                Ok(detail) => parsed.push((row.id, row.name, detail)),
                Err(err) => log::warn!("solution {} has unparseable details: {err}", row.id),
            }
        }

        // 3: enrichment and pricing are independent; join them.
        let codes = collect_product_codes(&parsed);
        let (enriched, price_map) = tokio::join!(
            self.enrichment.fetch_batch(&codes),
            resolve_prices(self.db.clone(), uid, codes.clone())
        );
        let enriched = enriched?;
        let price_map = price_map?;

        // 4: merge external data onto each component.
        let list: Vec<SolutionData> = parsed
            .into_iter()
            .map(|(id, name, detail)| SolutionData {
                id,
                name,
                details: merge_details(detail, &enriched, &price_map),
            })
            .collect();

        // 5-6: facet options with images, both levels sorted.
        let mut available: Vec<AvailableFilter> = aggregated
            .into_iter()
            .map(|(filter_name, values)| AvailableFilter {
                filter_name,
                options: facets::sort_values(values)
                    .into_iter()
                    .map(|value| FilterOption {
                        image_url: image_map.get(&value).cloned(),
                        value,
                    })
                    .collect(),
            })
            .collect();
        available.sort_by(|a, b| a.filter_name.cmp(&b.filter_name));

        let pages = (total + i64::from(page_size) - 1) / i64::from(page_size);
        Ok(QueryResponse {
            solutions: SolutionsPage {
                list,
                total,
                page,
                page_size,
                pages,
            },
            available_filters: available,
        })
    }
}

fn validate(req: &QueryRequest) -> AppResult<()> {
    if req.device_type_id < 1 {
        return Err(AppError::invalid("device_type_id must be >= 1"));
    }
    if req.pagination.page < 1 {
        return Err(AppError::invalid("page must be >= 1"));
    }
    if !(1..=100).contains(&req.pagination.page_size) {
        return Err(AppError::invalid("page_size must be between 1 and 100"));
    }
    Ok(())
}

fn collect_product_codes(parsed: &[(i64, String, SolutionDetail)]) -> Vec<String> {
    let mut codes: BTreeSet<String> = BTreeSet::new();
    for (_, _, detail) in parsed {
        for component in &detail.components {
            if !component.product_code.is_empty() {
                codes.insert(component.product_code.clone());
            }
        }
    }
    codes.into_iter().collect()
}

async fn resolve_prices(db: Db, uid: i64, codes: Vec<String>) -> AppResult<HashMap<String, f64>> {
    prices::resolve_for_user(&db, uid, &codes)
}

fn merge_details(
    detail: SolutionDetail,
    enriched: &HashMap<String, EnrichmentRecord>,
    price_map: &HashMap<String, f64>,
) -> DetailsData {
    let components = detail
        .components
        .into_iter()
        .map(|component| {
            let mut data = ComponentData {
                name: component.name,
                spec_code: component.spec_code,
                brand: None,
                image_url: None,
                inventory_x: "0".to_string(),
                inventory_y: "0".to_string(),
                price: price_map
                    .get(&component.product_code)
                    .copied()
                    .unwrap_or(0.0),
                product_code: component.product_code,
            };
            if let Some(record) = enriched.get(&data.product_code) {
                if !record.brand.is_empty() {
                    data.brand = Some(record.brand.clone());
                }
                if !record.image_url.is_empty() {
                    data.image_url = Some(record.image_url.clone());
                }
                data.inventory_x = format!("{:.0}", record.inventory_x);
                data.inventory_y = format!("{:.0}", record.inventory_y);
            }
            data
        })
        .collect();
    DetailsData {
        filters: detail.filters,
        components,
        parameters: detail.parameters,
    }
}
