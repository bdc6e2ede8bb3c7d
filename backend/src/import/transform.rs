//! Applies an inferred column schema to data rows, producing one solution
//! document per row.

use crate::import::schema::ColumnSchema;
use common::model::solution::{Component, FilterValue, SolutionDetail};
use rayon::prelude::*;

fn cell(row: &[String], col: usize) -> Option<&str> {
    let value = row.get(col)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn transform_row(schema: &ColumnSchema, row: &[String]) -> SolutionDetail {
    let mut detail = SolutionDetail::default();

    for (col, name) in &schema.exact {
        if let Some(value) = cell(row, *col) {
            detail
                .filters
                .insert(name.clone(), FilterValue::scalar(value));
        }
    }
    for range in &schema.ranges {
        let min = cell(row, range.min_col).unwrap_or("");
        let max = cell(row, range.max_col).unwrap_or("");
        if !min.is_empty() || !max.is_empty() {
            detail.filters.insert(
                range.base.clone(),
                FilterValue::Range {
                    min: min.to_string(),
                    max: max.to_string(),
                },
            );
        }
    }
    for slot in &schema.components {
        // a slot is only a real component when its key field has a value
        let product_code = match slot.code_col.and_then(|col| cell(row, col)) {
            Some(code) => code.to_string(),
            None => continue,
        };
        detail.components.push(Component {
            name: slot
                .name_col
                .and_then(|col| cell(row, col))
                .unwrap_or("")
                .to_string(),
            product_code,
            spec_code: slot
                .spec_col
                .and_then(|col| cell(row, col))
                .unwrap_or("")
                .to_string(),
        });
    }
    for (col, name) in &schema.parameters {
        if let Some(value) = cell(row, *col) {
            detail.parameters.insert(name.clone(), value.to_string());
        }
    }

    detail
}

/// Transforms a whole import batch, preserving row order. Rows that carry no
/// data at all (trailing styled-but-empty spreadsheet rows) are dropped.
pub fn transform_rows(schema: &ColumnSchema, rows: &[Vec<String>]) -> Vec<SolutionDetail> {
    rows.par_iter()
        .map(|row| transform_row(schema, row))
        .filter(|detail| !detail.is_empty())
        .collect()
}
