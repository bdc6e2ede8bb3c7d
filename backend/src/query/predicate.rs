//! Translates a user filter map into a conjunctive SQL predicate over the
//! `details` JSON column.
//!
//! Exact keys compare the stored text at `$.filters."key"`. Keys carrying
//! the `_min`/`_max` suffix are staged per base name and emitted as an
//! interval-overlap constraint against the document's own stored window:
//! a supplied min requires stored `max >= min`, a supplied max requires
//! stored `min <= max`. An empty filter map yields the bare category query.
//! The same predicate is reused for the count, the page fetch and the facet
//! scan, so all three always see the identical match set.

use crate::error::{AppError, AppResult};
use common::model::filter::{self, RangeBound};
use regex::Regex;
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
struct RangeConstraint {
    base: String,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Predicate {
    device_type_id: i64,
    exact: Vec<(String, String)>,
    ranges: Vec<RangeConstraint>,
}

impl Predicate {
    /// Validates and compiles a request filter map. Rejected before touching
    /// the store: empty keys, keys unusable in a JSON path, non-scalar
    /// values, and non-numeric range bounds.
    pub fn build(device_type_id: i64, filters: &Map<String, Value>) -> AppResult<Self> {
        let key_re = Regex::new(r#"^[^"]+$"#)
            .map_err(|e| AppError::internal(format!("filter key regex: {e}")))?;

        let mut exact = Vec::new();
        let mut staged: BTreeMap<String, RangeConstraint> = BTreeMap::new();

        for (key, value) in filters {
            if !key_re.is_match(key) {
                return Err(AppError::invalid(format!("invalid filter key: {key:?}")));
            }
            match filter::split_range_key(key) {
                Some((base, bound)) => {
                    let number = numeric_bound(key, value)?;
                    let entry = staged.entry(base.to_string()).or_insert(RangeConstraint {
                        base: base.to_string(),
                        min: None,
                        max: None,
                    });
                    match bound {
                        RangeBound::Min => entry.min = Some(number),
                        RangeBound::Max => entry.max = Some(number),
                    }
                }
                None => exact.push((key.clone(), format_scalar(key, value)?)),
            }
        }

        Ok(Predicate {
            device_type_id,
            exact,
            ranges: staged.into_values().collect(),
        })
    }

    /// WHERE clause body plus its bind parameters, for appending after
    /// `FROM t_device WHERE `.
    pub fn where_clause(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::from("device_type_id = ?");
        let mut params = vec![SqlValue::Integer(self.device_type_id)];

        for (key, value) in &self.exact {
            sql.push_str(" AND json_extract(details, ?) = ?");
            params.push(SqlValue::Text(scalar_path(key)));
            params.push(SqlValue::Text(value.clone()));
        }
        for range in &self.ranges {
            if let Some(min) = range.min {
                sql.push_str(" AND CAST(json_extract(details, ?) AS REAL) >= ?");
                params.push(SqlValue::Text(range_path(&range.base, "max")));
                params.push(SqlValue::Real(min));
            }
            if let Some(max) = range.max {
                sql.push_str(" AND CAST(json_extract(details, ?) AS REAL) <= ?");
                params.push(SqlValue::Text(range_path(&range.base, "min")));
                params.push(SqlValue::Real(max));
            }
        }
        (sql, params)
    }
}

fn scalar_path(key: &str) -> String {
    format!("$.filters.\"{key}\"")
}

fn range_path(base: &str, side: &str) -> String {
    format!("$.filters.\"{base}\".\"{side}\"")
}

/// Formats a request scalar the way the documents store it: cell values are
/// imported as text, so whole floats print without a fractional part.
fn format_scalar(key: &str, value: &Value) -> AppResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => {
            let f = n
                .as_f64()
                .ok_or_else(|| AppError::invalid(format!("filter {key:?} is not a finite number")))?;
            Ok(format_number(f))
        }
        _ => Err(AppError::invalid(format!(
            "filter {key:?} must have a scalar value"
        ))),
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

fn numeric_bound(key: &str, value: &Value) -> AppResult<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| AppError::invalid(format!("range bound {key:?} is not a finite number"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| AppError::invalid(format!("range bound {key:?} must be numeric"))),
        _ => Err(AppError::invalid(format!(
            "range bound {key:?} must be numeric"
        ))),
    }
}
