//! Facet aggregation: which filter keys and values are still choosable.
//!
//! Runs over the `filters` projections of the *current* match set — the one
//! the query itself returned, filters included. Options are not recomputed
//! with the facet's own key relaxed.

use common::model::solution::FilterValue;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Accumulates distinct scalar values per filter key. Rows whose `filters`
/// JSON fails to parse are skipped, not fatal; stored range windows never
/// surface as options.
pub fn aggregate(filter_rows: &[String]) -> HashMap<String, BTreeSet<String>> {
    let mut agg: HashMap<String, BTreeSet<String>> = HashMap::new();
    for row in filter_rows {
        let parsed: BTreeMap<String, FilterValue> = match serde_json::from_str(row) {
            Ok(map) => map,
            Err(err) => {
                log::warn!("skipping unparseable filters row: {err}");
                continue;
            }
        };
        for (key, value) in parsed {
            if let Some(text) = value.as_text() {
                agg.entry(key).or_default().insert(text);
            }
        }
    }
    agg
}

/// Numeric-aware option ordering: two values that both parse as numbers
/// compare numerically, anything else lexicographically.
pub fn compare_options(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

pub fn sort_values(values: BTreeSet<String>) -> Vec<String> {
    let mut out: Vec<String> = values.into_iter().collect();
    out.sort_by(|a, b| compare_options(a, b));
    out
}
