//! The `_min`/`_max` range-key convention.
//!
//! Range filters travel as two flat request keys (`长度_min`, `长度_max`) but
//! are stored in a solution document as one `{min, max}` object under the
//! base name. Spreadsheet headers use the same suffixes to mark the two
//! columns of a range pair. Both the importer and the predicate builder go
//! through this module, so the suffix convention is defined exactly once.

pub const MIN_SUFFIX: &str = "_min";
pub const MAX_SUFFIX: &str = "_max";

/// Which side of a range a suffixed key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Min,
    Max,
}

/// Splits a suffixed key into its base name and bound.
///
/// Returns `None` for keys without a suffix, and for keys that are *only*
/// a suffix (an empty base name is never a valid filter).
pub fn split_range_key(key: &str) -> Option<(&str, RangeBound)> {
    if let Some(base) = key.strip_suffix(MIN_SUFFIX) {
        if !base.is_empty() {
            return Some((base, RangeBound::Min));
        }
    }
    if let Some(base) = key.strip_suffix(MAX_SUFFIX) {
        if !base.is_empty() {
            return Some((base, RangeBound::Max));
        }
    }
    None
}

pub fn min_key(base: &str) -> String {
    format!("{base}{MIN_SUFFIX}")
}

pub fn max_key(base: &str) -> String {
    format!("{base}{MAX_SUFFIX}")
}
