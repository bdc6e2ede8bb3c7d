//! The solution document payload stored in the `details` JSON column.
//!
//! The payload is deliberately schema-less at the store level: which filter
//! keys, component slots and parameters exist is decided by each imported
//! spreadsheet, not by a registered contract. This module is the one typed
//! representation of that payload, shared by the importer (which writes it)
//! and the query engine (which pushes predicates into it and reads it back).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One filter entry of a document: either a single scalar value (exact
/// filters) or a stored `{min, max}` window (range filters).
///
/// Untagged: a JSON object with `min`/`max` decodes as a range, anything
/// else as a scalar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    Range { min: String, max: String },
    Scalar(Value),
}

impl FilterValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        FilterValue::Scalar(Value::String(value.into()))
    }

    /// The scalar value as display text, or `None` for ranges and
    /// non-scalar JSON (ranges never surface as facet options).
    pub fn as_text(&self) -> Option<String> {
        match self {
            FilterValue::Range { .. } => None,
            FilterValue::Scalar(Value::String(s)) => Some(s.clone()),
            FilterValue::Scalar(Value::Number(n)) => Some(n.to_string()),
            FilterValue::Scalar(Value::Bool(b)) => Some(b.to_string()),
            FilterValue::Scalar(_) => None,
        }
    }
}

/// One repeatable sub-record of a solution, e.g. a physical part.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Component {
    pub name: String,
    pub product_code: String,
    pub spec_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SolutionDetail {
    pub filters: BTreeMap<String, FilterValue>,
    pub components: Vec<Component>,
    pub parameters: BTreeMap<String, String>,
}

impl SolutionDetail {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.components.is_empty() && self.parameters.is_empty()
    }
}
