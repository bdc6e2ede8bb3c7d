//! Column schema inference from header-cell fill colors.
//!
//! The spreadsheet convention encodes column semantics in the header row's
//! background color: blue marks an exact filter, red marks one column of a
//! range pair, green marks a component field, and anything else (including
//! no fill) is a free parameter. Red columns must be authored as adjacent
//! `base_min`, `base_max` pairs; a malformed pair fails the whole import up
//! front instead of silently degrading the column.
//!
//! Component columns group into repeatable slots: a 工序 header always opens
//! a new slot, other recognised component headers join the open slot (or
//! open one), and any non-component column closes it.

use crate::error::{AppError, AppResult};
use common::model::filter::{self, RangeBound};

pub const EXACT_FILTER_ARGB: &str = "FF0000FF";
pub const RANGE_FILTER_ARGB: &str = "FFFF0000";
pub const COMPONENT_ARGB: &str = "FF00FF00";

/// Component field headers the importer recognises. 商品编码 is the slot key:
/// a slot without it in the data row is skipped entirely.
pub const COMPONENT_NAME_HEADER: &str = "工序";
pub const COMPONENT_CODE_HEADER: &str = "商品编码";
pub const COMPONENT_SPEC_HEADER: &str = "规格型号";

/// One header cell: trimmed text plus the raw fill color, if any.
#[derive(Debug, Clone)]
pub struct HeaderCell {
    pub text: String,
    pub fill_argb: Option<String>,
}

/// The two adjacent columns of one range filter.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeColumns {
    pub base: String,
    pub min_col: usize,
    pub max_col: usize,
}

/// Column indexes of one component slot's fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSlot {
    pub name_col: Option<usize>,
    pub code_col: Option<usize>,
    pub spec_col: Option<usize>,
}

/// The parsing schema derived once per import from the header row. Ephemeral:
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSchema {
    pub exact: Vec<(usize, String)>,
    pub ranges: Vec<RangeColumns>,
    pub components: Vec<ComponentSlot>,
    pub parameters: Vec<(usize, String)>,
}

fn normalize_argb(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    match raw.len() {
        8 => Some(raw.to_uppercase()),
        6 => Some(format!("FF{}", raw.to_uppercase())),
        _ => None,
    }
}

pub fn infer_schema(header: &[HeaderCell]) -> AppResult<ColumnSchema> {
    let mut schema = ColumnSchema::default();
    // index into schema.components of the slot currently accepting fields
    let mut open_slot: Option<usize> = None;
    // a red `_min` column waiting for its adjacent `_max`
    let mut pending_range: Option<(usize, String)> = None;

    for (col, cell) in header.iter().enumerate() {
        let text = cell.text.trim();
        if text.is_empty() {
            if let Some((_, base)) = pending_range {
                return Err(AppError::parse(format!(
                    "range filter {base:?} is missing its adjacent _max column"
                )));
            }
            open_slot = None;
            continue;
        }
        let color = normalize_argb(cell.fill_argb.as_deref());

        if let Some((min_col, base)) = pending_range.take() {
            // the column right after a _min must be the matching red _max
            let is_max = color.as_deref() == Some(RANGE_FILTER_ARGB)
                && col == min_col + 1
                && text == filter::max_key(&base);
            if !is_max {
                return Err(AppError::parse(format!(
                    "range filter {base:?} must be authored as adjacent {}/{} columns",
                    filter::min_key(&base),
                    filter::max_key(&base)
                )));
            }
            schema.ranges.push(RangeColumns {
                base,
                min_col,
                max_col: col,
            });
            continue;
        }

        match color.as_deref() {
            Some(EXACT_FILTER_ARGB) => {
                schema.exact.push((col, text.to_string()));
                open_slot = None;
            }
            Some(RANGE_FILTER_ARGB) => {
                match filter::split_range_key(text) {
                    Some((base, RangeBound::Min)) => {
                        pending_range = Some((col, base.to_string()));
                    }
                    _ => {
                        return Err(AppError::parse(format!(
                            "range filter column {text:?} must end in {}",
                            filter::MIN_SUFFIX
                        )));
                    }
                }
                open_slot = None;
            }
            Some(COMPONENT_ARGB) => match text {
                COMPONENT_NAME_HEADER => {
                    schema.components.push(ComponentSlot {
                        name_col: Some(col),
                        ..ComponentSlot::default()
                    });
                    open_slot = Some(schema.components.len() - 1);
                }
                COMPONENT_CODE_HEADER | COMPONENT_SPEC_HEADER => {
                    let slot = match open_slot {
                        Some(i) => i,
                        None => {
                            schema.components.push(ComponentSlot::default());
                            open_slot = Some(schema.components.len() - 1);
                            schema.components.len() - 1
                        }
                    };
                    if text == COMPONENT_CODE_HEADER {
                        schema.components[slot].code_col = Some(col);
                    } else {
                        schema.components[slot].spec_col = Some(col);
                    }
                }
                _ => {
                    // green but unrecognised: a free parameter
                    schema.parameters.push((col, text.to_string()));
                    open_slot = None;
                }
            },
            _ => {
                // no marker: silent fallback to a free parameter
                schema.parameters.push((col, text.to_string()));
                open_slot = None;
            }
        }
    }

    if let Some((_, base)) = pending_range {
        return Err(AppError::parse(format!(
            "range filter {base:?} is missing its adjacent _max column"
        )));
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str, fill: Option<&str>) -> HeaderCell {
        HeaderCell {
            text: text.to_string(),
            fill_argb: fill.map(str::to_string),
        }
    }

    #[test]
    fn classifies_the_reference_header() {
        // 颜色(blue) 长度_min(red) 长度_max(red) 工序(green) 商品编码(green) 备注(no fill)
        let header = vec![
            cell("颜色", Some("FF0000FF")),
            cell("长度_min", Some("FFFF0000")),
            cell("长度_max", Some("FFFF0000")),
            cell("工序", Some("FF00FF00")),
            cell("商品编码", Some("FF00FF00")),
            cell("备注", None),
        ];
        let schema = infer_schema(&header).unwrap();
        assert_eq!(schema.exact, vec![(0, "颜色".to_string())]);
        assert_eq!(
            schema.ranges,
            vec![RangeColumns {
                base: "长度".into(),
                min_col: 1,
                max_col: 2
            }]
        );
        assert_eq!(schema.components.len(), 1);
        assert_eq!(schema.components[0].name_col, Some(3));
        assert_eq!(schema.components[0].code_col, Some(4));
        assert_eq!(schema.parameters, vec![(5, "备注".to_string())]);
    }

    #[test]
    fn six_digit_fills_get_an_alpha_prefix() {
        let header = vec![cell("颜色", Some("0000ff"))];
        let schema = infer_schema(&header).unwrap();
        assert_eq!(schema.exact, vec![(0, "颜色".to_string())]);
    }

    #[test]
    fn each_process_header_opens_a_new_slot() {
        let header = vec![
            cell("工序", Some("FF00FF00")),
            cell("商品编码", Some("FF00FF00")),
            cell("规格型号", Some("FF00FF00")),
            cell("工序", Some("FF00FF00")),
            cell("商品编码", Some("FF00FF00")),
        ];
        let schema = infer_schema(&header).unwrap();
        assert_eq!(schema.components.len(), 2);
        assert_eq!(schema.components[0].spec_col, Some(2));
        assert_eq!(schema.components[1].code_col, Some(4));
    }

    #[test]
    fn non_component_column_closes_the_open_slot() {
        let header = vec![
            cell("工序", Some("FF00FF00")),
            cell("备注", None),
            cell("商品编码", Some("FF00FF00")),
        ];
        let schema = infer_schema(&header).unwrap();
        // the code column after the break starts a second slot
        assert_eq!(schema.components.len(), 2);
        assert_eq!(schema.components[1].code_col, Some(2));
    }

    #[test]
    fn unrecognised_green_header_is_a_parameter() {
        let header = vec![cell("产地", Some("FF00FF00"))];
        let schema = infer_schema(&header).unwrap();
        assert_eq!(schema.parameters, vec![(0, "产地".to_string())]);
    }

    #[test]
    fn lone_min_column_fails_the_import() {
        let header = vec![cell("长度_min", Some("FFFF0000")), cell("备注", None)];
        let err = infer_schema(&header).unwrap_err();
        assert!(matches!(err, AppError::SpreadsheetParse(_)));
    }

    #[test]
    fn mismatched_max_base_fails_the_import() {
        let header = vec![
            cell("长度_min", Some("FFFF0000")),
            cell("宽度_max", Some("FFFF0000")),
        ];
        assert!(infer_schema(&header).is_err());
    }

    #[test]
    fn red_column_without_min_suffix_fails_the_import() {
        let header = vec![cell("长度", Some("FFFF0000"))];
        assert!(infer_schema(&header).is_err());
    }

    #[test]
    fn trailing_min_column_fails_the_import() {
        let header = vec![cell("长度_min", Some("FFFF0000"))];
        assert!(infer_schema(&header).is_err());
    }

    #[test]
    fn empty_headers_are_skipped() {
        let header = vec![
            cell("", None),
            cell("颜色", Some("FF0000FF")),
            cell("  ", None),
        ];
        let schema = infer_schema(&header).unwrap();
        assert_eq!(schema.exact, vec![(1, "颜色".to_string())]);
        assert!(schema.parameters.is_empty());
    }
}
