//! Stateless helper utilities shared by the renderer, codec and merge engine.

use std::cmp::Ordering;

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::error::{ReportError, Result};
use crate::spec::SpecMergeRange;

////////////////////////////////////////////////////////////////////////////////
// #region CellReferences

/// Column letters of a 1-based column index (`1` -> `A`, `27` -> `AA`).
pub fn convert_col_to_letters(col: u32) -> String {
    let mut n_rest = col;
    let mut l_chars = Vec::new();
    while n_rest > 0 {
        let n_rem = (n_rest - 1) % 26;
        l_chars.push(char::from(b'A' + n_rem as u8));
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// A1 reference of a 1-based `(row, col)`.
pub fn convert_cell_to_a1(row: u32, col: u32) -> String {
    format!("{}{row}", convert_col_to_letters(col))
}

/// Parse an A1 reference (`$` markers allowed) into 1-based `(row, col)`.
pub fn parse_a1_cell(cell_ref: &str) -> Result<(u32, u32)> {
    let mut n_col: u32 = 0;
    let mut n_row: u32 = 0;
    let mut if_saw_col = false;
    let mut if_saw_row = false;

    for ch in cell_ref.trim().chars() {
        match ch {
            '$' => continue,
            'A'..='Z' | 'a'..='z' if !if_saw_row => {
                let upper = ch.to_ascii_uppercase();
                n_col = n_col
                    .checked_mul(26)
                    .and_then(|n| n.checked_add(upper as u32 - 'A' as u32 + 1))
                    .ok_or_else(|| ReportError::CellRef(cell_ref.to_string()))?;
                if_saw_col = true;
            }
            '0'..='9' if if_saw_col => {
                n_row = n_row
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(ch as u32 - '0' as u32))
                    .ok_or_else(|| ReportError::CellRef(cell_ref.to_string()))?;
                if_saw_row = true;
            }
            _ => return Err(ReportError::CellRef(cell_ref.to_string())),
        }
    }

    if !if_saw_col || !if_saw_row || n_row == 0 {
        return Err(ReportError::CellRef(cell_ref.to_string()));
    }
    Ok((n_row, n_col))
}

/// Parse `A1:B10` (or a single `A1`) into a normalized range.
pub fn parse_a1_range(range: &str) -> Result<SpecMergeRange> {
    match range.split_once(':') {
        Some((c_start, c_end)) => {
            let (row_start, col_start) = parse_a1_cell(c_start)?;
            let (row_end, col_end) = parse_a1_cell(c_end)?;
            Ok(SpecMergeRange::new(row_start, col_start, row_end, col_end))
        }
        None => {
            let (row, col) = parse_a1_cell(range)?;
            Ok(SpecMergeRange::new(row, col, row, col))
        }
    }
}

/// A1 text of a range (`B4:B8`).
pub fn convert_range_to_a1(range: &SpecMergeRange) -> String {
    format!(
        "{}:{}",
        convert_cell_to_a1(range.row_start, range.col_start),
        convert_cell_to_a1(range.row_end, range.col_end)
    )
}

/// Translate a range vertically by `offset` rows.
///
/// Returns `None` when the result would leave the sheet (row < 1).
pub fn shift_range_rows(range: &SpecMergeRange, offset: i64) -> Option<SpecMergeRange> {
    let row_start = i64::from(range.row_start) + offset;
    let row_end = i64::from(range.row_end) + offset;
    if row_start < 1 {
        return None;
    }
    Some(SpecMergeRange {
        row_start: u32::try_from(row_start).ok()?,
        col_start: range.col_start,
        row_end: u32::try_from(row_end).ok()?,
        col_end: range.col_end,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Names

/// Sanitize sheet name by replacing illegal chars and truncating length.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Sanitize a dataset name for use as a file stem.
pub fn sanitize_file_stem(name: &str) -> String {
    let c_stem: String = name
        .chars()
        .map(|ch| match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let c_stem = c_stem.trim().trim_end_matches('.').to_string();
    if c_stem.is_empty() {
        "report".to_string()
    } else {
        c_stem
    }
}

/// Locale-style name order: case-insensitive characters first, bytes as tie-break.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    let iter_left = left.chars().flat_map(char::to_lowercase);
    let iter_right = right.chars().flat_map(char::to_lowercase);
    iter_left.cmp(iter_right).then_with(|| left.cmp(right))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Workers

/// Worker count for a rayon pool: the request clamped to available cores,
/// or up to 8 when unset.
pub fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(convert_col_to_letters(1), "A");
        assert_eq!(convert_col_to_letters(26), "Z");
        assert_eq!(convert_col_to_letters(27), "AA");
        assert_eq!(convert_col_to_letters(703), "AAA");
        assert_eq!(convert_cell_to_a1(4, 2), "B4");
    }

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1_cell("B4").ok(), Some((4, 2)));
        assert_eq!(parse_a1_cell("$AA$10").ok(), Some((10, 27)));
        assert!(parse_a1_cell("4B").is_err());
        assert!(parse_a1_cell("B0").is_err());
        assert!(parse_a1_cell("").is_err());

        let range = parse_a1_range("B8:B4").unwrap();
        assert_eq!(range, SpecMergeRange::new(4, 2, 8, 2));
        assert_eq!(convert_range_to_a1(&range), "B4:B8");
    }

    #[test]
    fn test_shift_range_rows() {
        let range = parse_a1_range("B4:B8").unwrap();
        let shifted = shift_range_rows(&range, 50 - 4).unwrap();
        assert_eq!(convert_range_to_a1(&shifted), "B50:B54");
        assert!(shift_range_rows(&range, -4).is_none());
    }

    #[test]
    fn test_sanitize_names() {
        assert_eq!(sanitize_sheet_name(" a/b[c] ", "_"), "a_b_c_");
        assert_eq!(sanitize_sheet_name("", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
        assert_eq!(sanitize_file_stem("a:b?"), "a_b_");
        assert_eq!(sanitize_file_stem("  "), "report");
    }

    #[test]
    fn test_worker_limit() {
        assert_eq!(calculate_worker_limit(Some(0)), 1);
        assert!(calculate_worker_limit(None) <= 8);
        assert!(calculate_worker_limit(Some(1_000)) >= 1);
    }

    #[test]
    fn test_compare_names() {
        assert_eq!(compare_names("alice", "Bob"), Ordering::Less);
        assert_eq!(compare_names("Bob", "alice"), Ordering::Greater);
        assert_eq!(compare_names("Alice", "alice"), Ordering::Less);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }
}
