//! In-memory spreadsheet document.
//!
//! A single sheet addressed by 1-based `(row, col)`: cell values with
//! formats, merged ranges, row/column dimensions and a frozen pane.
//! Serialization goes through [`crate::writer`] and [`crate::reader`].

use std::collections::BTreeMap;

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::error::{ReportError, Result};
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecColumnDimension, SpecFreezePane, SpecMergeRange,
    SpecRowDimension,
};
use crate::util::convert_range_to_a1;

/// One stored cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCell {
    pub value: EnumCellValue,
    pub format: SpecCellFormat,
}

static CELL_VALUE_NONE: EnumCellValue = EnumCellValue::None;

/// Single-sheet document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetDocument {
    sheet_name: String,
    dict_cells: BTreeMap<(u32, u32), SpecCell>,
    l_merges: Vec<SpecMergeRange>,
    dict_rows: BTreeMap<u32, SpecRowDimension>,
    dict_cols: BTreeMap<u32, SpecColumnDimension>,
    freeze: Option<SpecFreezePane>,
}

fn validate_cell_pos(row: u32, col: u32) -> Result<()> {
    if row == 0 || col == 0 || row > N_NROWS_EXCEL_MAX || col > N_NCOLS_EXCEL_MAX {
        return Err(ReportError::Document(format!(
            "cell ({row}, {col}) is outside the sheet"
        )));
    }
    Ok(())
}

impl SheetDocument {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            ..Default::default()
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn set_sheet_name(&mut self, sheet_name: impl Into<String>) {
        self.sheet_name = sheet_name.into();
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region Cells

    pub fn get_cell(&self, row: u32, col: u32) -> Option<&SpecCell> {
        self.dict_cells.get(&(row, col))
    }

    /// Value at `(row, col)`; blank when the cell does not exist.
    pub fn get_value(&self, row: u32, col: u32) -> &EnumCellValue {
        self.dict_cells
            .get(&(row, col))
            .map(|cell| &cell.value)
            .unwrap_or(&CELL_VALUE_NONE)
    }

    /// Set the value, keeping any existing format.
    pub fn set_value(&mut self, row: u32, col: u32, value: EnumCellValue) -> Result<()> {
        validate_cell_pos(row, col)?;
        self.dict_cells.entry((row, col)).or_default().value = value;
        Ok(())
    }

    /// Set the format, keeping any existing value.
    pub fn set_format(&mut self, row: u32, col: u32, format: SpecCellFormat) -> Result<()> {
        validate_cell_pos(row, col)?;
        self.dict_cells.entry((row, col)).or_default().format = format;
        Ok(())
    }

    /// Replace the whole cell.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: SpecCell) -> Result<()> {
        validate_cell_pos(row, col)?;
        self.dict_cells.insert((row, col), cell);
        Ok(())
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &SpecCell)> {
        self.dict_cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    /// Cells of one row in column order.
    pub fn cells_in_row(&self, row: u32) -> impl Iterator<Item = (u32, &SpecCell)> {
        self.dict_cells
            .range((row, 0)..=(row, u32::MAX))
            .map(|((_, col), cell)| (*col, cell))
    }

    pub fn n_cells(&self) -> usize {
        self.dict_cells.len()
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Merges

    /// Register a merged range.
    ///
    /// Single-cell ranges are a no-op and return `Ok(false)`. A range that
    /// overlaps an existing merge is rejected.
    pub fn merge(&mut self, range: SpecMergeRange) -> Result<bool> {
        validate_cell_pos(range.row_start, range.col_start)?;
        validate_cell_pos(range.row_end, range.col_end)?;
        if range.is_single_cell() {
            return Ok(false);
        }
        if let Some(existing) = self.l_merges.iter().find(|m| m.overlaps(&range)) {
            return Err(ReportError::Document(format!(
                "merge {} overlaps {}",
                convert_range_to_a1(&range),
                convert_range_to_a1(existing)
            )));
        }
        self.l_merges.push(range);
        Ok(true)
    }

    /// Shorthand for [`Self::merge`] with corner coordinates.
    pub fn merge_cells(
        &mut self,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
    ) -> Result<bool> {
        self.merge(SpecMergeRange::new(row_start, col_start, row_end, col_end))
    }

    /// Merged ranges in insertion order.
    pub fn merges(&self) -> &[SpecMergeRange] {
        &self.l_merges
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Dimensions

    pub fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        validate_cell_pos(row, 1)?;
        self.dict_rows.entry(row).or_default().height = Some(height);
        Ok(())
    }

    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) -> Result<()> {
        validate_cell_pos(row, 1)?;
        self.dict_rows.entry(row).or_default().hidden = hidden;
        Ok(())
    }

    pub fn set_row_dimension(&mut self, row: u32, dim: SpecRowDimension) -> Result<()> {
        validate_cell_pos(row, 1)?;
        self.dict_rows.insert(row, dim);
        Ok(())
    }

    pub fn row_dimension(&self, row: u32) -> Option<&SpecRowDimension> {
        self.dict_rows.get(&row)
    }

    pub fn row_dimensions(&self) -> impl Iterator<Item = (u32, &SpecRowDimension)> {
        self.dict_rows.iter().map(|(row, dim)| (*row, dim))
    }

    pub fn set_col_width(&mut self, col: u32, width: f64) -> Result<()> {
        validate_cell_pos(1, col)?;
        self.dict_cols.entry(col).or_default().width = Some(width);
        Ok(())
    }

    pub fn set_col_hidden(&mut self, col: u32, hidden: bool) -> Result<()> {
        validate_cell_pos(1, col)?;
        self.dict_cols.entry(col).or_default().hidden = hidden;
        Ok(())
    }

    pub fn set_col_dimension(&mut self, col: u32, dim: SpecColumnDimension) -> Result<()> {
        validate_cell_pos(1, col)?;
        self.dict_cols.insert(col, dim);
        Ok(())
    }

    pub fn col_dimension(&self, col: u32) -> Option<&SpecColumnDimension> {
        self.dict_cols.get(&col)
    }

    pub fn col_dimensions(&self) -> impl Iterator<Item = (u32, &SpecColumnDimension)> {
        self.dict_cols.iter().map(|(col, dim)| (*col, dim))
    }

    pub fn set_freeze(&mut self, freeze: Option<SpecFreezePane>) {
        self.freeze = freeze;
    }

    pub fn freeze(&self) -> Option<SpecFreezePane> {
        self.freeze
    }

    /// Last used row over cells, explicit rows and merges; 0 when empty.
    pub fn row_count(&self) -> u32 {
        let n_cells = self.dict_cells.keys().map(|(row, _)| *row).max().unwrap_or(0);
        let n_rows = self.dict_rows.keys().max().copied().unwrap_or(0);
        let n_merges = self.l_merges.iter().map(|m| m.row_end).max().unwrap_or(0);
        n_cells.max(n_rows).max(n_merges)
    }

    /// Last used column over cells and merges; 0 when empty.
    pub fn col_count(&self) -> u32 {
        let n_cells = self.dict_cells.keys().map(|(_, col)| *col).max().unwrap_or(0);
        let n_merges = self.l_merges.iter().map(|m| m.col_end).max().unwrap_or(0);
        n_cells.max(n_merges)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////

    /// Serialize to an xlsx buffer.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        crate::writer::write_document_to_buffer(self)
    }

    /// Parse the first worksheet of an xlsx buffer.
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self> {
        crate::reader::read_document_from_buffer(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_rules() {
        let mut doc = SheetDocument::new("Sheet1");
        assert!(doc.merge_cells(4, 2, 8, 2).unwrap());
        assert!(!doc.merge_cells(3, 3, 3, 3).unwrap());
        assert!(doc.merge_cells(6, 1, 6, 2).is_err());
        assert!(doc.merge_cells(4, 3, 8, 3).unwrap());
        assert_eq!(doc.merges().len(), 2);
        assert_eq!(doc.merges()[0], SpecMergeRange::new(4, 2, 8, 2));
    }

    #[test]
    fn test_cells_and_extent() {
        let mut doc = SheetDocument::new("Sheet1");
        assert_eq!(doc.row_count(), 0);
        doc.set_value(2, 5, EnumCellValue::Number(3.0)).unwrap();
        doc.set_value(2, 1, EnumCellValue::String("a".into())).unwrap();
        doc.set_value(3, 2, EnumCellValue::None).unwrap();
        doc.set_row_hidden(9, true).unwrap();
        assert!(doc.set_value(0, 1, EnumCellValue::None).is_err());

        let l_cols: Vec<u32> = doc.cells_in_row(2).map(|(col, _)| col).collect();
        assert_eq!(l_cols, vec![1, 5]);
        assert_eq!(doc.row_count(), 9);
        assert_eq!(doc.col_count(), 5);
        assert_eq!(doc.get_value(2, 5).as_f64(), Some(3.0));
        assert!(doc.get_value(40, 40).is_none());
        assert_eq!(doc.get_value(2, 1), &EnumCellValue::String("a".into()));
        assert!(doc.get_value(3, 2).is_none());
    }
}
