//! Document serializer built on `rust_xlsxwriter`.

use std::collections::HashMap;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Formula, Workbook, Worksheet};

use crate::conf::{N_BORDER_MEDIUM, N_BORDER_THIN};
use crate::document::SheetDocument;
use crate::error::{ReportError, Result};
use crate::spec::{EnumCellValue, SpecCellFormat};
use crate::util::sanitize_sheet_name;

/// Caches one `rust_xlsxwriter::Format` per distinct cell format.
#[derive(Default)]
struct FormatCache {
    dict_formats: HashMap<SpecCellFormat, Format>,
}

impl FormatCache {
    fn get(&mut self, spec: &SpecCellFormat) -> &Format {
        self.dict_formats
            .entry(spec.clone())
            .or_insert_with(|| derive_rust_xlsx_format(spec))
    }
}

/// Serialize a document into an in-memory xlsx buffer.
pub fn write_document_to_buffer(doc: &SheetDocument) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        write_document_to_worksheet(doc, worksheet)?;
    }
    Ok(workbook.save_to_buffer()?)
}

/// Serialize a document to an xlsx file.
pub fn write_document_to_path(doc: &SheetDocument, path: &Path) -> Result<()> {
    let v_bytes = write_document_to_buffer(doc)?;
    std::fs::write(path, v_bytes)?;
    Ok(())
}

/// Write every document primitive into `worksheet`.
///
/// Merges go first with an empty format so that the subsequent cell writes
/// own the anchor value and every styled cell inside the range.
pub fn write_document_to_worksheet(doc: &SheetDocument, worksheet: &mut Worksheet) -> Result<()> {
    let mut fmt_cache = FormatCache::default();

    worksheet.set_name(sanitize_sheet_name(doc.sheet_name(), "_"))?;

    let fmt_empty = Format::new();
    for range in doc.merges() {
        worksheet.merge_range(
            cast_row_num(range.row_start)?,
            cast_col_num(range.col_start)?,
            cast_row_num(range.row_end)?,
            cast_col_num(range.col_end)?,
            "",
            &fmt_empty,
        )?;
    }

    for ((row, col), cell) in doc.cells() {
        if cell.value.is_none() && cell.format.is_empty() {
            continue;
        }
        let format = fmt_cache.get(&cell.format);
        write_cell_with_format(worksheet, row, col, &cell.value, format)?;
    }

    for (row, dim) in doc.row_dimensions() {
        let n_row = cast_row_num(row)?;
        if let Some(height) = dim.height {
            worksheet.set_row_height(n_row, height)?;
        }
        if dim.hidden {
            worksheet.set_row_hidden(n_row)?;
        }
    }

    for (col, dim) in doc.col_dimensions() {
        let n_col = cast_col_num(col)?;
        if let Some(width) = dim.width {
            worksheet.set_column_width(n_col, width)?;
        }
        if dim.hidden {
            worksheet.set_column_hidden(n_col)?;
        }
    }

    if let Some(freeze) = doc.freeze() {
        worksheet.set_freeze_panes(freeze.n_rows, cast_col_num_0based(freeze.n_cols)?)?;
    }

    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row: u32,
    col: u32,
    value: &EnumCellValue,
    format: &Format,
) -> Result<()> {
    let n_row = cast_row_num(row)?;
    let n_col = cast_col_num(col)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Formula { formula, result } => {
            let formula = Formula::new(formula).set_result(result);
            worksheet.write_formula_with_format(n_row, n_col, formula, format)?;
        }
    }
    Ok(())
}

/// Map a report cell format onto `rust_xlsxwriter`.
///
/// Only the properties the report layout produces are carried: font,
/// alignment, fills, number format and thin/medium edges.
fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = apply_font(Format::new(), spec);

    let l_aligns = [
        spec.align.as_deref().and_then(derive_horizontal_align),
        spec.valign.as_deref().and_then(derive_vertical_align),
    ];
    for align in l_aligns.into_iter().flatten() {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.as_str());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }

    let l_edges = [
        (spec.top, Format::set_border_top as fn(Format, FormatBorder) -> Format),
        (spec.bottom, Format::set_border_bottom),
        (spec.left, Format::set_border_left),
        (spec.right, Format::set_border_right),
    ];
    for (code, set_edge) in l_edges {
        if let Some(border) = code.and_then(derive_format_border) {
            format = set_edge(format, border);
        }
    }
    format
}

fn apply_font(mut format: Format, spec: &SpecCellFormat) -> Format {
    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.as_str());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    if spec.italic == Some(true) {
        format = format.set_italic();
    }
    format
}

fn derive_format_border(code: i64) -> Option<FormatBorder> {
    match code {
        N_BORDER_THIN => Some(FormatBorder::Thin),
        N_BORDER_MEDIUM => Some(FormatBorder::Medium),
        _ => None,
    }
}

fn derive_horizontal_align(align: &str) -> Option<FormatAlign> {
    match align {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        _ => None,
    }
}

fn derive_vertical_align(valign: &str) -> Option<FormatAlign> {
    match valign {
        "top" => Some(FormatAlign::Top),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        "bottom" => Some(FormatAlign::Bottom),
        _ => None,
    }
}

fn cast_row_num(row: u32) -> Result<u32> {
    row.checked_sub(1)
        .ok_or_else(|| ReportError::Document("row index must be >= 1".to_string()))
}

fn cast_col_num(col: u32) -> Result<u16> {
    let n_col = col
        .checked_sub(1)
        .ok_or_else(|| ReportError::Document("column index must be >= 1".to_string()))?;
    cast_col_num_0based(n_col)
}

fn cast_col_num_0based(col: u32) -> Result<u16> {
    u16::try_from(col).map_err(|_| ReportError::Document(format!("column index overflow: {col}")))
}
