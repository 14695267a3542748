//! xlsx buffer reader.
//!
//! Parses the first worksheet of a package into a [`SheetDocument`]: shared
//! strings, cell formats (fonts, fills, borders, alignment, number formats),
//! merged ranges, row/column dimensions and the frozen pane. Covers the part
//! of SpreadsheetML that [`crate::writer`] produces.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::conf::{N_BORDER_MEDIUM, N_BORDER_THIN};
use crate::document::{SheetDocument, SpecCell};
use crate::error::{ReportError, Result};
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecColumnDimension, SpecFreezePane, SpecRowDimension,
};
use crate::util::{parse_a1_cell, parse_a1_range};

/// Column width padding added by the writer for the default font.
const N_WIDTH_PADDING: f64 = 0.7109375;
const N_WIDTH_TOLERANCE: f64 = 0.0005;

const C_PATH_WORKBOOK: &str = "xl/workbook.xml";
const C_PATH_WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const C_PATH_SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const C_PATH_STYLES: &str = "xl/styles.xml";
const C_PATH_SHEET_DEFAULT: &str = "xl/worksheets/sheet1.xml";

/// Parse the first worksheet of an xlsx buffer.
pub fn read_document_from_buffer(bytes: &[u8]) -> Result<SheetDocument> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let (c_sheet_name, c_sheet_path) = read_first_sheet_entry(&mut archive)?;
    let l_shared_strings = match read_zip_text(&mut archive, C_PATH_SHARED_STRINGS)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let l_cell_formats = match read_zip_text(&mut archive, C_PATH_STYLES)? {
        Some(xml) => parse_styles(&xml)?,
        None => Vec::new(),
    };
    let c_sheet_xml = read_zip_text(&mut archive, &c_sheet_path)?.ok_or_else(|| {
        ReportError::XlsxParse(format!("worksheet part `{c_sheet_path}` is missing"))
    })?;

    parse_worksheet(&c_sheet_xml, c_sheet_name, &l_shared_strings, &l_cell_formats)
}

////////////////////////////////////////////////////////////////////////////////
// #region PackageParts

fn read_zip_text<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut c_text = String::new();
            file.read_to_string(&mut c_text)?;
            Ok(Some(c_text))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

fn attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.as_str(), "1" | "true"))
}

fn convert_xml_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::XlsxParse(err.to_string())
}

/// Name and part path of the first sheet; falls back to `sheet1.xml`.
fn read_first_sheet_entry<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<(String, String)> {
    let Some(c_workbook_xml) = read_zip_text(archive, C_PATH_WORKBOOK)? else {
        return Ok(("Sheet1".to_string(), C_PATH_SHEET_DEFAULT.to_string()));
    };

    let mut c_name = "Sheet1".to_string();
    let mut c_rel_id: Option<String> = None;
    let mut reader = Reader::from_reader(c_workbook_xml.as_bytes());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let Some(name) = attr_string(&e, b"name") {
                    c_name = name;
                }
                c_rel_id = attr_string(&e, b"id");
                break;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let Some(c_rel_id) = c_rel_id else {
        return Ok((c_name, C_PATH_SHEET_DEFAULT.to_string()));
    };
    let Some(c_rels_xml) = read_zip_text(archive, C_PATH_WORKBOOK_RELS)? else {
        return Ok((c_name, C_PATH_SHEET_DEFAULT.to_string()));
    };

    let mut reader = Reader::from_reader(c_rels_xml.as_bytes());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e)
                if e.local_name().as_ref() == b"Relationship"
                    && attr_string(&e, b"Id").as_deref() == Some(c_rel_id.as_str()) =>
            {
                let c_target = attr_string(&e, b"Target").unwrap_or_default();
                let c_path = match c_target.strip_prefix('/') {
                    Some(abs) => abs.to_string(),
                    None => format!("xl/{c_target}"),
                };
                return Ok((c_name, c_path));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok((c_name, C_PATH_SHEET_DEFAULT.to_string()))
}

/// Shared string table, rich-text runs concatenated.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut l_strings = Vec::new();
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut c_current: Option<String> = None;
    let mut if_in_t = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => c_current = Some(String::new()),
                b"t" => if_in_t = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => l_strings.push(String::new()),
            Event::Text(t) if if_in_t => {
                if let Some(c_current) = c_current.as_mut() {
                    c_current.push_str(&t.unescape().map_err(convert_xml_error)?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => l_strings.push(c_current.take().unwrap_or_default()),
                b"t" => if_in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(l_strings)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Styles

/// Built-in number format codes that carry no `numFmt` entry.
fn derive_builtin_num_format(id: u32) -> Option<&'static str> {
    match id {
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        49 => Some("@"),
        _ => None,
    }
}

/// Report edges are thin or medium; other line styles are not carried.
fn derive_border_code(style: &str) -> Option<i64> {
    match style {
        "thin" => Some(N_BORDER_THIN),
        "medium" => Some(N_BORDER_MEDIUM),
        _ => None,
    }
}

/// `FFRRGGBB` -> `#RRGGBB`.
fn convert_argb(rgb: &str) -> String {
    let c_rgb = if rgb.len() == 8 { &rgb[2..] } else { rgb };
    format!("#{}", c_rgb.to_ascii_uppercase())
}

#[derive(Debug, Default)]
struct RawFont {
    name: Option<String>,
    size: Option<f64>,
    bold: bool,
    italic: bool,
    color: Option<String>,
}

#[derive(Debug, Default)]
struct RawFill {
    if_solid: bool,
    fg_color: Option<String>,
}

#[derive(Debug, Default)]
struct RawBorder {
    top: Option<i64>,
    bottom: Option<i64>,
    left: Option<i64>,
    right: Option<i64>,
}

#[derive(Debug, Default)]
struct RawXf {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    horizontal: Option<String>,
    vertical: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumStylesSection {
    None,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

struct StylesParser {
    section: EnumStylesSection,
    dict_num_fmts: BTreeMap<u32, String>,
    l_fonts: Vec<RawFont>,
    l_fills: Vec<RawFill>,
    l_borders: Vec<RawBorder>,
    l_xfs: Vec<RawXf>,
    font: Option<RawFont>,
    fill: Option<RawFill>,
    border: Option<RawBorder>,
    xf: Option<RawXf>,
}

impl StylesParser {
    fn new() -> Self {
        Self {
            section: EnumStylesSection::None,
            dict_num_fmts: BTreeMap::new(),
            l_fonts: Vec::new(),
            l_fills: Vec::new(),
            l_borders: Vec::new(),
            l_xfs: Vec::new(),
            font: None,
            fill: None,
            border: None,
            xf: None,
        }
    }

    fn open(&mut self, e: &BytesStart) {
        let name = e.local_name();
        match (self.section, name.as_ref()) {
            (_, b"numFmts") => self.section = EnumStylesSection::NumFmts,
            (_, b"fonts") => self.section = EnumStylesSection::Fonts,
            (_, b"fills") => self.section = EnumStylesSection::Fills,
            (_, b"borders") => self.section = EnumStylesSection::Borders,
            (_, b"cellXfs") => self.section = EnumStylesSection::CellXfs,
            (EnumStylesSection::NumFmts, b"numFmt") => {
                if let (Some(id), Some(code)) = (attr_u32(e, b"numFmtId"), attr_string(e, b"formatCode")) {
                    self.dict_num_fmts.insert(id, code);
                }
            }
            (EnumStylesSection::Fonts, b"font") => self.font = Some(RawFont::default()),
            (EnumStylesSection::Fonts, tag) => {
                if let Some(font) = self.font.as_mut() {
                    let if_on = attr_string(e, b"val").is_none_or(|v| v != "0" && v != "false");
                    match tag {
                        b"b" => font.bold = if_on,
                        b"i" => font.italic = if_on,
                        b"sz" => font.size = attr_f64(e, b"val"),
                        b"name" => font.name = attr_string(e, b"val"),
                        b"color" => font.color = attr_string(e, b"rgb").map(|c| convert_argb(&c)),
                        _ => {}
                    }
                }
            }
            (EnumStylesSection::Fills, b"fill") => self.fill = Some(RawFill::default()),
            (EnumStylesSection::Fills, b"patternFill") => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.if_solid = attr_string(e, b"patternType").as_deref() == Some("solid");
                }
            }
            (EnumStylesSection::Fills, b"fgColor") => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.fg_color = attr_string(e, b"rgb").map(|c| convert_argb(&c));
                }
            }
            (EnumStylesSection::Borders, b"border") => self.border = Some(RawBorder::default()),
            (EnumStylesSection::Borders, tag @ (b"top" | b"bottom" | b"left" | b"right")) => {
                if let Some(border) = self.border.as_mut() {
                    let code = attr_string(e, b"style").and_then(|s| derive_border_code(&s));
                    match tag {
                        b"top" => border.top = code,
                        b"bottom" => border.bottom = code,
                        b"left" => border.left = code,
                        _ => border.right = code,
                    }
                }
            }
            (EnumStylesSection::CellXfs, b"xf") => {
                self.xf = Some(RawXf {
                    num_fmt_id: attr_u32(e, b"numFmtId").unwrap_or(0),
                    font_id: attr_u32(e, b"fontId").unwrap_or(0) as usize,
                    fill_id: attr_u32(e, b"fillId").unwrap_or(0) as usize,
                    border_id: attr_u32(e, b"borderId").unwrap_or(0) as usize,
                    ..Default::default()
                });
            }
            (EnumStylesSection::CellXfs, b"alignment") => {
                if let Some(xf) = self.xf.as_mut() {
                    xf.horizontal = attr_string(e, b"horizontal");
                    xf.vertical = attr_string(e, b"vertical");
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"numFmts" | b"fonts" | b"fills" | b"borders" | b"cellXfs" => {
                self.section = EnumStylesSection::None;
            }
            b"font" => self.l_fonts.extend(self.font.take()),
            b"fill" => self.l_fills.extend(self.fill.take()),
            b"border" => self.l_borders.extend(self.border.take()),
            b"xf" => self.l_xfs.extend(self.xf.take()),
            _ => {}
        }
    }

    fn derive_cell_format(&self, xf: &RawXf) -> SpecCellFormat {
        let mut fmt = SpecCellFormat {
            num_format: self
                .dict_num_fmts
                .get(&xf.num_fmt_id)
                .cloned()
                .or_else(|| derive_builtin_num_format(xf.num_fmt_id).map(str::to_string)),
            ..Default::default()
        };

        // Font 0 is the workbook default.
        if xf.font_id > 0
            && let Some(font) = self.l_fonts.get(xf.font_id)
        {
            fmt.font_name = font.name.clone();
            fmt.font_size = font.size.filter(|sz| *sz != 11.0).map(|sz| sz.round() as i64);
            fmt.bold = font.bold.then_some(true);
            fmt.italic = font.italic.then_some(true);
            fmt.font_color = font.color.clone();
        }
        if let Some(fill) = self.l_fills.get(xf.fill_id)
            && fill.if_solid
        {
            fmt.bg_color = fill.fg_color.clone();
        }
        if let Some(border) = self.l_borders.get(xf.border_id) {
            fmt.top = border.top;
            fmt.bottom = border.bottom;
            fmt.left = border.left;
            fmt.right = border.right;
        }
        fmt.align = xf.horizontal.clone().filter(|h| h != "general");
        fmt.valign = xf.vertical.as_deref().map(|v| match v {
            "center" => "vcenter".to_string(),
            other => other.to_string(),
        });
        fmt
    }
}

/// Resolved cell formats indexed by `cellXfs` position.
fn parse_styles(xml: &str) -> Result<Vec<SpecCellFormat>> {
    let mut parser = StylesParser::new();
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => parser.open(&e),
            Event::Empty(e) => {
                parser.open(&e);
                parser.close(e.local_name().as_ref());
            }
            Event::End(e) => parser.close(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(parser
        .l_xfs
        .iter()
        .map(|xf| parser.derive_cell_format(xf))
        .collect())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Worksheet

/// Inverse of the writer's column width padding.
fn strip_width_padding(raw: f64) -> f64 {
    let n_frac = raw % 1.0;
    if (n_frac - N_WIDTH_PADDING).abs() < N_WIDTH_TOLERANCE && raw - N_WIDTH_PADDING >= 0.0 {
        return ((raw - N_WIDTH_PADDING) * 10000.0).round() / 10000.0;
    }
    (raw * 10000.0).round() / 10000.0
}

#[derive(Debug, Default)]
struct RawCell {
    row: u32,
    col: u32,
    style_idx: usize,
    kind: String,
    value: String,
    formula: Option<String>,
    inline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumTextTarget {
    None,
    Value,
    Formula,
    Inline,
}

struct WorksheetParser<'a> {
    doc: SheetDocument,
    l_shared_strings: &'a [String],
    l_cell_formats: &'a [SpecCellFormat],
    cell: Option<RawCell>,
    text_target: EnumTextTarget,
    if_in_inline: bool,
    n_row_current: u32,
    n_col_current: u32,
}

impl WorksheetParser<'_> {
    fn open(&mut self, e: &BytesStart) -> Result<()> {
        match e.local_name().as_ref() {
            b"pane" => {
                let c_state = attr_string(e, b"state").unwrap_or_default();
                if c_state.starts_with("frozen") {
                    let n_cols = attr_f64(e, b"xSplit").unwrap_or(0.0) as u32;
                    let n_rows = attr_f64(e, b"ySplit").unwrap_or(0.0) as u32;
                    self.doc.set_freeze(Some(SpecFreezePane { n_rows, n_cols }));
                }
            }
            b"col" => {
                let n_min = attr_u32(e, b"min").unwrap_or(0);
                let n_max = attr_u32(e, b"max").unwrap_or(n_min);
                let dim = SpecColumnDimension {
                    width: attr_f64(e, b"width").map(strip_width_padding),
                    hidden: attr_bool(e, b"hidden").unwrap_or(false),
                };
                for col in n_min.max(1)..=n_max {
                    self.doc.set_col_dimension(col, dim)?;
                }
            }
            b"row" => {
                self.n_row_current = attr_u32(e, b"r").unwrap_or(self.n_row_current + 1);
                self.n_col_current = 0;
                let dim = SpecRowDimension {
                    height: attr_f64(e, b"ht"),
                    hidden: attr_bool(e, b"hidden").unwrap_or(false),
                };
                if dim.height.is_some() || dim.hidden {
                    self.doc.set_row_dimension(self.n_row_current, dim)?;
                }
            }
            b"c" => {
                let (row, col) = match attr_string(e, b"r") {
                    Some(c_ref) => parse_a1_cell(&c_ref)?,
                    None => (self.n_row_current, self.n_col_current + 1),
                };
                self.n_col_current = col;
                self.cell = Some(RawCell {
                    row,
                    col,
                    style_idx: attr_u32(e, b"s").unwrap_or(0) as usize,
                    kind: attr_string(e, b"t").unwrap_or_default(),
                    ..Default::default()
                });
            }
            b"v" => self.text_target = EnumTextTarget::Value,
            b"f" => {
                self.text_target = EnumTextTarget::Formula;
                if let Some(cell) = self.cell.as_mut() {
                    cell.formula.get_or_insert_with(String::new);
                }
            }
            b"is" => self.if_in_inline = true,
            b"t" if self.if_in_inline => self.text_target = EnumTextTarget::Inline,
            b"mergeCell" => {
                if let Some(c_ref) = attr_string(e, b"ref") {
                    self.doc.merge(parse_a1_range(&c_ref)?)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        let Some(cell) = self.cell.as_mut() else {
            return;
        };
        match self.text_target {
            EnumTextTarget::Value => cell.value.push_str(text),
            EnumTextTarget::Formula => {
                cell.formula.get_or_insert_with(String::new).push_str(text);
            }
            EnumTextTarget::Inline => cell.inline.push_str(text),
            EnumTextTarget::None => {}
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"v" | b"f" | b"t" => self.text_target = EnumTextTarget::None,
            b"is" => self.if_in_inline = false,
            b"c" => {
                if let Some(cell) = self.cell.take() {
                    self.finish_cell(cell)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_cell(&mut self, cell: RawCell) -> Result<()> {
        let value_plain = match cell.kind.as_str() {
            "s" => {
                let n_idx: usize = cell.value.trim().parse().map_err(|_| {
                    ReportError::XlsxParse(format!("bad shared string index `{}`", cell.value))
                })?;
                let c_text = self.l_shared_strings.get(n_idx).ok_or_else(|| {
                    ReportError::XlsxParse(format!("shared string {n_idx} out of range"))
                })?;
                EnumCellValue::String(c_text.clone())
            }
            "inlineStr" => EnumCellValue::String(cell.inline.clone()),
            "str" | "e" => EnumCellValue::String(cell.value.clone()),
            "b" => EnumCellValue::Number(if cell.value.trim() == "1" { 1.0 } else { 0.0 }),
            _ if cell.value.is_empty() => EnumCellValue::None,
            _ => match cell.value.trim().parse::<f64>() {
                Ok(n) => EnumCellValue::Number(n),
                Err(_) => EnumCellValue::String(cell.value.clone()),
            },
        };

        let value = match cell.formula {
            Some(formula) if !formula.is_empty() => EnumCellValue::Formula {
                formula,
                result: cell.value,
            },
            _ => value_plain,
        };
        let format = self
            .l_cell_formats
            .get(cell.style_idx)
            .cloned()
            .unwrap_or_default();

        if value.is_none() && format.is_empty() {
            return Ok(());
        }
        self.doc.set_cell(cell.row, cell.col, SpecCell { value, format })
    }
}

fn parse_worksheet(
    xml: &str,
    sheet_name: String,
    l_shared_strings: &[String],
    l_cell_formats: &[SpecCellFormat],
) -> Result<SheetDocument> {
    let mut parser = WorksheetParser {
        doc: SheetDocument::new(sheet_name),
        l_shared_strings,
        l_cell_formats,
        cell: None,
        text_target: EnumTextTarget::None,
        if_in_inline: false,
        n_row_current: 0,
        n_col_current: 0,
    };
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => parser.open(&e)?,
            Event::Empty(e) => {
                parser.open(&e)?;
                parser.close(e.local_name().as_ref())?;
            }
            Event::Text(t) => {
                let c_text = t.unescape().map_err(convert_xml_error)?;
                parser.text(&c_text);
            }
            Event::End(e) => parser.close(e.local_name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(parser.doc)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecMergeRange;

    #[test]
    fn test_strip_width_padding() {
        assert_eq!(strip_width_padding(20.7109375), 20.0);
        assert_eq!(strip_width_padding(6.7109375), 6.0);
        assert_eq!(strip_width_padding(8.43), 8.43);
    }

    #[test]
    fn test_parse_shared_strings_rich_runs() {
        let xml = r#"<sst><si><t>Name</t></si><si><r><t>A</t></r><r><t xml:space="preserve"> B</t></r></si><si/></sst>"#;
        assert_eq!(
            parse_shared_strings(xml).unwrap(),
            vec!["Name".to_string(), "A B".to_string(), String::new()]
        );
    }

    #[test]
    fn test_round_trip_through_writer() {
        let mut doc = SheetDocument::new("Player Info");
        let fmt = SpecCellFormat {
            font_name: Some("Microsoft YaHei".to_string()),
            bold: Some(true),
            align: Some("center".to_string()),
            valign: Some("vcenter".to_string()),
            bg_color: Some("#FF7777".to_string()),
            top: Some(2),
            left: Some(1),
            num_format: Some("0.00%".to_string()),
            ..Default::default()
        };
        doc.set_cell(
            4,
            2,
            SpecCell {
                value: EnumCellValue::Number(0.08),
                format: fmt.clone(),
            },
        )
        .unwrap();
        doc.set_value(1, 4, EnumCellValue::String("a & <b>".into())).unwrap();
        doc.set_value(
            1,
            5,
            EnumCellValue::Formula {
                formula: "_xlfn.IMAGE(\"https://x/y.png\")".to_string(),
                result: String::new(),
            },
        )
        .unwrap();
        doc.merge(SpecMergeRange::new(4, 2, 8, 2)).unwrap();
        doc.set_row_height(1, 60.0).unwrap();
        doc.set_row_hidden(6, true).unwrap();
        doc.set_col_width(2, 20.0).unwrap();
        doc.set_col_hidden(7, true).unwrap();
        doc.set_freeze(Some(SpecFreezePane { n_rows: 3, n_cols: 3 }));

        let v_bytes = doc.to_xlsx_bytes().unwrap();
        let doc_back = read_document_from_buffer(&v_bytes).unwrap();

        assert_eq!(doc_back.sheet_name(), "Player Info");
        let cell = doc_back.get_cell(4, 2).unwrap();
        assert_eq!(cell.value, EnumCellValue::Number(0.08));
        assert_eq!(cell.format, fmt);
        assert_eq!(
            doc_back.get_value(1, 4),
            &EnumCellValue::String("a & <b>".to_string())
        );
        assert!(matches!(
            doc_back.get_value(1, 5),
            EnumCellValue::Formula { formula, .. } if formula.contains("IMAGE")
        ));
        assert_eq!(doc_back.merges(), &[SpecMergeRange::new(4, 2, 8, 2)]);
        assert_eq!(doc_back.row_dimension(1).and_then(|d| d.height), Some(60.0));
        assert!(doc_back.row_dimension(6).is_some_and(|d| d.hidden));
        assert_eq!(doc_back.col_dimension(2).and_then(|d| d.width), Some(20.0));
        assert!(doc_back.col_dimension(7).is_some_and(|d| d.hidden));
        assert_eq!(doc_back.freeze(), Some(SpecFreezePane { n_rows: 3, n_cols: 3 }));
    }

    #[test]
    fn test_read_rejects_non_zip() {
        assert!(matches!(
            read_document_from_buffer(b"not a workbook"),
            Err(ReportError::Zip(_))
        ));
    }
}
