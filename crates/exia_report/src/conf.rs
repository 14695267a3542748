//! Report constants and default preset factories.

use crate::spec::{EnumElement, EnumLanguage, SpecCellFormat, SpecReportFormats};

/// Excel maximum number of rows per worksheet.
pub const N_NROWS_EXCEL_MAX: u32 = 1_048_576;
/// Excel maximum number of columns per worksheet.
pub const N_NCOLS_EXCEL_MAX: u32 = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

////////////////////////////////////////////////////////////////////////////////
// #region GridGeometry

/// Columns occupied by one character block.
pub const N_WIDTH_PER_CHAR: u32 = 17;
/// Columns reserved on the left for serial / name / synchro.
pub const N_COLS_MARGIN_LEFT: u32 = 3;
/// Column holding the serial number.
pub const N_COL_SERIAL: u32 = 1;
/// Column holding the account name.
pub const N_COL_ACCOUNT_NAME: u32 = 2;
/// Column holding the synchro level (also the merge sort key column).
pub const N_COL_SYNCHRO: u32 = 3;

/// Avatar / element-color band.
pub const N_ROW_AVATAR: u32 = 1;
/// Character name band.
pub const N_ROW_NAME: u32 = 2;
/// Per-column stat label band.
pub const N_ROW_LABEL: u32 = 3;
/// Aggregate ("total") row; also the per-account data row.
pub const N_ROW_TOTAL: u32 = 4;
/// First per-slot equipment detail row.
pub const N_ROW_SLOT_FIRST: u32 = 5;
/// Last row of a rendered account.
pub const N_ROW_LAST: u32 = 8;
/// Equipment slots per character (head / torso / arm / leg).
pub const N_EQUIP_SLOTS: u32 = 4;
/// Header rows skipped for every merged document after the first.
pub const N_ROWS_HEADER: u32 = 3;

/// Row heights applied to the header band.
pub const TUP_ROW_HEIGHTS_HEADER: [(u32, f64); 3] = [(1, 60.0), (2, 25.0), (3, 25.0)];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Styling

/// Thin border style code.
pub const N_BORDER_THIN: i64 = 1;
/// Medium border style code.
pub const N_BORDER_MEDIUM: i64 = 2;

/// Font family applied to every written cell.
pub const C_FONT_NAME_DEFAULT: &str = "Microsoft YaHei";

/// Number format for percentage stats.
pub const C_NUM_FMT_PERCENT: &str = "0.00%";
/// Number format for the score column.
pub const C_NUM_FMT_SCORE: &str = "0.00";

pub const C_COLOR_BLACK: &str = "#000000";
pub const C_COLOR_WHITE: &str = "#FFFFFF";
pub const C_COLOR_TIER_RED: &str = "#FF7777";
pub const C_COLOR_TIER_YELLOW: &str = "#FFFF77";
pub const C_COLOR_TIER_BLUE: &str = "#77AAFF";
pub const C_COLOR_PRIORITY_BLUE: &str = "#99CCFF";
pub const C_COLOR_PRIORITY_YELLOW: &str = "#FFFF88";

/// Score thresholds, highest first.
pub const N_SCORE_TIER_BLACK: f64 = 3.2;
pub const N_SCORE_TIER_BLUE: f64 = 2.7;
pub const N_SCORE_TIER_YELLOW: f64 = 2.2;

/// Avatar band fill per element. `Utility` has none.
pub fn derive_element_fill(element: EnumElement) -> Option<&'static str> {
    match element {
        EnumElement::Electronic => Some("#FF00FF"),
        EnumElement::Wind => Some("#00FF16"),
        EnumElement::Fire => Some("#FF0000"),
        EnumElement::Water => Some("#007EFF"),
        EnumElement::Iron => Some("#FF9201"),
        EnumElement::Utility => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidths

/// Widths of the serial / name / synchro columns.
pub fn derive_header_column_widths(language: EnumLanguage) -> [(u32, f64); 3] {
    match language {
        EnumLanguage::En => [(1, 5.0), (2, 20.0), (3, 11.0)],
        EnumLanguage::Zh => [(1, 5.0), (2, 20.0), (3, 8.0)],
    }
}

/// Width of cube / outpost / progress columns.
pub fn derive_trailer_column_width(language: EnumLanguage) -> f64 {
    match language {
        EnumLanguage::En => 19.0,
        EnumLanguage::Zh => 14.0,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region AvatarResources

/// Sprite URL prefix; the padded resource id and suffix are appended.
pub const C_AVATAR_URL_PREFIX: &str =
    "https://raw.githubusercontent.com/Nikke-db/Nikke-db.github.io/main/images/sprite/si_c";
/// Sprite URL suffix.
pub const C_AVATAR_URL_SUFFIX: &str = "_00_s.png";

// #endregion
////////////////////////////////////////////////////////////////////////////////

/// Build format presets used by the renderer.
pub fn derive_default_report_formats() -> SpecReportFormats {
    let cfg_base_fmt_spec = SpecCellFormat {
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    SpecReportFormats {
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        }),
        percent: cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FMT_PERCENT.to_string()),
            ..Default::default()
        }),
        score: cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FMT_SCORE.to_string()),
            ..Default::default()
        }),
        center: cfg_base_fmt_spec,
    }
}
