//! Shared report specification models.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{C_FONT_NAME_DEFAULT, N_ROWS_HEADER};

////////////////////////////////////////////////////////////////////////////////
// #region DatasetEnums

/// Elemental category used to group characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumElement {
    Electronic,
    Fire,
    Wind,
    Water,
    Iron,
    Utility,
}

impl EnumElement {
    /// Fixed left-to-right placement order of element blocks.
    pub const ORDER: [EnumElement; 6] = [
        EnumElement::Electronic,
        EnumElement::Fire,
        EnumElement::Wind,
        EnumElement::Water,
        EnumElement::Iron,
        EnumElement::Utility,
    ];

    /// Key used by the upstream dataset.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Electronic => "Electronic",
            Self::Fire => "Fire",
            Self::Wind => "Wind",
            Self::Water => "Water",
            Self::Iron => "Iron",
            Self::Utility => "Utility",
        }
    }

    /// Parse an upstream element key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|element| element.key() == key)
    }
}

/// User-assigned priority driving the name cell color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumPriority {
    Black,
    Red,
    Blue,
    Yellow,
    #[default]
    None,
}

impl EnumPriority {
    /// Parse an upstream priority; anything unknown maps to `None`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "black" => Self::Black,
            "red" => Self::Red,
            "blue" => Self::Blue,
            "yellow" => Self::Yellow,
            _ => Self::None,
        }
    }
}

/// Favorite item rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumItemRarity {
    #[default]
    None,
    R,
    SR,
    SSR,
}

impl EnumItemRarity {
    /// Parse an upstream rarity; empty or unknown maps to `None`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "R" => Self::R,
            "SR" => Self::SR,
            "SSR" => Self::SSR,
            _ => Self::None,
        }
    }

    /// Display text; empty for `None`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::R => "R",
            Self::SR => "SR",
            Self::SSR => "SSR",
        }
    }
}

/// Equipment stat kinds, in report column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumStatKind {
    IncElementDmg,
    StatAtk,
    StatAmmoLoad,
    StatChargeTime,
    StatChargeDamage,
    StatCritical,
    StatCriticalDamage,
    StatAccuracyCircle,
    StatDef,
}

impl EnumStatKind {
    /// All stat kinds in column order.
    pub const ORDER: [EnumStatKind; 9] = [
        EnumStatKind::IncElementDmg,
        EnumStatKind::StatAtk,
        EnumStatKind::StatAmmoLoad,
        EnumStatKind::StatChargeTime,
        EnumStatKind::StatChargeDamage,
        EnumStatKind::StatCritical,
        EnumStatKind::StatCriticalDamage,
        EnumStatKind::StatAccuracyCircle,
        EnumStatKind::StatDef,
    ];

    /// Zero-based position among the stat columns.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Upstream `function_type` key (also the visibility key).
    pub fn key(&self) -> &'static str {
        match self {
            Self::IncElementDmg => "IncElementDmg",
            Self::StatAtk => "StatAtk",
            Self::StatAmmoLoad => "StatAmmoLoad",
            Self::StatChargeTime => "StatChargeTime",
            Self::StatChargeDamage => "StatChargeDamage",
            Self::StatCritical => "StatCritical",
            Self::StatCriticalDamage => "StatCriticalDamage",
            Self::StatAccuracyCircle => "StatAccuracyCircle",
            Self::StatDef => "StatDef",
        }
    }

    /// Parse an upstream `function_type`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|kind| kind.key() == key)
    }
}

/// Report language; selects labels, display names and column widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumLanguage {
    #[default]
    En,
    Zh,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DatasetModels

/// Two-stage limit break progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecLimitBreak {
    /// Grade, capped at 3.
    pub grade: u32,
    /// Core level after grade 3; 7 or more is max.
    pub core: u32,
}

/// One equipment effect line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEquipEffect {
    /// Stat kind.
    pub stat: EnumStatKind,
    /// Value in hundredths of a percent.
    pub function_value: i64,
    /// Effect level, 1..=15.
    pub level: u32,
}

impl SpecEquipEffect {
    /// Value as a fraction (`500` -> `0.05`).
    pub fn fraction(&self) -> f64 {
        self.function_value as f64 / 10_000.0
    }
}

/// Per-character column visibility selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecShowStats {
    /// `true` once the user has explicitly configured the selection.
    pub configured: bool,
    /// Selected column keys.
    pub keys: BTreeSet<String>,
}

/// One character of one element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCharacterEntry {
    /// Character id.
    pub id: String,
    /// English display name.
    pub name_en: Option<String>,
    /// Chinese display name.
    pub name_cn: Option<String>,
    /// Priority marker.
    pub priority: EnumPriority,
    /// Limit break; `None` when absent.
    pub limit_break: Option<SpecLimitBreak>,
    pub skill1_level: Option<u32>,
    pub skill2_level: Option<u32>,
    pub burst_level: Option<u32>,
    /// Favorite item rarity.
    pub item_rarity: EnumItemRarity,
    /// Favorite item level.
    pub item_level: Option<u32>,
    /// Effects per slot (head, torso, arm, leg).
    pub equipments: [Vec<SpecEquipEffect>; 4],
    /// Column visibility; `None` keeps every column visible.
    pub show_stats: Option<SpecShowStats>,
    /// Sprite resource id carried by the entry itself.
    pub resource_id: Option<String>,
}

/// One harmony cube.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCubeEntry {
    pub cube_id: String,
    pub name_en: Option<String>,
    pub name_cn: Option<String>,
    /// Cube level; 0 means not found.
    pub level: u32,
}

/// Dataset-level display options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecDatasetOptions {
    /// Show per-slot equipment rows (rows 5-8). `None` defers to
    /// [`SpecRenderOptions::show_equip_details_default`].
    pub show_equip_details: Option<bool>,
}

/// Root dataset for one account.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCharacterDataset {
    pub name: String,
    pub synchro_level: u32,
    pub outpost_level: u32,
    pub normal_progress: String,
    pub hard_progress: String,
    /// Characters by element, in user order. `None` when the source had no map.
    pub elements: Option<BTreeMap<EnumElement, Vec<SpecCharacterEntry>>>,
    pub cubes: Vec<SpecCubeEntry>,
    pub options: SpecDatasetOptions,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification. Every field is optional so formats can be
/// layered with [`SpecCellFormat::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,

    /// Top border style code.
    pub top: Option<i64>,
    /// Bottom border style code.
    pub bottom: Option<i64>,
    /// Left border style code.
    pub left: Option<i64>,
    /// Right border style code.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Solid background fill color (`#RRGGBB`).
    pub bg_color: Option<String>,
    /// Font color (`#RRGGBB`).
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }

    /// `true` when no property is set.
    pub fn is_empty(&self) -> bool {
        *self == SpecCellFormat::default()
    }
}

/// Named presets used while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportFormats {
    /// Centered text.
    pub center: SpecCellFormat,
    /// Centered bold text.
    pub header: SpecCellFormat,
    /// Centered percentage.
    pub percent: SpecCellFormat,
    /// Centered score with two decimals.
    pub score: SpecCellFormat,
}

/// Cell value held by a document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Formula with its cached display result.
    Formula {
        /// Formula text without the leading `=`.
        formula: String,
        /// Cached result.
        result: String,
    },
}

impl EnumCellValue {
    /// `true` for [`EnumCellValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Numeric view of the value; text is parsed, formulas use their result.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Number(n) => Some(*n),
            Self::String(s) => s.trim().parse::<f64>().ok(),
            Self::Formula { result, .. } => result.trim().parse::<f64>().ok(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetGeometry

/// Inclusive merged range, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecMergeRange {
    pub row_start: u32,
    pub col_start: u32,
    pub row_end: u32,
    pub col_end: u32,
}

impl SpecMergeRange {
    /// Build a range, normalizing corner order.
    pub fn new(row_start: u32, col_start: u32, row_end: u32, col_end: u32) -> Self {
        Self {
            row_start: row_start.min(row_end),
            col_start: col_start.min(col_end),
            row_end: row_start.max(row_end),
            col_end: col_start.max(col_end),
        }
    }

    /// `true` when the range covers one cell only.
    pub fn is_single_cell(&self) -> bool {
        self.row_start == self.row_end && self.col_start == self.col_end
    }

    /// `true` when both ranges share at least one cell.
    pub fn overlaps(&self, other: &SpecMergeRange) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

/// Frozen pane split: rows above and columns left of the scrollable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecFreezePane {
    pub n_rows: u32,
    pub n_cols: u32,
}

impl Default for SpecFreezePane {
    fn default() -> Self {
        Self {
            n_rows: 3,
            n_cols: 3,
        }
    }
}

/// Explicit row properties.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpecRowDimension {
    /// Height in points.
    pub height: Option<f64>,
    pub hidden: bool,
}

/// Explicit column properties.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpecColumnDimension {
    /// Width in character units.
    pub width: Option<f64>,
    pub hidden: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Report rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRenderOptions {
    /// Label and display-name language.
    pub language: EnumLanguage,
    /// Font family applied to every written cell.
    pub font_name: String,
    /// Equipment detail visibility when the dataset does not say.
    pub show_equip_details_default: bool,
    /// Worker cap for batch rendering; `None` picks from available cores.
    pub num_workers_max: Option<usize>,
}

impl Default for SpecRenderOptions {
    fn default() -> Self {
        Self {
            language: EnumLanguage::En,
            font_name: C_FONT_NAME_DEFAULT.to_string(),
            show_equip_details_default: true,
            num_workers_max: None,
        }
    }
}

/// Ordering applied to merge sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumMergeSortMode {
    /// Name ascending.
    #[default]
    NameAsc,
    /// Name descending.
    NameDesc,
    /// Synchro level ascending.
    SynchroAsc,
    /// Synchro level descending.
    SynchroDesc,
}

/// Report merge options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeOptions {
    /// Source ordering.
    pub rule_sort: EnumMergeSortMode,
    /// Output sheet name.
    pub sheet_name: String,
    /// First copied row of every source after the first.
    pub row_copy_start_subsequent: u32,
    /// Frozen pane of the output.
    pub freeze: SpecFreezePane,
}

impl Default for SpecMergeOptions {
    fn default() -> Self {
        Self {
            rule_sort: EnumMergeSortMode::NameAsc,
            sheet_name: "Merged".to_string(),
            row_copy_start_subsequent: N_ROWS_HEADER + 1,
            freeze: SpecFreezePane::default(),
        }
    }
}

/// Named report buffer handed to the merge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeSource {
    /// File name used for name ordering and diagnostics.
    pub name: String,
    /// Serialized xlsx document.
    pub bytes: Vec<u8>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-render report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecRenderReport {
    /// Characters whose block was rendered.
    pub cnt_characters: usize,
    /// Characters rendered blank because they are unowned.
    pub cnt_unowned: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecRenderReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

/// Per-merge report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecMergeReport {
    /// Source names in merge order.
    pub sources_merged: Vec<String>,
    /// Sources that could not be parsed.
    pub sources_skipped: Vec<String>,
    /// Output rows written.
    pub cnt_rows_written: u32,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecMergeReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
