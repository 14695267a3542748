//! Layout planner: pure coordinate math over the dataset shape.
//!
//! Coordinates are 1-based `(row, col)`, matching the document model.

use std::collections::BTreeMap;

use crate::conf::{N_COLS_MARGIN_LEFT, N_ROW_SLOT_FIRST, N_WIDTH_PER_CHAR};
use crate::spec::{
    EnumElement, EnumLanguage, EnumStatKind, SpecCharacterEntry, SpecShowStats,
};

////////////////////////////////////////////////////////////////////////////////
// #region BlockOffsets

pub const N_OFF_LIMIT_BREAK: u32 = 0;
pub const N_OFF_SKILL1: u32 = 1;
pub const N_OFF_SKILL2: u32 = 2;
pub const N_OFF_BURST: u32 = 3;
pub const N_OFF_ITEM_RARITY: u32 = 4;
pub const N_OFF_ITEM_LEVEL: u32 = 5;
pub const N_OFF_T10: u32 = 6;
pub const N_OFF_STAT_FIRST: u32 = 7;
pub const N_OFF_SCORE: u32 = 16;

/// Visibility key per base column offset (limit break, skills).
pub const TUP_KEYS_BASE: [&str; 4] = [
    "limit_break",
    "skill1_level",
    "skill2_level",
    "skill_burst_level",
];
/// Visibility key of the score column.
pub const C_KEY_SCORE: &str = "AtkElemLbScore";

/// Label key per block column offset; `None` for the item-level column,
/// which shares the merged item label.
pub const TUP_LABEL_KEYS_BLOCK: [Option<&str>; N_WIDTH_PER_CHAR as usize] = [
    Some("limitBreak"),
    Some("skill1"),
    Some("skill2"),
    Some("burst"),
    Some("item"),
    None,
    Some("t10"),
    Some("elementAdvantage"),
    Some("attack"),
    Some("ammo"),
    Some("chargeSpeed"),
    Some("chargeDamage"),
    Some("critical"),
    Some("criticalDamage"),
    Some("hit"),
    Some("defense"),
    Some("atkElemLbScore"),
];

/// Label keys of the T10 column, rows 4-8.
pub const TUP_LABEL_KEYS_T10_ROWS: [&str; 5] = ["total", "head", "torso", "arm", "leg"];

/// Column offset of a stat inside a character block.
pub fn derive_stat_col_offset(stat: EnumStatKind) -> u32 {
    N_OFF_STAT_FIRST + stat.index() as u32
}

/// Row of an equipment slot (0 = head).
pub fn derive_slot_row(slot: usize) -> u32 {
    N_ROW_SLOT_FIRST + slot as u32
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportLayout

/// Placement of one character block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCharacterBlock {
    pub element: EnumElement,
    /// Position inside its element.
    pub idx_in_element: usize,
    /// First column of the block.
    pub col_start: u32,
}

impl SpecCharacterBlock {
    /// Last column of the block.
    pub fn col_end(&self) -> u32 {
        self.col_start + N_WIDTH_PER_CHAR - 1
    }

    /// Absolute column of a block offset.
    pub fn col(&self, offset: u32) -> u32 {
        self.col_start + offset
    }
}

/// Placement of one non-empty element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecElementBlock {
    pub element: EnumElement,
    pub col_start: u32,
    pub n_chars: usize,
}

/// Full coordinate plan of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportLayout {
    pub elements: Vec<SpecElementBlock>,
    pub characters: Vec<SpecCharacterBlock>,
    /// First cube column; also where the trailer starts.
    pub col_cube_start: u32,
    pub n_cubes: usize,
    pub col_outpost: u32,
    pub col_normal: u32,
    pub col_hard: u32,
}

impl SpecReportLayout {
    /// Last used column.
    pub fn col_last(&self) -> u32 {
        self.col_hard
    }

    /// Column of the `idx`-th cube.
    pub fn col_cube(&self, idx: usize) -> u32 {
        self.col_cube_start + idx as u32
    }
}

/// Plan every block from per-element character counts and the cube count.
///
/// Elements are placed in [`EnumElement::ORDER`]; empty elements take no
/// columns.
pub fn plan_report_layout(
    dict_counts: &BTreeMap<EnumElement, usize>,
    n_cubes: usize,
) -> SpecReportLayout {
    let mut l_elements = Vec::new();
    let mut l_characters = Vec::new();
    let mut n_col_cursor = N_COLS_MARGIN_LEFT + 1;

    for element in EnumElement::ORDER {
        let n_chars = dict_counts.get(&element).copied().unwrap_or(0);
        if n_chars == 0 {
            continue;
        }
        l_elements.push(SpecElementBlock {
            element,
            col_start: n_col_cursor,
            n_chars,
        });
        for idx_in_element in 0..n_chars {
            l_characters.push(SpecCharacterBlock {
                element,
                idx_in_element,
                col_start: n_col_cursor + idx_in_element as u32 * N_WIDTH_PER_CHAR,
            });
        }
        n_col_cursor += n_chars as u32 * N_WIDTH_PER_CHAR;
    }

    let col_outpost = n_col_cursor + n_cubes as u32;
    SpecReportLayout {
        elements: l_elements,
        characters: l_characters,
        col_cube_start: n_col_cursor,
        n_cubes,
        col_outpost,
        col_normal: col_outpost + 1,
        col_hard: col_outpost + 2,
    }
}

/// Plan a report from the element map of a dataset.
pub fn plan_dataset_layout(
    elements: &BTreeMap<EnumElement, Vec<SpecCharacterEntry>>,
    n_cubes: usize,
) -> SpecReportLayout {
    let dict_counts = elements
        .iter()
        .map(|(element, l_entries)| (*element, l_entries.len()))
        .collect();
    plan_report_layout(&dict_counts, n_cubes)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnVisibility

/// Hidden flag per block column offset.
///
/// `None` keeps every column visible. A configured selection with no keys
/// hides the whole block.
pub fn plan_column_visibility(show_stats: Option<&SpecShowStats>) -> [bool; N_WIDTH_PER_CHAR as usize] {
    let mut l_hidden = [false; N_WIDTH_PER_CHAR as usize];
    let Some(show_stats) = show_stats else {
        return l_hidden;
    };
    if show_stats.configured && show_stats.keys.is_empty() {
        return [true; N_WIDTH_PER_CHAR as usize];
    }

    let mut set_effective = show_stats.keys.clone();
    if !show_stats.configured {
        set_effective.extend(TUP_KEYS_BASE.iter().map(|k| (*k).to_string()));
    }

    let if_any_base = TUP_KEYS_BASE.iter().any(|k| set_effective.contains(*k));
    for (n_off, c_key) in TUP_KEYS_BASE.iter().enumerate() {
        l_hidden[n_off] = if_any_base && !set_effective.contains(*c_key);
    }

    let if_any_stat = EnumStatKind::ORDER
        .iter()
        .any(|stat| set_effective.contains(stat.key()));
    l_hidden[N_OFF_T10 as usize] = !if_any_stat;
    for stat in EnumStatKind::ORDER {
        l_hidden[derive_stat_col_offset(stat) as usize] = !set_effective.contains(stat.key());
    }

    l_hidden[N_OFF_SCORE as usize] = !set_effective.contains(C_KEY_SCORE);
    l_hidden
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidths

/// Width of a character block column by offset.
pub fn derive_block_column_width(offset: u32, language: EnumLanguage) -> f64 {
    if offset == N_OFF_SCORE {
        return 6.0;
    }
    match language {
        EnumLanguage::En if offset < N_OFF_STAT_FIRST => 6.0,
        EnumLanguage::En => 10.0,
        EnumLanguage::Zh if offset < N_OFF_T10 => 6.0,
        EnumLanguage::Zh if offset == N_OFF_T10 => 5.0,
        EnumLanguage::Zh => 10.0,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn show_stats(configured: bool, keys: &[&str]) -> SpecShowStats {
        SpecShowStats {
            configured,
            keys: keys.iter().map(|k| k.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_layout_skips_empty_elements_and_places_trailer() {
        let dict_counts = BTreeMap::from([
            (EnumElement::Water, 1),
            (EnumElement::Electronic, 2),
            (EnumElement::Fire, 0),
        ]);
        let layout = plan_report_layout(&dict_counts, 3);

        assert_eq!(layout.elements.len(), 2);
        assert_eq!(layout.elements[0].element, EnumElement::Electronic);
        assert_eq!(layout.elements[0].col_start, 4);
        assert_eq!(layout.elements[1].element, EnumElement::Water);
        assert_eq!(layout.elements[1].col_start, 4 + 2 * 17);

        let l_starts: Vec<u32> = layout.characters.iter().map(|b| b.col_start).collect();
        assert_eq!(l_starts, vec![4, 21, 38]);
        assert_eq!(layout.characters[2].col_end(), 54);

        assert_eq!(layout.col_cube_start, 55);
        assert_eq!(layout.col_outpost, 58);
        assert_eq!(layout.col_hard, 60);
    }

    #[test]
    fn test_layout_without_characters_or_cubes() {
        let layout = plan_report_layout(&BTreeMap::new(), 0);
        assert!(layout.characters.is_empty());
        assert_eq!(layout.col_cube_start, 4);
        assert_eq!(layout.col_outpost, 4);
        assert_eq!(layout.col_last(), 6);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let dict_counts = BTreeMap::from([(EnumElement::Iron, 4), (EnumElement::Wind, 1)]);
        assert_eq!(
            plan_report_layout(&dict_counts, 2),
            plan_report_layout(&dict_counts, 2)
        );
    }

    #[test]
    fn test_visibility_legacy_keeps_base_columns() {
        let l_hidden = plan_column_visibility(Some(&show_stats(false, &["StatAtk"])));
        assert!(l_hidden[..4].iter().all(|h| !h));
        assert!(!l_hidden[N_OFF_T10 as usize]);
        assert!(!l_hidden[derive_stat_col_offset(EnumStatKind::StatAtk) as usize]);
        assert!(l_hidden[derive_stat_col_offset(EnumStatKind::StatDef) as usize]);
        assert!(l_hidden[N_OFF_SCORE as usize]);
        assert!(!l_hidden[N_OFF_ITEM_RARITY as usize]);
    }

    #[test]
    fn test_visibility_configured_empty_hides_block() {
        let l_hidden = plan_column_visibility(Some(&show_stats(true, &[])));
        assert!(l_hidden.iter().all(|h| *h));
        assert!(plan_column_visibility(None).iter().all(|h| !h));
    }

    #[test]
    fn test_visibility_configured_partial_selection() {
        let l_hidden =
            plan_column_visibility(Some(&show_stats(true, &["skill1_level", "AtkElemLbScore"])));
        assert!(l_hidden[N_OFF_LIMIT_BREAK as usize]);
        assert!(!l_hidden[N_OFF_SKILL1 as usize]);
        assert!(l_hidden[N_OFF_BURST as usize]);
        assert!(l_hidden[N_OFF_T10 as usize]);
        assert!(!l_hidden[N_OFF_SCORE as usize]);
        assert!(!l_hidden[N_OFF_ITEM_LEVEL as usize]);
    }

    #[test]
    fn test_block_column_widths() {
        assert_eq!(derive_block_column_width(N_OFF_SCORE, EnumLanguage::Zh), 6.0);
        assert_eq!(derive_block_column_width(N_OFF_T10, EnumLanguage::En), 6.0);
        assert_eq!(derive_block_column_width(N_OFF_T10, EnumLanguage::Zh), 5.0);
        assert_eq!(derive_block_column_width(N_OFF_STAT_FIRST, EnumLanguage::En), 10.0);
    }
}
