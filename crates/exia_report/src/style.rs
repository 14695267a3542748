//! Style layers.
//!
//! Each cell collects an ordered list of partial formats while rendering
//! (element fill, priority override, level tier, borders, font). The list is
//! resolved once per cell with [`SpecCellFormat::merge`], last layer wins.

use std::collections::BTreeMap;

use crate::conf::{
    C_COLOR_BLACK, C_COLOR_PRIORITY_BLUE, C_COLOR_PRIORITY_YELLOW, C_COLOR_TIER_BLUE,
    C_COLOR_TIER_RED, C_COLOR_TIER_YELLOW, C_COLOR_WHITE, derive_element_fill,
};
use crate::score::EnumScoreTier;
use crate::spec::{EnumElement, EnumPriority, SpecCellFormat};

/// Cell edge addressed by a border layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumBorderSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Ordered partial formats of one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecStyleLayers {
    l_layers: Vec<SpecCellFormat>,
}

impl SpecStyleLayers {
    pub fn push(&mut self, layer: SpecCellFormat) {
        self.l_layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.l_layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.l_layers.is_empty()
    }

    /// Fold all layers in push order.
    pub fn resolve(&self) -> SpecCellFormat {
        self.l_layers
            .iter()
            .fold(SpecCellFormat::default(), |acc, layer| acc.merge(layer))
    }
}

/// Style layers of a whole sheet, keyed by 1-based `(row, col)`.
#[derive(Debug, Clone, Default)]
pub struct StylePlan {
    dict_cells: BTreeMap<(u32, u32), SpecStyleLayers>,
}

impl StylePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer to one cell.
    pub fn push(&mut self, row: u32, col: u32, layer: SpecCellFormat) {
        self.dict_cells.entry((row, col)).or_default().push(layer);
    }

    /// Add the same layer to every cell of an inclusive range.
    pub fn push_range(
        &mut self,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
        layer: &SpecCellFormat,
    ) {
        for row in row_start..=row_end {
            for col in col_start..=col_end {
                self.push(row, col, layer.clone());
            }
        }
    }

    /// Add a layer to every cell already present in the plan.
    pub fn push_all(&mut self, layer: &SpecCellFormat) {
        for layers in self.dict_cells.values_mut() {
            layers.push(layer.clone());
        }
    }

    /// Frame an inclusive range with `code` on its four outer edges.
    pub fn set_outer_border(
        &mut self,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
        code: i64,
    ) {
        self.set_horizontal_border(row_start, col_start, col_end, code, EnumBorderSide::Top);
        self.set_horizontal_border(row_end, col_start, col_end, code, EnumBorderSide::Bottom);
        self.set_vertical_border(row_start, row_end, col_start, code, EnumBorderSide::Left);
        self.set_vertical_border(row_start, row_end, col_end, code, EnumBorderSide::Right);
    }

    /// Set one edge on a vertical run of cells.
    pub fn set_vertical_border(
        &mut self,
        row_start: u32,
        row_end: u32,
        col: u32,
        code: i64,
        side: EnumBorderSide,
    ) {
        for row in row_start..=row_end {
            self.push(row, col, derive_border_layer(side, code));
        }
    }

    /// Set one edge on a horizontal run of cells.
    pub fn set_horizontal_border(
        &mut self,
        row: u32,
        col_start: u32,
        col_end: u32,
        code: i64,
        side: EnumBorderSide,
    ) {
        for col in col_start..=col_end {
            self.push(row, col, derive_border_layer(side, code));
        }
    }

    /// Resolve every cell once.
    pub fn resolve(&self) -> impl Iterator<Item = ((u32, u32), SpecCellFormat)> + '_ {
        self.dict_cells
            .iter()
            .map(|(pos, layers)| (*pos, layers.resolve()))
    }

    /// Layers of one cell, if any.
    pub fn get(&self, row: u32, col: u32) -> Option<&SpecStyleLayers> {
        self.dict_cells.get(&(row, col))
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region LayerFactories

/// Single-edge border layer.
pub fn derive_border_layer(side: EnumBorderSide, code: i64) -> SpecCellFormat {
    let mut fmt = SpecCellFormat::default();
    match side {
        EnumBorderSide::Top => fmt.top = Some(code),
        EnumBorderSide::Bottom => fmt.bottom = Some(code),
        EnumBorderSide::Left => fmt.left = Some(code),
        EnumBorderSide::Right => fmt.right = Some(code),
    }
    fmt
}

fn derive_fill_layer(bg_color: &str, font_color: Option<&str>, bold: Option<bool>) -> SpecCellFormat {
    SpecCellFormat {
        bg_color: Some(bg_color.to_string()),
        font_color: font_color.map(str::to_string),
        bold,
        ..Default::default()
    }
}

/// Avatar band fill of an element.
pub fn derive_element_layer(element: EnumElement) -> Option<SpecCellFormat> {
    derive_element_fill(element).map(|c_color| derive_fill_layer(c_color, None, None))
}

/// Name cell override of a priority.
pub fn derive_priority_layer(priority: EnumPriority) -> Option<SpecCellFormat> {
    match priority {
        EnumPriority::Black => Some(derive_fill_layer(C_COLOR_BLACK, Some(C_COLOR_WHITE), Some(true))),
        EnumPriority::Red => Some(derive_fill_layer(C_COLOR_TIER_RED, Some(C_COLOR_WHITE), Some(true))),
        EnumPriority::Blue => Some(derive_fill_layer(C_COLOR_PRIORITY_BLUE, None, Some(true))),
        EnumPriority::Yellow => Some(derive_fill_layer(C_COLOR_PRIORITY_YELLOW, None, Some(true))),
        EnumPriority::None => None,
    }
}

/// Equipment effect fill by level; levels outside 1..=15 only reset the font color.
pub fn derive_level_tier_layer(level: u32) -> SpecCellFormat {
    let c_fill = match level {
        1..=5 => Some(C_COLOR_TIER_RED),
        6..=10 => Some(C_COLOR_TIER_YELLOW),
        11..=14 => Some(C_COLOR_TIER_BLUE),
        15 => Some(C_COLOR_BLACK),
        _ => None,
    };
    let c_font = if level == 15 { C_COLOR_WHITE } else { C_COLOR_BLACK };
    SpecCellFormat {
        bg_color: c_fill.map(str::to_string),
        font_color: Some(c_font.to_string()),
        ..Default::default()
    }
}

/// Score cell fill.
pub fn derive_score_tier_layer(tier: EnumScoreTier) -> Option<SpecCellFormat> {
    match tier {
        EnumScoreTier::Black => Some(derive_fill_layer(C_COLOR_BLACK, Some(C_COLOR_WHITE), None)),
        EnumScoreTier::Blue => Some(derive_fill_layer(C_COLOR_TIER_BLUE, None, None)),
        EnumScoreTier::Yellow => Some(derive_fill_layer(C_COLOR_TIER_YELLOW, None, None)),
        EnumScoreTier::Red => Some(derive_fill_layer(C_COLOR_TIER_RED, None, None)),
        EnumScoreTier::None => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{N_BORDER_MEDIUM, N_BORDER_THIN};

    #[test]
    fn test_last_layer_wins() {
        let mut plan = StylePlan::new();
        plan.push(2, 4, derive_element_layer(EnumElement::Fire).unwrap_or_default());
        plan.push(2, 4, derive_priority_layer(EnumPriority::Blue).unwrap_or_default());
        plan.push(
            2,
            4,
            SpecCellFormat {
                font_name: Some("Arial".to_string()),
                ..Default::default()
            },
        );

        let l_resolved: Vec<_> = plan.resolve().collect();
        assert_eq!(l_resolved.len(), 1);
        let (pos, fmt) = &l_resolved[0];
        assert_eq!(*pos, (2, 4));
        assert_eq!(fmt.bg_color.as_deref(), Some(C_COLOR_PRIORITY_BLUE));
        assert_eq!(fmt.bold, Some(true));
        assert_eq!(fmt.font_name.as_deref(), Some("Arial"));
    }

    #[test]
    fn test_borders_accumulate_per_edge() {
        let mut plan = StylePlan::new();
        plan.set_outer_border(1, 4, 3, 20, N_BORDER_MEDIUM);
        plan.set_horizontal_border(1, 4, 20, N_BORDER_THIN, EnumBorderSide::Bottom);

        let fmt_corner = plan.get(1, 4).map(SpecStyleLayers::resolve).unwrap_or_default();
        assert_eq!(fmt_corner.top, Some(N_BORDER_MEDIUM));
        assert_eq!(fmt_corner.left, Some(N_BORDER_MEDIUM));
        assert_eq!(fmt_corner.bottom, Some(N_BORDER_THIN));
        assert_eq!(fmt_corner.right, None);

        let fmt_bottom_right = plan.get(3, 20).map(SpecStyleLayers::resolve).unwrap_or_default();
        assert_eq!(fmt_bottom_right.bottom, Some(N_BORDER_MEDIUM));
        assert_eq!(fmt_bottom_right.right, Some(N_BORDER_MEDIUM));
        assert!(plan.get(2, 10).is_none());
    }

    #[test]
    fn test_level_tiers() {
        assert_eq!(derive_level_tier_layer(3).bg_color.as_deref(), Some(C_COLOR_TIER_RED));
        assert_eq!(derive_level_tier_layer(10).bg_color.as_deref(), Some(C_COLOR_TIER_YELLOW));
        assert_eq!(derive_level_tier_layer(11).bg_color.as_deref(), Some(C_COLOR_TIER_BLUE));
        let fmt_max = derive_level_tier_layer(15);
        assert_eq!(fmt_max.bg_color.as_deref(), Some(C_COLOR_BLACK));
        assert_eq!(fmt_max.font_color.as_deref(), Some(C_COLOR_WHITE));
        assert_eq!(derive_level_tier_layer(0).bg_color, None);
        assert_eq!(derive_level_tier_layer(16).bg_color, None);
    }
}
