//! Report renderer.
//!
//! Walks one dataset over its [`SpecReportLayout`] and writes values,
//! merges, style layers, row/column dimensions and the frozen pane into a
//! fresh [`SheetDocument`]. Styles are collected in a [`StylePlan`] and
//! resolved once at the end, after the global font layer.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::avatar::{ResourceDirectoryCache, derive_avatar_cell};
use crate::conf::{
    N_BORDER_MEDIUM, N_BORDER_THIN, N_COL_ACCOUNT_NAME, N_COL_SERIAL, N_COL_SYNCHRO,
    N_COLS_MARGIN_LEFT, N_EQUIP_SLOTS, N_ROW_AVATAR, N_ROW_LABEL, N_ROW_LAST, N_ROW_NAME,
    N_ROW_SLOT_FIRST, N_ROW_TOTAL, N_WIDTH_PER_CHAR, TUP_ROW_HEIGHTS_HEADER,
    derive_default_report_formats, derive_header_column_widths, derive_trailer_column_width,
};
use crate::document::SheetDocument;
use crate::error::{ReportError, Result};
use crate::labels::SpecLanguageLabels;
use crate::layout::{
    N_OFF_ITEM_LEVEL, N_OFF_ITEM_RARITY, N_OFF_SCORE, N_OFF_STAT_FIRST, N_OFF_T10,
    SpecCharacterBlock, SpecReportLayout, TUP_LABEL_KEYS_BLOCK, TUP_LABEL_KEYS_T10_ROWS,
    derive_block_column_width, derive_slot_row, derive_stat_col_offset, plan_column_visibility,
    plan_dataset_layout,
};
use crate::score::{
    calculate_entry_score, derive_equip_sums, derive_item_level_str, derive_limit_break_str,
    derive_score_tier, is_unowned, round2,
};
use crate::spec::{
    EnumCellValue, EnumItemRarity, EnumLanguage, EnumStatKind, SpecCellFormat,
    SpecCharacterDataset, SpecCharacterEntry, SpecFreezePane, SpecRenderOptions,
    SpecRenderReport, SpecReportFormats,
};
use crate::style::{
    EnumBorderSide, StylePlan, derive_element_layer, derive_level_tier_layer,
    derive_priority_layer, derive_score_tier_layer,
};

/// Result of rendering one account.
pub type TypeRenderOutcome = Result<(SheetDocument, SpecRenderReport)>;

/// Render one account report.
///
/// Display names and column widths follow `options.language`; label text
/// comes from `labels`. Fails only when the dataset has no `elements` map
/// or a document primitive is misused.
pub fn render_report(
    dataset: &SpecCharacterDataset,
    labels: &SpecLanguageLabels,
    options: &SpecRenderOptions,
    avatars: &ResourceDirectoryCache,
) -> TypeRenderOutcome {
    let Some(dict_elements) = dataset.elements.as_ref() else {
        return Err(ReportError::MissingElements(dataset.name.clone()));
    };
    let layout = plan_dataset_layout(dict_elements, dataset.cubes.len());

    let mut renderer = ReportRenderer {
        dataset,
        labels,
        options,
        avatars,
        fmts: derive_default_report_formats(),
        doc: SheetDocument::new(labels.get("playerInfo")),
        style: StylePlan::new(),
        report: SpecRenderReport::default(),
    };

    renderer.render_account_header()?;
    for block in &layout.characters {
        let entry = dict_elements
            .get(&block.element)
            .and_then(|l_entries| l_entries.get(block.idx_in_element));
        if let Some(entry) = entry {
            renderer.render_character(block, entry)?;
        }
    }
    renderer.render_cubes(&layout)?;
    renderer.render_others(&layout)?;
    renderer.apply_column_widths(&layout)?;
    renderer.finish()
}

/// Render many accounts in parallel; each account succeeds or fails alone.
pub fn render_reports(
    l_datasets: &[SpecCharacterDataset],
    labels: &SpecLanguageLabels,
    options: &SpecRenderOptions,
    avatars: &ResourceDirectoryCache,
) -> Vec<TypeRenderOutcome> {
    let n_workers_max = crate::util::calculate_worker_limit(options.num_workers_max);
    let render_one = |dataset: &SpecCharacterDataset| {
        let outcome = render_report(dataset, labels, options, avatars);
        if let Err(err) = &outcome {
            log::warn!("Report for `{}` failed: {err}", dataset.name);
        }
        outcome
    };

    if n_workers_max <= 1 || l_datasets.len() <= 1 {
        return l_datasets.iter().map(render_one).collect();
    }

    let Ok(thread_pool) = ThreadPoolBuilder::new().num_threads(n_workers_max).build() else {
        log::warn!(
            "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial render."
        );
        return l_datasets.iter().map(render_one).collect();
    };
    thread_pool.install(|| l_datasets.par_iter().map(render_one).collect())
}

struct ReportRenderer<'a> {
    dataset: &'a SpecCharacterDataset,
    labels: &'a SpecLanguageLabels,
    options: &'a SpecRenderOptions,
    avatars: &'a ResourceDirectoryCache,
    fmts: SpecReportFormats,
    doc: SheetDocument,
    style: StylePlan,
    report: SpecRenderReport,
}

impl ReportRenderer<'_> {
    ////////////////////////////////////////////////////////////////////////////
    // #region Primitives

    fn put(&mut self, row: u32, col: u32, value: EnumCellValue, layer: &SpecCellFormat) -> Result<()> {
        self.doc.set_value(row, col, value)?;
        self.style.push(row, col, layer.clone());
        Ok(())
    }

    fn put_text(&mut self, row: u32, col: u32, text: &str, layer: &SpecCellFormat) -> Result<()> {
        self.put(row, col, EnumCellValue::String(text.to_string()), layer)
    }

    fn put_label(&mut self, row: u32, col: u32, key: &str, layer: &SpecCellFormat) -> Result<()> {
        let c_text = self.labels.get(key).to_string();
        self.put_text(row, col, &c_text, layer)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region AccountHeader

    fn render_account_header(&mut self) -> Result<()> {
        let fmt_header = self.fmts.header.clone();
        let fmt_center = self.fmts.center.clone();

        for (row, height) in TUP_ROW_HEIGHTS_HEADER {
            self.doc.set_row_height(row, height)?;
        }
        let if_show_details = self
            .dataset
            .options
            .show_equip_details
            .unwrap_or(self.options.show_equip_details_default);
        if !if_show_details {
            for row in N_ROW_SLOT_FIRST..=N_ROW_LAST {
                self.doc.set_row_hidden(row, true)?;
            }
        }

        self.doc.merge_cells(N_ROW_AVATAR, N_COL_SERIAL, N_ROW_LABEL, N_COL_ACCOUNT_NAME)?;
        self.doc.merge_cells(N_ROW_AVATAR, N_COL_SYNCHRO, N_ROW_LABEL, N_COL_SYNCHRO)?;
        self.put_label(N_ROW_AVATAR, N_COL_SERIAL, "playerName", &fmt_header)?;
        self.put_label(N_ROW_AVATAR, N_COL_SYNCHRO, "synchro", &fmt_header)?;

        for col in N_COL_SERIAL..=N_COL_SYNCHRO {
            self.doc.merge_cells(N_ROW_TOTAL, col, N_ROW_LAST, col)?;
        }
        self.put(N_ROW_TOTAL, N_COL_SERIAL, EnumCellValue::Number(1.0), &fmt_center)?;
        let c_name = self.dataset.name.clone();
        self.put_text(N_ROW_TOTAL, N_COL_ACCOUNT_NAME, &c_name, &fmt_header)?;
        self.put(
            N_ROW_TOTAL,
            N_COL_SYNCHRO,
            EnumCellValue::Number(f64::from(self.dataset.synchro_level)),
            &fmt_header,
        )?;

        self.style
            .set_outer_border(N_ROW_AVATAR, N_COL_SERIAL, N_ROW_LABEL, N_COL_SYNCHRO, N_BORDER_MEDIUM);
        self.style
            .set_outer_border(N_ROW_TOTAL, N_COL_SERIAL, N_ROW_LAST, N_COL_SYNCHRO, N_BORDER_MEDIUM);
        self.style.set_vertical_border(
            N_ROW_AVATAR,
            N_ROW_LAST,
            N_COL_SYNCHRO,
            N_BORDER_MEDIUM,
            EnumBorderSide::Left,
        );
        Ok(())
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region CharacterBlock

    fn derive_display_name(&self, name_en: Option<&str>, name_cn: Option<&str>, fallback: &str) -> String {
        let name = match self.options.language {
            EnumLanguage::En => name_en,
            EnumLanguage::Zh => name_cn,
        };
        name.filter(|n| !n.is_empty()).unwrap_or(fallback).to_string()
    }

    fn render_character(&mut self, block: &SpecCharacterBlock, entry: &SpecCharacterEntry) -> Result<()> {
        let fmt_center = self.fmts.center.clone();
        let col_start = block.col_start;
        let col_end = block.col_end();

        // Avatar band.
        self.doc.merge_cells(N_ROW_AVATAR, col_start, N_ROW_AVATAR, col_end)?;
        let value_avatar = derive_avatar_cell(entry, self.avatars);
        self.put(N_ROW_AVATAR, col_start, value_avatar, &fmt_center)?;
        if let Some(layer) = derive_element_layer(block.element) {
            self.style
                .push_range(N_ROW_AVATAR, col_start, N_ROW_AVATAR, col_end, &layer);
        }

        // Name band.
        self.doc.merge_cells(N_ROW_NAME, col_start, N_ROW_NAME, col_end)?;
        let c_name = self.derive_display_name(
            entry.name_en.as_deref(),
            entry.name_cn.as_deref(),
            &entry.id,
        );
        if c_name.is_empty() {
            self.report.warn(format!(
                "{} character #{} has neither id nor name.",
                block.element.key(),
                block.idx_in_element + 1
            ));
        }
        self.put_text(N_ROW_NAME, col_start, &c_name, &fmt_center)?;
        if let Some(layer) = derive_priority_layer(entry.priority) {
            self.style.push(N_ROW_NAME, col_start, layer);
        }
        self.style.set_horizontal_border(
            N_ROW_AVATAR,
            col_start,
            col_end,
            N_BORDER_THIN,
            EnumBorderSide::Bottom,
        );

        // Column labels.
        for (n_off, key) in TUP_LABEL_KEYS_BLOCK.iter().enumerate() {
            let Some(key) = key else { continue };
            let col = block.col(n_off as u32);
            if n_off as u32 == N_OFF_ITEM_RARITY {
                self.doc.merge_cells(N_ROW_LABEL, col, N_ROW_LABEL, col + 1)?;
            }
            self.put_label(N_ROW_LABEL, col, key, &fmt_center)?;
        }

        let if_unowned = is_unowned(entry);
        if if_unowned {
            self.report.cnt_unowned += 1;
        } else {
            self.render_base_values(block, entry)?;
        }
        for n_off in 0..=N_OFF_ITEM_LEVEL {
            let col = block.col(n_off);
            self.style.push(N_ROW_TOTAL, col, fmt_center.clone());
            self.doc.merge_cells(N_ROW_TOTAL, col, N_ROW_LAST, col)?;
        }

        // T10 row labels.
        for (n_idx, key) in TUP_LABEL_KEYS_T10_ROWS.iter().enumerate() {
            self.put_label(N_ROW_TOTAL + n_idx as u32, block.col(N_OFF_T10), key, &fmt_center)?;
        }

        self.render_equipment(block, entry, !if_unowned)?;
        self.apply_block_borders(block);

        for (n_off, if_hidden) in plan_column_visibility(entry.show_stats.as_ref()).iter().enumerate() {
            if *if_hidden {
                self.doc.set_col_hidden(block.col(n_off as u32), true)?;
            }
        }

        self.report.cnt_characters += 1;
        Ok(())
    }

    fn render_base_values(&mut self, block: &SpecCharacterBlock, entry: &SpecCharacterEntry) -> Result<()> {
        let fmt_center = self.fmts.center.clone();

        if let Some(lb) = entry.limit_break {
            self.put_text(N_ROW_TOTAL, block.col(0), &derive_limit_break_str(lb), &fmt_center)?;
        }
        let l_skills = [entry.skill1_level, entry.skill2_level, entry.burst_level];
        for (n_idx, level) in l_skills.iter().enumerate() {
            if let Some(level) = level {
                let value = EnumCellValue::Number(f64::from(*level));
                self.put(N_ROW_TOTAL, block.col(1 + n_idx as u32), value, &fmt_center)?;
            }
        }

        // Item columns stay blank without an item so no spurious level 0 shows.
        if entry.item_rarity != EnumItemRarity::None {
            let c_rarity = entry.item_rarity.as_str();
            self.put_text(N_ROW_TOTAL, block.col(N_OFF_ITEM_RARITY), c_rarity, &fmt_center)?;
            if let Some(level) = entry.item_level {
                let value = match entry.item_rarity {
                    EnumItemRarity::SSR => {
                        EnumCellValue::String(derive_item_level_str(entry.item_rarity, Some(level)))
                    }
                    _ => EnumCellValue::Number(f64::from(level)),
                };
                self.put(N_ROW_TOTAL, block.col(N_OFF_ITEM_LEVEL), value, &fmt_center)?;
            }
        }
        Ok(())
    }

    fn render_equipment(&mut self, block: &SpecCharacterBlock, entry: &SpecCharacterEntry, if_owned: bool) -> Result<()> {
        let fmt_center = self.fmts.center.clone();
        let fmt_percent = self.fmts.percent.clone();

        for slot in 0..N_EQUIP_SLOTS as usize {
            let row = derive_slot_row(slot);
            for n_off in N_OFF_STAT_FIRST..N_OFF_SCORE {
                self.style.push(row, block.col(n_off), fmt_center.clone());
            }
            for effect in &entry.equipments[slot] {
                let col = block.col(derive_stat_col_offset(effect.stat));
                self.put(row, col, EnumCellValue::Number(effect.fraction()), &fmt_percent)?;
                self.style.push(row, col, derive_level_tier_layer(effect.level));
            }
        }

        if !if_owned {
            return Ok(());
        }

        let sums = derive_equip_sums(entry);
        for stat in EnumStatKind::ORDER {
            let col = block.col(derive_stat_col_offset(stat));
            self.put(N_ROW_TOTAL, col, EnumCellValue::Number(sums.get(stat)), &fmt_percent)?;
        }

        let n_score = calculate_entry_score(entry.limit_break, &sums);
        let col_score = block.col(N_OFF_SCORE);
        let fmt_score = self.fmts.score.clone();
        self.put(
            N_ROW_TOTAL,
            col_score,
            EnumCellValue::Number(round2(n_score)),
            &fmt_score,
        )?;
        self.doc.merge_cells(N_ROW_TOTAL, col_score, N_ROW_LAST, col_score)?;
        for row in N_ROW_SLOT_FIRST..=N_ROW_LAST {
            self.style.push(row, col_score, fmt_center.clone());
        }
        if let Some(layer) = derive_score_tier_layer(derive_score_tier(n_score)) {
            self.style
                .push_range(N_ROW_TOTAL, col_score, N_ROW_LAST, col_score, &layer);
        }
        Ok(())
    }

    fn apply_block_borders(&mut self, block: &SpecCharacterBlock) {
        let col_start = block.col_start;
        let col_end = block.col_end();

        self.style
            .set_outer_border(N_ROW_AVATAR, col_start, N_ROW_LABEL, col_end, N_BORDER_MEDIUM);
        self.style
            .set_outer_border(N_ROW_TOTAL, col_start, N_ROW_LAST, col_end, N_BORDER_MEDIUM);

        let l_separators = [
            (N_OFF_SCORE, EnumBorderSide::Left),
            (N_OFF_ITEM_RARITY, EnumBorderSide::Left),
            (N_OFF_ITEM_LEVEL, EnumBorderSide::Right),
            (N_OFF_T10, EnumBorderSide::Right),
        ];
        for (n_off, side) in l_separators {
            self.style.set_vertical_border(
                N_ROW_LABEL,
                N_ROW_LAST,
                block.col(n_off),
                N_BORDER_THIN,
                side,
            );
        }
        self.style.set_horizontal_border(
            N_ROW_TOTAL,
            block.col(N_OFF_T10),
            col_end,
            N_BORDER_THIN,
            EnumBorderSide::Bottom,
        );
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Trailer

    fn render_cubes(&mut self, layout: &SpecReportLayout) -> Result<()> {
        if layout.n_cubes == 0 {
            return Ok(());
        }
        let fmt_header = self.fmts.header.clone();
        let fmt_center = self.fmts.center.clone();
        let col_start = layout.col_cube_start;
        let col_end = layout.col_cube(layout.n_cubes - 1);

        self.doc.merge_cells(N_ROW_AVATAR, col_start, N_ROW_AVATAR, col_end)?;
        self.put_label(N_ROW_AVATAR, col_start, "cube", &fmt_header)?;
        self.style
            .set_outer_border(N_ROW_AVATAR, col_start, N_ROW_AVATAR, col_end, N_BORDER_MEDIUM);

        let dataset = self.dataset;
        for (n_idx, cube) in dataset.cubes.iter().enumerate() {
            let col = layout.col_cube(n_idx);
            self.doc.merge_cells(N_ROW_NAME, col, N_ROW_LABEL, col)?;
            let c_name = self.derive_display_name(
                cube.name_en.as_deref(),
                cube.name_cn.as_deref(),
                &cube.cube_id,
            );
            self.put_text(N_ROW_NAME, col, &c_name, &fmt_header)?;
            if n_idx + 1 < layout.n_cubes {
                self.style.set_vertical_border(
                    N_ROW_NAME,
                    N_ROW_LAST,
                    col,
                    N_BORDER_THIN,
                    EnumBorderSide::Right,
                );
            }

            self.doc.merge_cells(N_ROW_TOTAL, col, N_ROW_LAST, col)?;
            if cube.level == 0 {
                self.put_label(N_ROW_TOTAL, col, "notFound", &fmt_center)?;
            } else {
                let value = EnumCellValue::Number(f64::from(cube.level));
                self.put(N_ROW_TOTAL, col, value, &fmt_center)?;
            }
        }

        self.style
            .set_outer_border(N_ROW_NAME, col_start, N_ROW_LABEL, col_end, N_BORDER_MEDIUM);
        self.style
            .set_outer_border(N_ROW_TOTAL, col_start, N_ROW_LAST, col_end, N_BORDER_MEDIUM);
        Ok(())
    }

    fn render_others(&mut self, layout: &SpecReportLayout) -> Result<()> {
        let fmt_header = self.fmts.header.clone();
        let fmt_center = self.fmts.center.clone();

        let l_columns = [
            (
                layout.col_outpost,
                "outpostLevel",
                EnumCellValue::Number(f64::from(self.dataset.outpost_level)),
            ),
            (
                layout.col_normal,
                "normalProgress",
                EnumCellValue::String(self.dataset.normal_progress.clone()),
            ),
            (
                layout.col_hard,
                "hardProgress",
                EnumCellValue::String(self.dataset.hard_progress.clone()),
            ),
        ];
        for (col, key, value) in l_columns {
            self.doc.merge_cells(N_ROW_NAME, col, N_ROW_LABEL, col)?;
            self.put_label(N_ROW_NAME, col, key, &fmt_header)?;
            self.style
                .set_outer_border(N_ROW_NAME, col, N_ROW_LABEL, col, N_BORDER_MEDIUM);

            self.doc.merge_cells(N_ROW_TOTAL, col, N_ROW_LAST, col)?;
            self.put(N_ROW_TOTAL, col, value, &fmt_center)?;
            self.style
                .set_outer_border(N_ROW_TOTAL, col, N_ROW_LAST, col, N_BORDER_MEDIUM);
        }

        self.doc
            .merge_cells(N_ROW_AVATAR, layout.col_outpost, N_ROW_AVATAR, layout.col_hard)?;
        self.put_label(N_ROW_AVATAR, layout.col_outpost, "others", &fmt_header)?;
        self.style.set_outer_border(
            N_ROW_AVATAR,
            layout.col_outpost,
            N_ROW_AVATAR,
            layout.col_hard,
            N_BORDER_MEDIUM,
        );
        Ok(())
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////

    fn apply_column_widths(&mut self, layout: &SpecReportLayout) -> Result<()> {
        let language = self.options.language;
        for (col, width) in derive_header_column_widths(language) {
            self.doc.set_col_width(col, width)?;
        }
        for col in (N_COLS_MARGIN_LEFT + 1)..layout.col_cube_start {
            let n_off = (col - N_COLS_MARGIN_LEFT - 1) % N_WIDTH_PER_CHAR;
            self.doc
                .set_col_width(col, derive_block_column_width(n_off, language))?;
        }
        let n_width_trailer = derive_trailer_column_width(language);
        for col in layout.col_cube_start..=layout.col_last() {
            self.doc.set_col_width(col, n_width_trailer)?;
        }
        Ok(())
    }

    fn finish(mut self) -> TypeRenderOutcome {
        let fmt_font = SpecCellFormat {
            font_name: Some(self.options.font_name.clone()),
            ..Default::default()
        };
        self.style.push_all(&fmt_font);
        for ((row, col), fmt) in self.style.resolve() {
            self.doc.set_format(row, col, fmt)?;
        }
        self.doc.set_freeze(Some(SpecFreezePane::default()));

        for msg in &self.report.warnings {
            log::warn!("{}: {msg}", self.dataset.name);
        }
        log::debug!(
            "Rendered `{}`: {} characters ({} unowned), {} cells.",
            self.dataset.name,
            self.report.cnt_characters,
            self.report.cnt_unowned,
            self.doc.n_cells()
        );
        Ok((self.doc, self.report))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::conf::{C_COLOR_BLACK, C_COLOR_TIER_BLUE};
    use crate::spec::{
        EnumElement, EnumPriority, SpecCubeEntry, SpecEquipEffect, SpecLimitBreak, SpecShowStats,
    };

    fn owned_entry(id: &str) -> SpecCharacterEntry {
        let mut entry = SpecCharacterEntry {
            id: id.to_string(),
            name_en: Some(format!("Char {id}")),
            priority: EnumPriority::Black,
            limit_break: Some(SpecLimitBreak { grade: 3, core: 4 }),
            skill1_level: Some(10),
            skill2_level: Some(7),
            burst_level: Some(4),
            item_rarity: EnumItemRarity::SSR,
            item_level: Some(0),
            ..Default::default()
        };
        entry.equipments[0].push(SpecEquipEffect {
            stat: EnumStatKind::StatAtk,
            function_value: 500,
            level: 15,
        });
        entry.equipments[1].push(SpecEquipEffect {
            stat: EnumStatKind::StatAtk,
            function_value: 300,
            level: 3,
        });
        entry
    }

    fn dataset(l_fire: Vec<SpecCharacterEntry>) -> SpecCharacterDataset {
        SpecCharacterDataset {
            name: "Alice".to_string(),
            synchro_level: 400,
            outpost_level: 80,
            normal_progress: "30-10".to_string(),
            hard_progress: "12-5".to_string(),
            elements: Some(BTreeMap::from([(EnumElement::Fire, l_fire)])),
            cubes: vec![SpecCubeEntry {
                cube_id: "1".to_string(),
                name_en: Some("Assault".to_string()),
                name_cn: None,
                level: 0,
            }],
            ..Default::default()
        }
    }

    fn render(ds: &SpecCharacterDataset) -> (SheetDocument, SpecRenderReport) {
        render_report(
            ds,
            &SpecLanguageLabels::builtin(EnumLanguage::En),
            &SpecRenderOptions::default(),
            &ResourceDirectoryCache::empty(),
        )
        .unwrap()
    }

    #[test]
    fn test_render_owned_character() {
        let (doc, report) = render(&dataset(vec![owned_entry("10")]));
        assert_eq!(report.cnt_characters, 1);
        assert_eq!(report.cnt_unowned, 0);
        assert_eq!(doc.sheet_name(), "Player Info");

        assert_eq!(doc.get_value(4, 1).as_f64(), Some(1.0));
        assert_eq!(doc.get_value(4, 2), &EnumCellValue::String("Alice".into()));
        assert_eq!(doc.get_value(4, 3).as_f64(), Some(400.0));
        assert_eq!(doc.get_value(2, 4), &EnumCellValue::String("Char 10".into()));
        assert_eq!(doc.get_value(3, 8), &EnumCellValue::String("Item".into()));
        assert_eq!(doc.get_value(4, 4), &EnumCellValue::String("+4".into()));
        assert_eq!(doc.get_value(4, 9), &EnumCellValue::String("1★".into()));

        // StatAtk: offset 8 -> col 12; 500 + 300 = 8.00%.
        let n_atk = doc.get_value(4, 12).as_f64().unwrap_or_default();
        assert!((n_atk - 0.08).abs() < 1e-12);
        let cell_atk = doc.get_cell(4, 12).unwrap();
        assert_eq!(cell_atk.format.num_format.as_deref(), Some("0.00%"));
        assert_eq!(cell_atk.format.font_name.as_deref(), Some("Microsoft YaHei"));

        let cell_head = doc.get_cell(5, 12).unwrap();
        assert_eq!(cell_head.format.bg_color.as_deref(), Some(C_COLOR_BLACK));
        assert!((cell_head.value.as_f64().unwrap_or_default() - 0.05).abs() < 1e-12);

        let cell_name = doc.get_cell(2, 4).unwrap();
        assert_eq!(cell_name.format.bg_color.as_deref(), Some(C_COLOR_BLACK));
        assert_eq!(cell_name.format.bold, Some(true));

        // (1 + 0.072) * 1.1 * 1.17 = 1.379664
        assert_eq!(doc.get_value(4, 20).as_f64(), Some(1.38));
        assert!(doc.merges().iter().any(|m| *m == crate::spec::SpecMergeRange::new(4, 20, 8, 20)));

        assert_eq!(doc.get_value(2, 21), &EnumCellValue::String("Assault".into()));
        assert_eq!(doc.get_value(4, 21), &EnumCellValue::String("Not Found".into()));
        assert_eq!(doc.get_value(1, 22), &EnumCellValue::String("Others".into()));
        assert_eq!(doc.get_value(4, 22).as_f64(), Some(80.0));
        assert_eq!(doc.freeze(), Some(SpecFreezePane { n_rows: 3, n_cols: 3 }));
        assert_eq!(doc.col_dimension(20).and_then(|d| d.width), Some(6.0));
    }

    #[test]
    fn test_render_keeps_score_when_one_field_is_malformed() {
        let mut l_warnings = Vec::new();
        let entry = crate::ingest::ingest_character_entry(
            &serde_json::json!({
                "id": "14",
                "name_en": "Char 14",
                "limit_break": {"grade": 3, "core": 4},
                "skill1_level": "high",
                "skill2_level": 7,
                "equipments": {
                    "0": [{"function_type": "StatAtk", "function_value": 500, "level": 15}],
                    "1": [{"function_type": "StatAtk", "function_value": 300, "level": 3}]
                }
            }),
            &mut l_warnings,
        );
        assert_eq!(l_warnings.len(), 1);

        let (doc, report) = render(&dataset(vec![entry]));
        assert_eq!(report.cnt_unowned, 0);
        assert_eq!(doc.get_value(4, 4), &EnumCellValue::String("+4".into()));
        assert!(doc.get_value(4, 5).is_none());
        assert_eq!(doc.get_value(4, 6).as_f64(), Some(7.0));
        assert_eq!(doc.get_value(4, 20).as_f64(), Some(1.38));
    }

    #[test]
    fn test_render_score_tier_from_unrounded_value() {
        let mut entry = SpecCharacterEntry {
            id: "15".to_string(),
            ..Default::default()
        };
        entry.equipments[0].push(SpecEquipEffect {
            stat: EnumStatKind::StatAtk,
            function_value: 21172,
            level: 1,
        });
        let (doc, _) = render(&dataset(vec![entry]));
        let cell_score = doc.get_cell(4, 20).unwrap();
        assert_eq!(cell_score.value.as_f64(), Some(3.2));
        assert_eq!(cell_score.format.bg_color.as_deref(), Some(C_COLOR_TIER_BLUE));
    }

    #[test]
    fn test_render_unowned_character_is_blank() {
        let entry = SpecCharacterEntry {
            id: "11".to_string(),
            name_en: Some("Idle".to_string()),
            ..Default::default()
        };
        let (doc, report) = render(&dataset(vec![entry]));
        assert_eq!(report.cnt_unowned, 1);

        for col in 4..=20 {
            let c_label = (col - 4) as usize;
            if c_label == N_OFF_T10 as usize {
                continue;
            }
            assert!(doc.get_value(4, col).is_none(), "col {col} should be blank");
        }
        assert!(doc.get_cell(4, 20).is_some_and(|c| c.format.bg_color.is_none()));
        assert!(!doc.merges().iter().any(|m| m.col_start == 20 && m.row_start == 4));
    }

    #[test]
    fn test_render_hides_configured_empty_block() {
        let mut entry = owned_entry("12");
        entry.show_stats = Some(SpecShowStats {
            configured: true,
            keys: BTreeSet::new(),
        });
        let mut ds = dataset(vec![entry]);
        ds.options.show_equip_details = Some(false);

        let (doc, _) = render(&ds);
        for col in 4..=20 {
            assert!(doc.col_dimension(col).is_some_and(|d| d.hidden));
        }
        assert!(!doc.col_dimension(21).is_some_and(|d| d.hidden));
        assert!(doc.row_dimension(5).is_some_and(|d| d.hidden));
    }

    #[test]
    fn test_render_is_deterministic() {
        let ds = dataset(vec![owned_entry("10"), owned_entry("13")]);
        let (doc_a, _) = render(&ds);
        let (doc_b, _) = render(&ds);
        assert_eq!(doc_a, doc_b);
    }

    #[test]
    fn test_render_without_elements_fails() {
        let ds = SpecCharacterDataset {
            name: "Nobody".to_string(),
            ..Default::default()
        };
        let res = render_report(
            &ds,
            &SpecLanguageLabels::builtin(EnumLanguage::Zh),
            &SpecRenderOptions::default(),
            &ResourceDirectoryCache::empty(),
        );
        assert!(matches!(res, Err(ReportError::MissingElements(_))));
    }

    #[test]
    fn test_render_reports_isolates_failures() {
        let l_datasets = vec![
            dataset(vec![owned_entry("10")]),
            SpecCharacterDataset::default(),
            dataset(vec![]),
        ];
        let l_outcomes = render_reports(
            &l_datasets,
            &SpecLanguageLabels::builtin(EnumLanguage::En),
            &SpecRenderOptions {
                num_workers_max: Some(2),
                ..Default::default()
            },
            &ResourceDirectoryCache::empty(),
        );
        assert_eq!(l_outcomes.len(), 3);
        assert!(l_outcomes[0].is_ok());
        assert!(l_outcomes[1].is_err());
        assert!(l_outcomes[2].is_ok());
    }
}
