//! Report merge engine.
//!
//! Appends finished report documents into one sheet. The first source keeps
//! its header rows; later sources start at their data row. Merged ranges are
//! translated by the row offset of each source, and the serial column gets a
//! running account counter.

use crate::conf::{N_COL_SERIAL, N_COL_SYNCHRO, N_ROW_TOTAL};
use crate::document::SheetDocument;
use crate::error::{ReportError, Result};
use crate::spec::{
    EnumCellValue, EnumMergeSortMode, SpecMergeOptions, SpecMergeReport, SpecMergeSource,
};
use crate::util::{compare_names, convert_range_to_a1, shift_range_rows};

/// A parsed source awaiting merge.
#[derive(Debug, Clone)]
pub struct SpecNamedDocument {
    pub name: String,
    pub doc: SheetDocument,
}

/// Synchro level sort key read from the data row; 0 when missing or not numeric.
pub fn derive_synchro_sort_key(doc: &SheetDocument) -> f64 {
    doc.get_value(N_ROW_TOTAL, N_COL_SYNCHRO)
        .as_f64()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Order sources in place. The sort is stable, so ties keep input order.
pub fn sort_merge_sources(l_sources: &mut [SpecNamedDocument], rule_sort: EnumMergeSortMode) {
    match rule_sort {
        EnumMergeSortMode::NameAsc => l_sources.sort_by(|a, b| compare_names(&a.name, &b.name)),
        EnumMergeSortMode::NameDesc => l_sources.sort_by(|a, b| compare_names(&b.name, &a.name)),
        EnumMergeSortMode::SynchroAsc => l_sources.sort_by(|a, b| {
            let key_a = derive_synchro_sort_key(&a.doc);
            key_a.total_cmp(&derive_synchro_sort_key(&b.doc))
        }),
        EnumMergeSortMode::SynchroDesc => l_sources.sort_by(|a, b| {
            let key_b = derive_synchro_sort_key(&b.doc);
            key_b.total_cmp(&derive_synchro_sort_key(&a.doc))
        }),
    }
}

/// Merge parsed documents into one sheet.
///
/// Fails with [`ReportError::NoSources`] when `l_sources` is empty.
pub fn merge_documents(
    l_sources: Vec<SpecNamedDocument>,
    options: &SpecMergeOptions,
) -> Result<(SheetDocument, SpecMergeReport)> {
    merge_sorted(l_sources, options, SpecMergeReport::default())
}

/// Parse xlsx buffers and merge them.
///
/// Unparseable buffers are skipped and recorded on the report.
pub fn merge_document_buffers(
    l_sources: Vec<SpecMergeSource>,
    options: &SpecMergeOptions,
) -> Result<(SheetDocument, SpecMergeReport)> {
    let mut report = SpecMergeReport::default();
    let mut l_parsed = Vec::with_capacity(l_sources.len());

    for source in l_sources {
        match SheetDocument::from_xlsx_bytes(&source.bytes) {
            Ok(doc) => l_parsed.push(SpecNamedDocument {
                name: source.name,
                doc,
            }),
            Err(err) => {
                log::warn!("Skipping merge source `{}`: {err}", source.name);
                report.warn(format!("Skipped `{}`: {err}", source.name));
                report.sources_skipped.push(source.name);
            }
        }
    }
    merge_sorted(l_parsed, options, report)
}

fn merge_sorted(
    mut l_sources: Vec<SpecNamedDocument>,
    options: &SpecMergeOptions,
    mut report: SpecMergeReport,
) -> Result<(SheetDocument, SpecMergeReport)> {
    if l_sources.is_empty() {
        return Err(ReportError::NoSources);
    }
    sort_merge_sources(&mut l_sources, options.rule_sort);

    let mut doc_out = SheetDocument::new(options.sheet_name.as_str());
    doc_out.set_freeze(Some(options.freeze));

    let n_cols_expected = l_sources[0].doc.col_count();
    for (col, dim) in l_sources[0].doc.col_dimensions() {
        doc_out.set_col_dimension(col, *dim)?;
    }

    let mut row_write: u32 = 1;
    let mut n_serial: u32 = 1;
    for (idx, source) in l_sources.iter().enumerate() {
        let SpecNamedDocument { name, doc } = source;
        log::debug!("Merging {}/{}: `{name}`", idx + 1, l_sources.len());

        if doc.col_count() != n_cols_expected {
            report.warn(format!(
                "`{name}` spans {} columns, first source spans {n_cols_expected}; merged as is.",
                doc.col_count()
            ));
        }

        let row_copy_start = if idx == 0 {
            1
        } else {
            options.row_copy_start_subsequent
        };
        let row_out_start = row_write;

        for row in row_copy_start..=doc.row_count() {
            let dim = doc.row_dimension(row).copied();
            let if_has_cells = doc.cells_in_row(row).next().is_some();
            let if_has_height = dim.is_some_and(|d| d.height.is_some());
            if !if_has_cells && !if_has_height {
                continue;
            }

            if let Some(dim) = dim {
                doc_out.set_row_dimension(row_write, dim)?;
            }
            for (col, cell) in doc.cells_in_row(row) {
                doc_out.set_cell(row_write, col, cell.clone())?;
            }
            if row == N_ROW_TOTAL {
                doc_out.set_value(row_write, N_COL_SERIAL, EnumCellValue::Number(f64::from(n_serial)))?;
                n_serial += 1;
            }
            row_write += 1;
        }

        let n_offset = i64::from(row_out_start) - i64::from(row_copy_start);
        for range in doc.merges().iter().filter(|m| m.row_start >= row_copy_start) {
            let Some(shifted) = shift_range_rows(range, n_offset) else {
                report.warn(format!(
                    "`{name}`: merge {} falls outside the sheet after shifting.",
                    convert_range_to_a1(range)
                ));
                continue;
            };
            if let Err(err) = doc_out.merge(shifted) {
                report.warn(format!("`{name}`: dropped merge. {err}"));
            }
        }

        report.sources_merged.push(name.clone());
    }
    report.cnt_rows_written = row_write - 1;

    for msg in &report.warnings {
        log::warn!("{msg}");
    }
    log::info!(
        "Merged {} sources ({} skipped) into {} rows.",
        report.sources_merged.len(),
        report.sources_skipped.len(),
        report.cnt_rows_written
    );
    Ok((doc_out, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{SpecFreezePane, SpecMergeRange};

    /// Eight populated rows: header band, data row, four slot rows.
    fn report_doc(name: &str, synchro: f64) -> SheetDocument {
        let mut doc = SheetDocument::new("Player Info");
        doc.set_value(1, 1, EnumCellValue::String("Player".into())).unwrap();
        doc.merge_cells(1, 1, 3, 2).unwrap();
        doc.set_row_height(1, 60.0).unwrap();
        doc.set_value(4, 1, EnumCellValue::Number(1.0)).unwrap();
        doc.set_value(4, 2, EnumCellValue::String(name.into())).unwrap();
        doc.set_value(4, 3, EnumCellValue::Number(synchro)).unwrap();
        for col in 1..=3 {
            doc.merge_cells(4, col, 8, col).unwrap();
        }
        for (row, c_label) in [(2, "Name"), (3, "T10"), (5, "head"), (6, "torso"), (7, "arm"), (8, "leg")] {
            doc.set_value(row, 4, EnumCellValue::String(c_label.into())).unwrap();
        }
        doc.set_col_width(2, 20.0).unwrap();
        doc
    }

    fn named(name: &str, synchro: f64) -> SpecNamedDocument {
        SpecNamedDocument {
            name: format!("{name}.xlsx"),
            doc: report_doc(name, synchro),
        }
    }

    fn names_in_output(doc: &SheetDocument) -> Vec<String> {
        doc.cells()
            .filter(|((_, col), _)| *col == 2)
            .filter_map(|(_, cell)| match &cell.value {
                EnumCellValue::String(s) if s != "Player" => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_merge_orders_by_name_and_numbers_serials() {
        let l_sources = vec![named("carol", 100.0), named("Alice", 300.0), named("bob", 200.0)];
        let (doc, report) = merge_documents(l_sources, &SpecMergeOptions::default()).unwrap();

        assert_eq!(report.sources_merged, vec!["Alice.xlsx", "bob.xlsx", "carol.xlsx"]);
        assert_eq!(names_in_output(&doc), vec!["Alice", "bob", "carol"]);
        assert_eq!(doc.get_value(4, 1).as_f64(), Some(1.0));
        assert_eq!(doc.get_value(9, 1).as_f64(), Some(2.0));
        assert_eq!(doc.get_value(14, 1).as_f64(), Some(3.0));
        assert_eq!(report.cnt_rows_written, 18);
        assert!(report.warnings.is_empty());
        assert_eq!(doc.sheet_name(), "Merged");
        assert_eq!(doc.freeze(), Some(SpecFreezePane { n_rows: 3, n_cols: 3 }));
        assert_eq!(doc.col_dimension(2).and_then(|d| d.width), Some(20.0));
        assert_eq!(doc.row_dimension(1).and_then(|d| d.height), Some(60.0));
    }

    #[test]
    fn test_merge_translates_ranges_by_row_offset() {
        let l_sources = vec![named("a", 0.0), named("b", 0.0)];
        let (doc, _) = merge_documents(l_sources, &SpecMergeOptions::default()).unwrap();

        // Second source copies its row 4 into output row 9.
        assert!(doc.merges().contains(&SpecMergeRange::new(9, 2, 13, 2)));
        assert!(doc.merges().contains(&SpecMergeRange::new(4, 2, 8, 2)));
        // Header merge of the second source is not copied.
        assert_eq!(doc.merges().iter().filter(|m| m.row_start == 1).count(), 1);
        assert_eq!(doc.merges().len(), 7);
    }

    #[test]
    fn test_merge_skips_empty_rows_without_height() {
        let mut doc_sparse = SheetDocument::new("Player Info");
        doc_sparse
            .set_value(1, 1, EnumCellValue::String("Player".into()))
            .unwrap();
        doc_sparse.set_row_height(2, 25.0).unwrap();
        doc_sparse
            .set_value(4, 2, EnumCellValue::String("solo".into()))
            .unwrap();
        let l_sources = vec![SpecNamedDocument {
            name: "solo.xlsx".to_string(),
            doc: doc_sparse,
        }];

        let (doc, report) = merge_documents(l_sources, &SpecMergeOptions::default()).unwrap();
        assert_eq!(report.cnt_rows_written, 3);
        assert_eq!(doc.row_dimension(2).and_then(|d| d.height), Some(25.0));
        assert_eq!(doc.get_value(3, 1).as_f64(), Some(1.0));
        assert_eq!(doc.get_value(3, 2), &EnumCellValue::String("solo".into()));
    }

    #[test]
    fn test_merge_sorts_by_synchro_with_missing_keys_as_zero() {
        let mut doc_missing = report_doc("nokey", 0.0);
        doc_missing
            .set_value(4, 3, EnumCellValue::String("n/a".into()))
            .unwrap();
        let l_sources = vec![
            named("mid", 200.0),
            SpecNamedDocument {
                name: "nokey.xlsx".to_string(),
                doc: doc_missing,
            },
            named("high", 500.0),
        ];

        let options_desc = SpecMergeOptions {
            rule_sort: EnumMergeSortMode::SynchroDesc,
            ..Default::default()
        };
        let (_, report) = merge_documents(l_sources.clone(), &options_desc).unwrap();
        assert_eq!(report.sources_merged, vec!["high.xlsx", "mid.xlsx", "nokey.xlsx"]);

        let options_asc = SpecMergeOptions {
            rule_sort: EnumMergeSortMode::SynchroAsc,
            ..Default::default()
        };
        let (_, report) = merge_documents(l_sources, &options_asc).unwrap();
        assert_eq!(report.sources_merged, vec!["nokey.xlsx", "mid.xlsx", "high.xlsx"]);
    }

    #[test]
    fn test_merge_name_desc() {
        let l_sources = vec![named("a", 0.0), named("c", 0.0), named("B", 0.0)];
        let options = SpecMergeOptions {
            rule_sort: EnumMergeSortMode::NameDesc,
            ..Default::default()
        };
        let (_, report) = merge_documents(l_sources, &options).unwrap();
        assert_eq!(report.sources_merged, vec!["c.xlsx", "B.xlsx", "a.xlsx"]);
    }

    #[test]
    fn test_merge_skips_broken_buffers() {
        let l_sources = vec![
            SpecMergeSource {
                name: "broken.xlsx".to_string(),
                bytes: b"not a zip".to_vec(),
            },
            SpecMergeSource {
                name: "ok.xlsx".to_string(),
                bytes: report_doc("ok", 1.0).to_xlsx_bytes().unwrap(),
            },
        ];
        let (doc, report) = merge_document_buffers(l_sources, &SpecMergeOptions::default()).unwrap();
        assert_eq!(report.sources_skipped, vec!["broken.xlsx"]);
        assert_eq!(report.sources_merged, vec!["ok.xlsx"]);
        assert_eq!(doc.get_value(4, 2), &EnumCellValue::String("ok".into()));
    }

    #[test]
    fn test_merge_without_sources_fails() {
        let res = merge_documents(Vec::new(), &SpecMergeOptions::default());
        assert!(matches!(res, Err(ReportError::NoSources)));

        let l_sources = vec![SpecMergeSource {
            name: "broken.xlsx".to_string(),
            bytes: Vec::new(),
        }];
        let res = merge_document_buffers(l_sources, &SpecMergeOptions::default());
        assert!(matches!(res, Err(ReportError::NoSources)));
    }

    #[test]
    fn test_merge_warns_on_column_extent_mismatch() {
        let mut doc_wide = report_doc("wide", 0.0);
        doc_wide
            .set_value(4, 40, EnumCellValue::Number(1.0))
            .unwrap();
        let l_sources = vec![
            named("a", 0.0),
            SpecNamedDocument {
                name: "wide.xlsx".to_string(),
                doc: doc_wide,
            },
        ];
        let (doc, report) = merge_documents(l_sources, &SpecMergeOptions::default()).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.sources_merged.len(), 2);
        assert_eq!(doc.get_value(9, 40).as_f64(), Some(1.0));
    }
}
