use std::fs;
use std::path::{Path, PathBuf};

use exia_report::SpecMergeSource;
use exia_report::util::{calculate_worker_limit, compare_names};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::report::{ReportCollect, ReportCollectBuilder};
use crate::spec::{CollectError, SpecCollectOptions};
use crate::util::SpecCollectPatterns;

type TypeReadResult = (PathBuf, Result<Vec<u8>, String>);

/// Collect report buffers from one directory as merge sources.
///
/// Only regular files directly inside `dir_source` are considered (no
/// recursion). File names are matched against the include/exclude lists,
/// ordered by name, then read with a bounded worker pool. A file that
/// cannot be read is recorded in the report and left out.
///
/// Returns [`CollectError`] only for setup failures: a bad pattern, a
/// missing directory or an unreadable listing.
pub fn collect_merge_sources<P>(
    dir_source: P,
    spec_collect_options: &SpecCollectOptions,
) -> Result<(Vec<SpecMergeSource>, ReportCollect), CollectError>
where
    P: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref();
    if !path_dir_src.is_dir() {
        return Err(CollectError::SourceNotDirectory(path_dir_src.to_path_buf()));
    }
    let spec_pats = SpecCollectPatterns::from_raw(
        spec_collect_options.patterns_include_files.as_deref(),
        spec_collect_options.patterns_exclude_files.as_deref(),
        spec_collect_options.rule_pattern,
    )?;

    let iter_entries = fs::read_dir(path_dir_src).map_err(|e| CollectError::ReadDirFailed {
        path: path_dir_src.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut builder_report = ReportCollectBuilder::default();
    let mut l_files: Vec<(String, PathBuf)> = Vec::new();
    for entry_res in iter_entries {
        let entry = match entry_res {
            Ok(v) => v,
            Err(e) => {
                builder_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_dir_src.display()
                ));
                continue;
            }
        };
        let path_entry = entry.path();
        if !path_entry.is_file() {
            continue;
        }
        builder_report.add_scanned();

        let c_name = entry.file_name().to_string_lossy().to_string();
        if spec_pats.should_exclude(&c_name) {
            continue;
        }
        builder_report.add_matched();
        l_files.push((c_name, path_entry));
    }
    l_files.sort_by(|(name_a, _), (name_b, _)| compare_names(name_a, name_b));

    let l_paths: Vec<PathBuf> = l_files.into_iter().map(|(_, path)| path).collect();
    let l_sources = read_source_files(
        l_paths,
        spec_collect_options.num_workers_max,
        &mut builder_report,
    );
    let report = builder_report.build();
    log::debug!("{report}");
    Ok((l_sources, report))
}

/// Read an explicit list of report files as merge sources, keeping input order.
pub fn read_merge_sources(
    l_paths: &[PathBuf],
    num_workers_max: Option<usize>,
) -> (Vec<SpecMergeSource>, ReportCollect) {
    let mut builder_report = ReportCollectBuilder::default();
    for _ in l_paths {
        builder_report.add_scanned();
        builder_report.add_matched();
    }
    let l_sources = read_source_files(l_paths.to_vec(), num_workers_max, &mut builder_report);
    (l_sources, builder_report.build())
}

fn derive_source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_one(path: PathBuf) -> TypeReadResult {
    let res_read = fs::read(&path).map_err(|e| e.to_string());
    (path, res_read)
}

fn read_source_files(
    l_paths: Vec<PathBuf>,
    num_workers_max: Option<usize>,
    builder_report: &mut ReportCollectBuilder,
) -> Vec<SpecMergeSource> {
    if l_paths.is_empty() {
        return Vec::new();
    }
    let n_workers_max = calculate_worker_limit(num_workers_max);

    let l_results: Vec<TypeReadResult> = if n_workers_max <= 1 {
        l_paths.into_iter().map(read_one).collect()
    } else {
        match ThreadPoolBuilder::new().num_threads(n_workers_max).build() {
            Ok(thread_pool) => {
                thread_pool.install(|| l_paths.into_par_iter().map(read_one).collect())
            }
            Err(_) => {
                builder_report.add_warning(format!(
                    "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial read."
                ));
                l_paths.into_iter().map(read_one).collect()
            }
        }
    };

    let mut l_sources = Vec::with_capacity(l_results.len());
    for (path, res_read) in l_results {
        match res_read {
            Ok(bytes) => {
                builder_report.add_read();
                l_sources.push(SpecMergeSource {
                    name: derive_source_name(&path),
                    bytes,
                });
            }
            Err(msg) => builder_report.add_error(path, msg),
        }
    }
    l_sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumCollectPatternMode;

    fn write_bytes(path: &Path, bytes: &[u8]) {
        std::fs::write(path, bytes).expect("write file");
    }

    #[test]
    fn collect_default_filters_and_name_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_bytes(&tmp.path().join("carol.xlsx"), b"c");
        write_bytes(&tmp.path().join("Alice.xlsx"), b"a");
        write_bytes(&tmp.path().join("bob.xlsx"), b"b");
        write_bytes(&tmp.path().join("~$bob.xlsx"), b"lock");
        write_bytes(&tmp.path().join("notes.txt"), b"n");
        std::fs::create_dir(tmp.path().join("nested.xlsx")).expect("mkdir");

        let (l_sources, report) =
            collect_merge_sources(tmp.path(), &SpecCollectOptions::default()).expect("collect");
        let l_names: Vec<&str> = l_sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(l_names, vec!["Alice.xlsx", "bob.xlsx", "carol.xlsx"]);
        assert_eq!(l_sources[0].bytes, b"a");
        assert_eq!(report.cnt_scanned, 5);
        assert_eq!(report.cnt_matched, 3);
        assert_eq!(report.cnt_read, 3);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn collect_with_single_worker_and_regex() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_bytes(&tmp.path().join("acc_2.xlsx"), b"2");
        write_bytes(&tmp.path().join("acc_1.xlsx"), b"1");
        write_bytes(&tmp.path().join("other.xlsx"), b"o");

        let options = SpecCollectOptions {
            patterns_include_files: Some(vec![r"^acc_\d+\.xlsx$".to_string()]),
            patterns_exclude_files: None,
            rule_pattern: EnumCollectPatternMode::Regex,
            num_workers_max: Some(1),
        };
        let (l_sources, _) = collect_merge_sources(tmp.path(), &options).expect("collect");
        let l_names: Vec<&str> = l_sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(l_names, vec!["acc_1.xlsx", "acc_2.xlsx"]);
    }

    #[test]
    fn collect_rejects_missing_directory_and_bad_pattern() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let res = collect_merge_sources(tmp.path().join("missing"), &SpecCollectOptions::default());
        assert!(matches!(res, Err(CollectError::SourceNotDirectory(_))));

        let options = SpecCollectOptions {
            patterns_include_files: Some(vec!["[".to_string()]),
            ..SpecCollectOptions::default()
        };
        let res = collect_merge_sources(tmp.path(), &options);
        assert!(matches!(res, Err(CollectError::InvalidPattern(_))));
    }

    #[test]
    fn read_explicit_paths_records_missing_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_ok = tmp.path().join("b.xlsx");
        write_bytes(&path_ok, b"ok");
        let path_missing = tmp.path().join("a.xlsx");

        let (l_sources, report) = read_merge_sources(&[path_ok, path_missing.clone()], Some(2));
        assert_eq!(l_sources.len(), 1);
        assert_eq!(l_sources[0].name, "b.xlsx");
        assert_eq!(report.cnt_read, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, path_missing);
    }
}
