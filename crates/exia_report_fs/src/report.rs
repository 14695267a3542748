//! Collection report model and its mutable builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecCollectError;

/// Counters and diagnostics of one collection run.
#[derive(Debug, Default, Clone)]
pub struct ReportCollect {
    /// Regular files listed in the directory (or passed explicitly).
    pub cnt_scanned: u64,
    /// Files that passed the include/exclude filters.
    pub cnt_matched: u64,
    /// Files read into merge sources.
    pub cnt_read: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
    /// Per-file read failures.
    pub errors: Vec<SpecCollectError>,
}

impl ReportCollect {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        BTreeMap::from([
            ("cnt_scanned".to_string(), self.cnt_scanned),
            ("cnt_matched".to_string(), self.cnt_matched),
            ("cnt_read".to_string(), self.cnt_read),
            ("cnt_errors".to_string(), self.error_count() as u64),
            ("cnt_warnings".to_string(), self.warning_count() as u64),
        ])
    }

    /// One-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} matched={} read={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_matched,
            self.cnt_read,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportCollect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[COLLECT]"))
    }
}

/// Mutable accumulator for [`ReportCollect`].
#[derive(Debug, Default, Clone)]
pub struct ReportCollectBuilder {
    report: ReportCollect,
}

impl ReportCollectBuilder {
    pub fn add_scanned(&mut self) {
        self.report.cnt_scanned += 1;
    }

    pub fn add_matched(&mut self) {
        self.report.cnt_matched += 1;
    }

    pub fn add_read(&mut self) {
        self.report.cnt_read += 1;
    }

    pub fn add_warning(&mut self, warning: String) {
        log::warn!("{warning}");
        self.report.warnings.push(warning);
    }

    /// Record one unreadable file.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        log::warn!("Failed to read {}: {exception}", path.display());
        self.report.errors.push(SpecCollectError { path, exception });
    }

    pub fn build(self) -> ReportCollect {
        self.report
    }
}
