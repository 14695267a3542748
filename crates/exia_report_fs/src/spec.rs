//! Collection options and top-level error types.

use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCollectPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    #[default]
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Default include pattern: finished report workbooks.
pub const C_PATTERN_INCLUDE_DEFAULT: &str = "*.xlsx";
/// Default exclude pattern: office lock files.
pub const C_PATTERN_EXCLUDE_DEFAULT: &str = "~$*";

/// Input options for `collect_merge_sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCollectOptions {
    /// Include patterns applied to file basename; `None` keeps every file.
    pub patterns_include_files: Option<Vec<String>>,
    /// Exclude patterns applied to file basename.
    pub patterns_exclude_files: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumCollectPatternMode,
    /// Maximum worker threads for the read stage.
    pub num_workers_max: Option<usize>,
}

impl Default for SpecCollectOptions {
    fn default() -> Self {
        Self {
            patterns_include_files: Some(vec![C_PATTERN_INCLUDE_DEFAULT.to_string()]),
            patterns_exclude_files: Some(vec![C_PATTERN_EXCLUDE_DEFAULT.to_string()]),
            rule_pattern: EnumCollectPatternMode::Glob,
            num_workers_max: None,
        }
    }
}

/// One unreadable file with its error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCollectError {
    pub path: PathBuf,
    pub exception: String,
}

/// Setup failures that abort a collection run.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// Invalid include/exclude pattern.
    #[error("Invalid pattern in include/exclude: {0}")]
    InvalidPattern(String),
    /// Input path is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Directory listing failed.
    #[error("Failed to read directory {}: {message}", path.display())]
    ReadDirFailed { path: PathBuf, message: String },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
