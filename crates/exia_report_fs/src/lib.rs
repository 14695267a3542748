//! `exia_report_fs` v1:
//! Collects finished report workbooks from disk as merge sources.
//!
//! - `collect` : directory scan and parallel read
//! - `spec`    : enums/options/errors
//! - `report`  : run-time report model
//! - `util`    : pattern matching helpers

pub mod collect;
pub mod report;
pub mod spec;
mod util;

pub use collect::{collect_merge_sources, read_merge_sources};
pub use report::{ReportCollect, ReportCollectBuilder};
pub use spec::{
    C_PATTERN_EXCLUDE_DEFAULT, C_PATTERN_INCLUDE_DEFAULT, CollectError, EnumCollectPatternMode,
    SpecCollectError, SpecCollectOptions,
};
