//! `exia_report` v1:
//! Account report layout, rendering and merge kernel.
//!
//! Module map:
//! - `conf`     : constants and default presets
//! - `spec`     : dataset models, formats, options and reports
//! - `error`    : error taxonomy
//! - `labels`   : bilingual label tables
//! - `ingest`   : JSON dataset ingestion
//! - `score`    : score calculator
//! - `layout`   : layout planner
//! - `style`    : style layers
//! - `avatar`   : avatar resource cache
//! - `document` : in-memory spreadsheet document
//! - `writer`   : document -> xlsx (rust_xlsxwriter)
//! - `reader`   : xlsx -> document (zip + quick-xml)
//! - `render`   : report renderer
//! - `merge`    : report merge engine
//! - `util`     : pure helper functions
pub mod avatar;
pub mod conf;
pub mod document;
pub mod error;
pub mod ingest;
pub mod labels;
pub mod layout;
pub mod merge;
pub mod reader;
pub mod render;
pub mod score;
pub mod spec;
pub mod style;
pub mod util;
pub mod writer;

pub use avatar::{
    JsonFileDirectoryLoader, ResourceDirectoryCache, ResourceDirectoryLoader,
    SpecResourceEntry, StaticDirectoryLoader,
};
pub use document::{SheetDocument, SpecCell};
pub use error::{ReportError, Result};
pub use ingest::{ingest_dataset_json, ingest_dataset_value};
pub use labels::SpecLanguageLabels;
pub use layout::{SpecReportLayout, plan_column_visibility, plan_dataset_layout, plan_report_layout};
pub use merge::{SpecNamedDocument, merge_document_buffers, merge_documents};
pub use render::{render_report, render_reports};
pub use score::{calculate_score, calculate_score_raw, derive_score_tier, is_unowned};
pub use spec::{
    EnumCellValue, EnumElement, EnumItemRarity, EnumLanguage, EnumMergeSortMode, EnumPriority,
    EnumStatKind, SpecCellFormat, SpecCharacterDataset, SpecCharacterEntry, SpecCubeEntry,
    SpecFreezePane, SpecLimitBreak, SpecMergeOptions, SpecMergeRange, SpecMergeReport,
    SpecMergeSource, SpecRenderOptions, SpecRenderReport,
};
pub use util::{compare_names, sanitize_file_stem, sanitize_sheet_name};
pub use writer::{write_document_to_buffer, write_document_to_path};
