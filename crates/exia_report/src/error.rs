//! Error taxonomy of the report engine.
//!
//! Only fatal conditions become a [`ReportError`]. Malformed entries, broken
//! merge sources and bad sort keys are recovered and recorded as warnings on
//! the per-call report instead.

/// Fatal errors raised by rendering, merging and the xlsx codec.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Dataset has no `elements` map.
    #[error("Dataset `{0}` has no `elements` map.")]
    MissingElements(String),

    /// Dataset JSON could not be decoded at the top level.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Label table is empty or misses required keys.
    #[error("Invalid label table: {0}")]
    InvalidLabels(String),

    /// Document primitive misuse (bad coordinates, overlapping merge).
    #[error("Document error: {0}")]
    Document(String),

    /// Invalid A1 cell or range reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// Nothing to merge.
    #[error("No mergeable source documents.")]
    NoSources,

    /// xlsx serialization failure.
    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed xlsx package content.
    #[error("XLSX parse error: {0}")]
    XlsxParse(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;
