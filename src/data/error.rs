use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure to produce a [`ListingTable`](super::model::ListingTable).
///
/// Nothing can be rendered without data, so the dashboard shows this in
/// place of every chart.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("unreadable arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("data row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        /// 1-based, the first row after the header being row 1.
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Non-fatal: the current criteria select no listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no listings match the current filters")]
pub struct EmptyResultWarning;
