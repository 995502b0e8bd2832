use plotters::drawing::DrawingAreaErrorKind;
use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathwayError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("No file or folder path given. {} is not a valid path.", .0.display())]
    InvalidPath(PathBuf),

    #[error("No enrichment files (Enrich*.txt) found under {}", .0.display())]
    NoEnrichmentFiles(PathBuf),

    #[error("Missing column '{column}' in {}", .file.display())]
    MissingColumn { column: String, file: PathBuf },

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{count} pathway gene(s) not found in the gene table, e.g. {examples}")]
    UnmatchedGenes { count: usize, examples: String },

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Plot error: {0}")]
    Plot(String),
}

/// Type alias for Result with PathwayError
pub type Result<T> = std::result::Result<T, PathwayError>;

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PathwayError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        PathwayError::Plot(err.to_string())
    }
}

impl PathwayError {
    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        PathwayError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Create a new MissingColumn error
    pub fn missing_column(column: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        PathwayError::MissingColumn {
            column: column.into(),
            file: file.into(),
        }
    }
}
