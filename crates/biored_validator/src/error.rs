//! Validator error types
//!
//! Structural problems stop the pipeline and surface here. Content problems
//! never do: they become findings in the report.

use biored_schema::UnknownTemplateError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn uploaded bytes into a table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Malformed spreadsheet: {reason}")]
    MalformedFile { reason: String },

    #[error("Spreadsheet has a header row but no data rows")]
    EmptyFile,
}

impl LoadError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        LoadError::MalformedFile {
            reason: reason.into(),
        }
    }
}

/// Any error that prevents a report from being produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error(transparent)]
    UnknownTemplate(#[from] UnknownTemplateError),

    #[error("Malformed spreadsheet: {reason}")]
    MalformedFile { reason: String },

    #[error("Spreadsheet has a header row but no data rows")]
    EmptyFile,
}

impl From<LoadError> for ValidationError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::MalformedFile { reason } => ValidationError::MalformedFile { reason },
            LoadError::EmptyFile => ValidationError::EmptyFile,
        }
    }
}

impl ValidationError {
    /// Stable kind name, used in batch summaries and JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::UnknownTemplate(_) => "UnknownTemplateError",
            ValidationError::MalformedFile { .. } => "MalformedFileError",
            ValidationError::EmptyFile => "EmptyFileError",
        }
    }

    /// One actionable sentence for the partner who uploaded the file.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::UnknownTemplate(_) => {
                "The template identifier was not recognised; use one of the nine BIO-RED templates (for example 4_Funding_Sources)."
            }
            ValidationError::MalformedFile { .. } => {
                "The file could not be read as an Excel workbook; save it as .xlsx from the original template and upload it again."
            }
            ValidationError::EmptyFile => {
                "The worksheet has column headers but no data; add at least one row below the header and upload it again."
            }
        }
    }
}

/// Failure to load a validator configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid config value for {key}: {message}")]
    OutOfRange { key: &'static str, message: String },
}
