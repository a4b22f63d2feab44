// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

// Errors raised while pulling records out of a decoded report
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Could not parse {field}! Passed: \"{raw}\"")]
    MalformedField { field: String, raw: String },

    #[error("Row for {field} has no cell at index {index}")]
    MissingCell { field: String, index: usize },

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("XML parsing error: {0}")]
    XmlParse(String),
}

impl ExtractError {
    pub fn malformed(field: impl Into<String>, raw: impl Into<String>) -> Self {
        ExtractError::MalformedField {
            field: field.into(),
            raw: raw.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("--type parameter must be set!")]
    MissingType,

    #[error("Incorrect type passed: \"{0}\". Allowed value: \"orders\" OR \"deals\" OR \"header\" OR \"opt\".")]
    UnsupportedType(String),

    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Could not decode input: {0}")]
    Decode(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// Process exit code the binary reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::MissingType | AppError::UnsupportedType(_) => 2,
            AppError::InputNotFound(_) => 3,
            _ => 1,
        }
    }
}
