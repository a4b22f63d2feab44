// src/storage/json_writer.rs
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::extractors::header::{self, HeaderRecord};
use crate::storage::Destination;
use crate::utils::error::{AppError, StorageError};

const JSON_INDENT: &[u8] = b"    ";

/// Renders the header record as JSON indented by four spaces.
pub fn render_json(record: &HeaderRecord) -> Result<String, StorageError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(JSON_INDENT));
    record
        .serialize(&mut serializer)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| StorageError::SerializationError(e.to_string()))
}

/// Extracts the summary table and writes it as JSON to `destination`.
pub fn write_json(html_content: &str, destination: &Destination) -> Result<Option<String>, AppError> {
    let record = header::extract_header_table(html_content)?;
    let rendered = render_json(&record)?;
    Ok(destination.deliver(rendered)?)
}
