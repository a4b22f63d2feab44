// src/storage/mod.rs
pub mod csv_writer;
pub mod json_writer;

use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::error::StorageError;

pub use csv_writer::{render_csv, write_csv, CsvSource};
pub use json_writer::{render_json, write_json};

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Written to this path; nothing is returned.
    File(PathBuf),
    /// Returned to the caller as text.
    Buffer,
}

impl Destination {
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Destination::File(path.as_ref().to_path_buf())
    }

    /// Hands over fully rendered output. Returns the text for `Buffer`.
    pub fn deliver(&self, rendered: String) -> Result<Option<String>, StorageError> {
        match self {
            Destination::Buffer => Ok(Some(rendered)),
            Destination::File(path) => {
                // Create the parent directory if it doesn't exist
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    if !parent.exists() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::write(path, rendered)?;
                tracing::info!("Saved output to {}", path.display());
                Ok(None)
            }
        }
    }
}
