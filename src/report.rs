// src/report.rs
//! Entry point: validates the requested type, loads the input and routes it
//! to the matching extractor and serializer.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::extractors::optimization;
use crate::storage::{self, CsvSource, Destination};
use crate::utils::encoding::decode_utf16le;
use crate::utils::error::AppError;
use crate::utils::html_debug;

/// What to pull out of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Orders,
    Deals,
    Header,
    Optimization,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Orders => "orders",
            ReportKind::Deals => "deals",
            ReportKind::Header => "header",
            ReportKind::Optimization => "opt",
        }
    }

    /// Strategy Tester HTML (UTF-16LE) as opposed to the optimizer's XML spreadsheet.
    pub fn reads_html(self) -> bool {
        !matches!(self, ReportKind::Optimization)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orders" => Ok(ReportKind::Orders),
            "deals" => Ok(ReportKind::Deals),
            "header" => Ok(ReportKind::Header),
            "opt" => Ok(ReportKind::Optimization),
            other => Err(AppError::UnsupportedType(other.to_string())),
        }
    }
}

/// Output settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Emit the CSV column header row. Ignored for JSON output.
    pub include_titles: bool,
    pub destination: Destination,
    /// Also write an annotated copy of the decoded HTML here.
    pub debug_html: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            include_titles: false,
            destination: Destination::Buffer,
            debug_html: None,
        }
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>, AppError> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::InputNotFound(path.to_path_buf()),
        _ => AppError::Io(e),
    })
}

/// Reads a Strategy Tester HTML report and decodes it from UTF-16LE.
pub fn read_report(path: &Path) -> Result<String, AppError> {
    let bytes = read_input(path)?;
    tracing::info!("Read {} bytes from {}", bytes.len(), path.display());
    decode_utf16le(&bytes)
}

/// Reads an optimizer XML spreadsheet as UTF-8.
pub fn read_spreadsheet(path: &Path) -> Result<String, AppError> {
    let bytes = read_input(path)?;
    tracing::info!("Read {} bytes from {}", bytes.len(), path.display());
    String::from_utf8(bytes).map_err(|e| AppError::Decode(e.to_string()))
}

/// Runs one extraction.
///
/// `kind` is checked before the input is touched, so a missing or unknown
/// type never reads or writes anything. Returns the rendered text when the
/// destination is [`Destination::Buffer`].
pub fn run(input: &Path, kind: Option<&str>, options: &RunOptions) -> Result<Option<String>, AppError> {
    let kind: ReportKind = kind.ok_or(AppError::MissingType)?.parse()?;
    tracing::info!("Extracting {} from {}", kind, input.display());

    let titles = options.include_titles;
    let destination = &options.destination;
    match kind {
        ReportKind::Orders => {
            let html = load_html(input, options)?;
            storage::write_csv(CsvSource::Orders(&html), titles, destination)
        }
        ReportKind::Deals => {
            let html = load_html(input, options)?;
            storage::write_csv(CsvSource::Deals(&html), titles, destination)
        }
        ReportKind::Header => {
            let html = load_html(input, options)?;
            storage::write_json(&html, destination)
        }
        ReportKind::Optimization => {
            let xml = read_spreadsheet(input)?;
            let table = optimization::extract_optimization_table(&xml)?;
            storage::write_csv(CsvSource::Optimization(table), titles, destination)
        }
    }
}

fn load_html(input: &Path, options: &RunOptions) -> Result<String, AppError> {
    let html = read_report(input)?;
    if let Some(debug_path) = &options.debug_html {
        if let Err(e) = html_debug::annotate_report(&html, debug_path) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        }
    }
    Ok(html)
}
