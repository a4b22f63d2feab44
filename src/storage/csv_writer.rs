// src/storage/csv_writer.rs
use crate::extractors::optimization::OptimizationTable;
use crate::extractors::trades::{self, DEAL_COLUMNS, ORDER_COLUMNS};
use crate::storage::Destination;
use crate::utils::error::{AppError, StorageError};

/// Input for the CSV serializer; the variant picks the extractor and column set.
#[derive(Debug)]
pub enum CsvSource<'a> {
    /// Decoded report HTML, orders table.
    Orders(&'a str),
    /// Decoded report HTML, deals table.
    Deals(&'a str),
    /// Already extracted optimization passes.
    Optimization(OptimizationTable),
}

impl CsvSource<'_> {
    pub fn shape(&self) -> &'static str {
        match self {
            CsvSource::Orders(_) => "orders",
            CsvSource::Deals(_) => "deals",
            CsvSource::Optimization(_) => "opt",
        }
    }
}

/// Renders rows as CSV with CRLF line ends and minimal quoting. Rows may differ in width.
pub fn render_csv<H, R>(columns: &[H], rows: &[R], include_titles: bool) -> Result<String, StorageError>
where
    H: AsRef<str>,
    R: AsRef<[String]>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .flexible(true)
        .from_writer(Vec::new());

    if include_titles {
        writer.write_record(columns.iter().map(|c| c.as_ref()))?;
    }
    for row in rows {
        writer.write_record(row.as_ref())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| StorageError::SerializationError(e.to_string()))
}

/// Extracts the selected table and writes it as CSV to `destination`.
pub fn write_csv(
    source: CsvSource<'_>,
    include_titles: bool,
    destination: &Destination,
) -> Result<Option<String>, AppError> {
    tracing::debug!("Rendering {} table as CSV (titles: {})", source.shape(), include_titles);

    let rendered = match source {
        CsvSource::Orders(html) => {
            let rows: Vec<Vec<String>> = trades::extract_orders_table(html)?
                .into_iter()
                .map(|order| order.into_row())
                .collect();
            render_csv(&ORDER_COLUMNS, &rows, include_titles)?
        }
        CsvSource::Deals(html) => {
            let rows = trades::extract_deals_table(html)?;
            render_csv(&DEAL_COLUMNS, &rows, include_titles)?
        }
        CsvSource::Optimization(table) => {
            let columns: Vec<String> = table
                .columns
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect();
            let rows: Vec<Vec<String>> = table
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
                .collect();
            render_csv(&columns, &rows, include_titles)?
        }
    };

    Ok(destination.deliver(rendered)?)
}
