// src/extractors/optimization.rs
use roxmltree::{Document, Node};

use crate::utils::error::ExtractError;

/// Namespace of the Office XML spreadsheet format the optimizer exports.
pub const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Optimization passes: column names plus one row per pass, sorted by pass number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizationTable {
    pub columns: Vec<Option<String>>,
    pub rows: Vec<Vec<Option<String>>>,
}

fn is_ss(node: &Node, name: &str) -> bool {
    node.has_tag_name((SPREADSHEET_NS, name))
}

/// Text of each element child's `Data` element. Cells without data are `None`.
fn row_cells(row: Node) -> Vec<Option<String>> {
    row.children()
        .filter(Node::is_element)
        .map(|cell| {
            cell.children()
                .find(|n| is_ss(n, "Data"))
                .and_then(|data| data.text())
                .map(str::to_string)
        })
        .collect()
}

fn pass_number(row: &[Option<String>]) -> Result<f64, ExtractError> {
    let raw = row.first().cloned().flatten().unwrap_or_default();
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ExtractError::malformed("pass", raw))
}

/// Parses an XML spreadsheet export and orders its passes numerically by the first cell.
pub fn extract_optimization_table(xml_content: &str) -> Result<OptimizationTable, ExtractError> {
    let xml_content = xml_content.trim_start_matches('\u{feff}');
    let document = Document::parse(xml_content).map_err(|e| ExtractError::XmlParse(e.to_string()))?;

    let table = document
        .descendants()
        .find(|n| is_ss(n, "Table"))
        .ok_or_else(|| ExtractError::SectionNotFound("ss:Table element".to_string()))?;

    let mut rows = table.children().filter(|n| is_ss(n, "Row")).map(row_cells);
    let columns = rows.next().unwrap_or_default();

    let mut keyed = rows
        .map(|row| pass_number(&row).map(|pass| (pass, row)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    tracing::info!("Extracted {} optimization passes with {} columns", keyed.len(), columns.len());

    Ok(OptimizationTable {
        columns,
        rows: keyed.into_iter().map(|(_, row)| row).collect(),
    })
}
