// src/extractors/trades.rs
//! Orders and Deals tables of a Strategy Tester report.
//!
//! Both tables share one layout: a bold section title, a column header row
//! ending in a bold "Comment" cell, then data rows painted with two
//! alternating background colors, closed by a bare `<tr>` spacer. The data
//! rows are captured as raw markup between the header row and the spacer,
//! then parsed on their own.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::utils::error::ExtractError;

pub const ORDER_COLUMNS: [&str; 12] = [
    "Open Time", "Order", "Symbol", "Type", "Volume 1", "Volume 2", "Price",
    "Stop / Loss", "Take / Profit", "Time", "State", "Comment",
];

pub const DEAL_COLUMNS: [&str; 13] = [
    "Time", "Deal", "Symbol", "Type", "Direction", "Volume", "Price", "Order",
    "Commission", "Swap", "Profit", "Balance", "Comment",
];

/// Raw cells an orders row must carry.
const ORDER_RAW_CELLS: usize = 11;
const VOLUME_SEPARATOR: &str = " / ";

static ORDERS_SECTION_RE: Lazy<Regex> = Lazy::new(|| section_regex("Orders"));
static DEALS_SECTION_RE: Lazy<Regex> = Lazy::new(|| section_regex("Deals"));

// The two colors data rows alternate between
static DATA_ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r##"tr[bgcolor="#FFFFFF"], tr[bgcolor="#F7F7F7"]"##)
        .expect("Failed to compile DATA_ROW_SELECTOR")
});
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to compile CELL_SELECTOR"));

fn section_regex(marker: &str) -> Regex {
    Regex::new(&format!(r"(?s){}<.*?Comment</b>.*?</td>.*?</tr>(.*?)<tr>", marker))
        .expect("Failed to compile section regex")
}

/// One row of the orders table, in output column order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub open_time: String,
    pub order: String,
    pub symbol: String,
    pub order_type: String,
    pub volume_1: String,
    pub volume_2: String,
    pub price: String,
    pub stop_loss: String,
    pub take_profit: String,
    pub time: String,
    pub state: String,
    pub comment: String,
}

impl OrderRecord {
    /// Projects the 11 raw cells of a data row into the 12 output columns.
    ///
    /// Raw cell 4 packs two volumes as `a / b`. Only the first segment is
    /// used, and it fills both volume columns.
    pub fn from_cells(cells: &[String]) -> Result<Self, ExtractError> {
        if cells.len() < ORDER_RAW_CELLS {
            return Err(ExtractError::MissingCell {
                field: "orders".to_string(),
                index: cells.len(),
            });
        }

        // TODO: take volume_2 from the second segment once the duplicated column is confirmed as a defect.
        let first_volume = cells[4]
            .split(VOLUME_SEPARATOR)
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(OrderRecord {
            open_time: cells[0].clone(),
            order: cells[1].clone(),
            symbol: cells[2].clone(),
            order_type: cells[3].clone(),
            volume_1: first_volume.clone(),
            volume_2: first_volume,
            price: cells[5].clone(),
            stop_loss: cells[6].clone(),
            take_profit: cells[7].clone(),
            time: cells[8].clone(),
            state: cells[9].clone(),
            comment: cells[10].clone(),
        })
    }

    pub fn into_row(self) -> Vec<String> {
        vec![
            self.open_time,
            self.order,
            self.symbol,
            self.order_type,
            self.volume_1,
            self.volume_2,
            self.price,
            self.stop_loss,
            self.take_profit,
            self.time,
            self.state,
            self.comment,
        ]
    }
}

/// The two trade tables that share the captured-rows layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeTable {
    Orders,
    Deals,
}

impl TradeTable {
    pub fn marker(self) -> &'static str {
        match self {
            TradeTable::Orders => "Orders",
            TradeTable::Deals => "Deals",
        }
    }

    fn section_re(self) -> &'static Regex {
        match self {
            TradeTable::Orders => &*ORDERS_SECTION_RE,
            TradeTable::Deals => &*DEALS_SECTION_RE,
        }
    }
}

/// Returns the raw markup of the data rows following the table's column header row.
pub fn isolate_section(html_content: &str, table: TradeTable) -> Result<&str, ExtractError> {
    let captured = table
        .section_re()
        .captures(html_content)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ExtractError::SectionNotFound(format!("{} table", table.marker())))?;
    tracing::debug!("Isolated {} section ({} bytes)", table.marker(), captured.len());
    Ok(captured.as_str())
}

/// Cell texts of every colored data row, stopping at the first row without cells.
pub fn data_rows(section_html: &str) -> Vec<Vec<String>> {
    // Bare <tr> outside a table would be dropped by the HTML parser
    let fragment = Html::parse_fragment(&format!("<table>{}</table>", section_html));

    let mut rows = Vec::new();
    for tr in fragment.select(&DATA_ROW_SELECTOR) {
        let cells: Vec<String> = tr
            .select(&CELL_SELECTOR)
            .map(|td| td.text().map(str::trim).collect::<String>())
            .collect();

        if cells.is_empty() {
            tracing::debug!("Row without cells ends the table after {} rows", rows.len());
            break;
        }
        rows.push(cells);
    }
    rows
}

pub fn extract_orders_table(html_content: &str) -> Result<Vec<OrderRecord>, ExtractError> {
    let section = isolate_section(html_content, TradeTable::Orders)?;
    let orders = data_rows(section)
        .iter()
        .map(|cells| OrderRecord::from_cells(cells))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!("Extracted {} orders", orders.len());
    Ok(orders)
}

/// Deals rows are passed through exactly as captured.
pub fn extract_deals_table(html_content: &str) -> Result<Vec<Vec<String>>, ExtractError> {
    let section = isolate_section(html_content, TradeTable::Deals)?;
    let deals = data_rows(section);
    tracing::info!("Extracted {} deals", deals.len());
    Ok(deals)
}
