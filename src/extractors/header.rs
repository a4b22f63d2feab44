// src/extractors/header.rs
//! Summary table of a Strategy Tester report.
//!
//! The table is a flat run of `<tr>` rows. Most rows are identified by the
//! label in their first cell and pack up to three label/value pairs (cells
//! 0-1, 2-3, 4-5). A handful of rows have an empty first cell and are
//! identified by the phrase in their second cell instead (sentinel rows).
//! Both kinds are routed through static dispatch tables; rows matching
//! neither are skipped so newer terminal builds with extra metrics still
//! parse.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::extractors::composite::{
    parse_duration, parse_percentage_value, parse_period, parse_value_diff, parse_value_of,
    parse_value_percentage, Duration, ValueDiff, ValueOf, ValuePercentage,
};
use crate::extractors::value::{coerce, Value};
use crate::utils::error::ExtractError;

pub const REPORT_TITLE: &str = "Strategy Tester Report";

/// Rows before the first metric: title, broker, build, section heading.
const PREAMBLE_ROWS: usize = 4;

static BOLD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("b").expect("Failed to compile BOLD_SELECTOR"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to compile CELL_SELECTOR"));

/// Strategy inputs in report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs(Vec<(String, Value)>);

impl Inputs {
    /// Later duplicates replace earlier ones in place.
    pub fn insert(&mut self, name: String, value: Value) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Inputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A drawdown-absolute cell: a plain amount, or an amount with its percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Drawdown {
    WithPercentage(ValuePercentage),
    Amount(Value),
}

/// Summary statistics of one tester run. Absent metrics are omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeaderRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expert: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Inputs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_deposit: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_quality: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bars: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_net_profit: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_drawdown_absolute: Option<Drawdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity_drawdown_absolute: Option<Drawdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_profit: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_drawdown_maximal: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity_drawdown_maximal: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_loss: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_drawdown_relative: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity_drawdown_relative: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_factor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_payoff: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_level: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_factor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahpr: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lr_correlation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ontester_result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ghpr: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lr_standard_error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_trades: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_trades_won: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_trades_won: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_deals: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_trades: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_trades: Option<ValuePercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_profit_trade: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_loss_trade: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_profit_trade: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_loss_trade: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<ValueOf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_consecutive_losses: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximal: Option<ValueOf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximal_consecutive_losses_num: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_consecutive_losses: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_profits_mfe: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_profits_mae: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_profits_mfe_mae: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimal_position_holding_time: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximal_position_holding_time: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_position_holding_time: Option<Duration>,
}

type Row = Vec<String>;
type RowHandler = fn(&[String], &mut HeaderRecord) -> Result<(), ExtractError>;

/// Rows keyed by their first cell.
static LABEL_HANDLERS: &[(&str, RowHandler)] = &[
    ("Expert:", expert_row),
    ("Symbol:", symbol_row),
    ("Period:", period_row),
    ("Currency:", currency_row),
    ("Initial Deposit:", initial_deposit_row),
    ("Leverage:", leverage_row),
    ("History Quality:", history_quality_row),
    ("Bars:", bars_row),
    ("Total Net Profit:", total_net_profit_row),
    ("Gross Profit:", gross_profit_row),
    ("Gross Loss:", gross_loss_row),
    ("Profit Factor:", profit_factor_row),
    ("Recovery Factor:", recovery_factor_row),
    ("AHPR:", ahpr_row),
    ("GHPR:", ghpr_row),
    ("Total Trades:", total_trades_row),
    ("Total Deals:", total_deals_row),
    ("Correlation (Profits,MFE):", correlation_row),
    ("Minimal position holding time:", holding_time_row),
];

/// Rows keyed by the phrase in their second cell.
static SENTINEL_HANDLERS: &[(&str, RowHandler)] = &[
    ("Largest profit trade:", largest_trade_row),
    ("Average profit trade:", average_trade_row),
    ("Maximum :", maximum_row),
    ("Maximal :", maximal_row),
    ("Average :", average_consecutive_row),
];

const INPUTS_LABEL: &str = "Inputs:";

/// Extracts the summary table of a decoded report.
pub fn extract_header_table(html_content: &str) -> Result<HeaderRecord, ExtractError> {
    let rows = summary_rows(html_content)?;
    tracing::debug!("Summary table has {} rows", rows.len());
    parse_header_rows(&rows)
}

/// Flattens the table enclosing the report title into trimmed cell texts.
pub fn summary_rows(html_content: &str) -> Result<Vec<Row>, ExtractError> {
    let document = Html::parse_document(html_content);

    let title = document
        .select(&BOLD_SELECTOR)
        .find(|b| b.text().collect::<String>().trim() == REPORT_TITLE)
        .ok_or_else(|| ExtractError::SectionNotFound(format!("<b>{}</b>", REPORT_TITLE)))?;

    let table = title
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .ok_or_else(|| ExtractError::SectionNotFound(format!("table enclosing \"{}\"", REPORT_TITLE)))?;

    Ok(table
        .select(&ROW_SELECTOR)
        .map(|tr| {
            tr.select(&CELL_SELECTOR)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .collect()
        })
        .collect())
}

/// Runs the flattened rows through the dispatch tables.
pub fn parse_header_rows(rows: &[Row]) -> Result<HeaderRecord, ExtractError> {
    let mut record = HeaderRecord::default();
    let mut index = PREAMBLE_ROWS;

    while index < rows.len() {
        let row = &rows[index];
        if row.is_empty() {
            index += 1;
            continue;
        }

        if row[0] == INPUTS_LABEL {
            let (inputs, next) = scan_inputs(rows, index)?;
            tracing::debug!("Parsed {} strategy inputs, resuming at row {}", inputs.len(), next);
            record.inputs = Some(inputs);
            index = next;
            continue;
        }

        dispatch_row(row, &mut record)?;
        index += 1;
    }

    Ok(record)
}

fn dispatch_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    let label = row[0].as_str();
    if let Some((_, handler)) = LABEL_HANDLERS.iter().find(|(key, _)| *key == label) {
        return handler(row, record);
    }

    let sentinel = value_cell(row);
    if let Some((_, handler)) = SENTINEL_HANDLERS.iter().find(|(key, _)| *key == sentinel) {
        return handler(row, record);
    }

    tracing::trace!("Skipping unrecognized summary row: {:?}", row);
    Ok(())
}

/// Consumes the strategy inputs block that starts at `start` (the "Inputs:" row).
///
/// Continuation rows have an empty first cell and carry `name=value` in the
/// second. Returns the inputs and the index of the first row after the block.
pub fn scan_inputs(rows: &[Row], start: usize) -> Result<(Inputs, usize), ExtractError> {
    let mut inputs = Inputs::default();

    for (index, row) in rows.iter().enumerate().skip(start) {
        if index > start && row.first().is_some_and(|label| !label.is_empty()) {
            return Ok((inputs, index));
        }

        let entry = match row.get(1) {
            Some(entry) if !entry.is_empty() && entry != "=" => entry,
            _ => continue,
        };

        let (name, raw) = entry
            .split_once('=')
            .ok_or_else(|| ExtractError::malformed("inputs", entry.as_str()))?;
        inputs.insert(name.to_string(), coerce(raw));
    }

    Ok((inputs, rows.len()))
}

fn value_cell(row: &[String]) -> &str {
    row.get(1).map(String::as_str).unwrap_or("")
}

fn cell<'a>(row: &'a [String], index: usize, field: &str) -> Result<&'a str, ExtractError> {
    row.get(index)
        .map(String::as_str)
        .ok_or_else(|| ExtractError::MissingCell {
            field: field.to_string(),
            index,
        })
}

fn coerce_cell(row: &[String], index: usize, field: &str) -> Result<Value, ExtractError> {
    cell(row, index, field).map(coerce)
}

fn value_percentage_cell(row: &[String], index: usize, field: &str) -> Result<ValuePercentage, ExtractError> {
    parse_value_percentage(field, cell(row, index, field)?)
}

fn drawdown_cell(row: &[String], index: usize, field: &str) -> Result<Drawdown, ExtractError> {
    let raw = cell(row, index, field)?;
    if raw.contains('%') {
        parse_value_percentage(field, raw).map(Drawdown::WithPercentage)
    } else {
        Ok(Drawdown::Amount(coerce(raw)))
    }
}

fn expert_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.expert = Some(coerce(value_cell(row)));
    Ok(())
}

fn symbol_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.symbol = Some(coerce(value_cell(row)));
    Ok(())
}

fn period_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    let period = parse_period("period", value_cell(row))?;
    record.period = Some(period.period);
    record.date_start = Some(period.date_start);
    record.date_end = Some(period.date_end);
    Ok(())
}

fn currency_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.currency = Some(value_cell(row).to_string());
    Ok(())
}

fn initial_deposit_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.initial_deposit = Some(coerce(value_cell(row)));
    Ok(())
}

/// `1:100` is stored as the ratio `0.01`.
fn leverage_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    let raw = value_cell(row);
    let malformed = || ExtractError::malformed("leverage", raw);

    let (left, right) = raw.split_once(':').ok_or_else(malformed)?;
    let numerator = coerce(left).as_f64().ok_or_else(malformed)?;
    let denominator = coerce(right).as_f64().ok_or_else(malformed)?;
    if denominator == 0.0 {
        return Err(malformed());
    }
    record.leverage = Some(numerator / denominator);
    Ok(())
}

fn history_quality_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    let raw = value_cell(row);
    let quality = raw.split('%').next().unwrap_or(raw);
    record.history_quality = Some(coerce(quality));
    Ok(())
}

fn bars_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.bars = Some(coerce(value_cell(row)));
    record.ticks = Some(coerce_cell(row, 3, "ticks")?);
    record.symbols = Some(coerce_cell(row, 5, "symbols")?);
    Ok(())
}

fn total_net_profit_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.total_net_profit = Some(coerce(value_cell(row)));
    record.balance_drawdown_absolute = Some(drawdown_cell(row, 3, "balance_drawdown_absolute")?);
    record.equity_drawdown_absolute = Some(drawdown_cell(row, 5, "equity_drawdown_absolute")?);
    Ok(())
}

fn gross_profit_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.gross_profit = Some(coerce(value_cell(row)));
    record.balance_drawdown_maximal = Some(value_percentage_cell(row, 3, "balance_drawdown_maximal")?);
    record.equity_drawdown_maximal = Some(value_percentage_cell(row, 5, "equity_drawdown_maximal")?);
    Ok(())
}

fn gross_loss_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.gross_loss = Some(coerce(value_cell(row)));
    record.balance_drawdown_relative = Some(parse_percentage_value(
        "balance_drawdown_relative",
        cell(row, 3, "balance_drawdown_relative")?,
    )?);
    record.equity_drawdown_relative = Some(parse_percentage_value(
        "equity_drawdown_relative",
        cell(row, 5, "equity_drawdown_relative")?,
    )?);
    Ok(())
}

fn profit_factor_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.profit_factor = Some(coerce(value_cell(row)));
    record.expected_payoff = Some(coerce_cell(row, 3, "expected_payoff")?);
    record.margin_level = Some(coerce_cell(row, 5, "margin_level")?);
    Ok(())
}

fn recovery_factor_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.recovery_factor = Some(coerce(value_cell(row)));
    record.sharpe_ratio = Some(coerce_cell(row, 3, "sharpe_ratio")?);
    record.z_score = Some(value_percentage_cell(row, 5, "z_score")?);
    Ok(())
}

fn ahpr_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.ahpr = Some(parse_value_percentage("ahpr", value_cell(row))?);
    record.lr_correlation = Some(coerce_cell(row, 3, "lr_correlation")?);
    record.ontester_result = Some(coerce_cell(row, 5, "ontester_result")?);
    Ok(())
}

fn ghpr_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.ghpr = Some(parse_value_percentage("ghpr", value_cell(row))?);
    record.lr_standard_error = Some(coerce_cell(row, 3, "lr_standard_error")?);
    Ok(())
}

fn total_trades_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.total_trades = Some(coerce(value_cell(row)));
    record.short_trades_won = Some(value_percentage_cell(row, 3, "short_trades_won")?);
    record.long_trades_won = Some(value_percentage_cell(row, 5, "long_trades_won")?);
    Ok(())
}

fn total_deals_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.total_deals = Some(coerce(value_cell(row)));
    record.profit_trades = Some(value_percentage_cell(row, 3, "profit_trades")?);
    record.loss_trades = Some(value_percentage_cell(row, 5, "loss_trades")?);
    Ok(())
}

fn correlation_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.correlation_profits_mfe = Some(coerce(value_cell(row)));
    record.correlation_profits_mae = Some(coerce_cell(row, 3, "correlation_profits_mae")?);
    record.correlation_profits_mfe_mae = Some(coerce_cell(row, 5, "correlation_profits_mfe_mae")?);
    Ok(())
}

fn holding_time_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.minimal_position_holding_time =
        Some(parse_duration("minimal_position_holding_time", value_cell(row))?);
    record.maximal_position_holding_time = Some(parse_duration(
        "maximal_position_holding_time",
        cell(row, 3, "maximal_position_holding_time")?,
    )?);
    record.average_position_holding_time = Some(parse_duration(
        "average_position_holding_time",
        cell(row, 5, "average_position_holding_time")?,
    )?);
    Ok(())
}

fn largest_trade_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.largest_profit_trade = Some(coerce_cell(row, 2, "largest_profit_trade")?);
    record.largest_loss_trade = Some(coerce_cell(row, 4, "largest_loss_trade")?);
    Ok(())
}

fn average_trade_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.average_profit_trade = Some(coerce_cell(row, 2, "average_profit_trade")?);
    record.average_loss_trade = Some(coerce_cell(row, 4, "average_loss_trade")?);
    Ok(())
}

fn maximum_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.maximum = Some(parse_value_of("maximum", cell(row, 2, "maximum")?)?);
    record.maximum_consecutive_losses = Some(parse_value_diff(
        "maximum_consecutive_losses",
        cell(row, 4, "maximum_consecutive_losses")?,
    )?);
    Ok(())
}

fn maximal_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.maximal = Some(parse_value_of("maximal", cell(row, 2, "maximal")?)?);
    record.maximal_consecutive_losses_num = Some(parse_value_diff(
        "maximal_consecutive_losses_num",
        cell(row, 4, "maximal_consecutive_losses_num")?,
    )?);
    Ok(())
}

fn average_consecutive_row(row: &[String], record: &mut HeaderRecord) -> Result<(), ExtractError> {
    record.average = Some(coerce_cell(row, 2, "average")?);
    record.average_consecutive_losses = Some(coerce_cell(row, 4, "average_consecutive_losses")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREAMBLE: &str = r#"
        <tr><td colspan="6"><div><b>Strategy Tester Report</b></div></td></tr>
        <tr><td colspan="6">Demo Broker Ltd.</td></tr>
        <tr><td colspan="6">Build 3815</td></tr>
        <tr><th colspan="6"><b>Settings</b></th></tr>
    "#;

    fn report(rows: &str) -> String {
        format!(
            "<html><body><table>{}{}</table></body></html>",
            PREAMBLE, rows
        )
    }

    fn rows(cells: &[&[&str]]) -> Vec<Row> {
        cells
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_minimal_report_end_to_end() {
        let html = report(
            r#"
            <tr><td>Expert:</td><td>MovingAverage</td></tr>
            <tr><td>Symbol:</td><td>EURUSD</td></tr>
            <tr><td>Period:</td><td>Daily (2023.01.01 - 2023.01.31)</td></tr>
            <tr><td>Total Net Profit:</td><td>100.00</td>
                <td>Balance Drawdown Absolute:</td><td>5.0 (2.0%)</td>
                <td>Equity Drawdown Absolute:</td><td>3.0 (1.5%)</td></tr>
            "#,
        );

        let record = extract_header_table(&html).unwrap();
        assert_eq!(record.expert, Some(Value::Text("MovingAverage".into())));
        assert_eq!(record.symbol, Some(Value::Text("EURUSD".into())));
        assert_eq!(record.period.as_deref(), Some("Daily"));
        assert_eq!(record.date_start.as_deref(), Some("2023.01.01"));
        assert_eq!(record.date_end.as_deref(), Some("2023.01.31"));
        assert_eq!(record.total_net_profit, Some(Value::Float(100.0)));
        assert_eq!(
            record.balance_drawdown_absolute,
            Some(Drawdown::WithPercentage(ValuePercentage {
                value: Value::Float(5.0),
                percentage: Value::Float(2.0),
            }))
        );
        assert_eq!(
            record.equity_drawdown_absolute,
            Some(Drawdown::WithPercentage(ValuePercentage {
                value: Value::Float(3.0),
                percentage: Value::Float(1.5),
            }))
        );
        assert!(record.inputs.is_none());
    }

    #[test]
    fn test_missing_title_is_section_not_found() {
        let html = "<table><tr><td><b>Some Other Report</b></td></tr></table>";
        assert!(matches!(
            extract_header_table(html),
            Err(ExtractError::SectionNotFound(_))
        ));
    }

    #[test]
    fn test_preamble_rows_are_skipped_even_if_labelled() {
        let table = rows(&[
            &["Expert:", "Ignored"],
            &[],
            &[],
            &[],
            &["Expert:", "Kept"],
        ]);
        let record = parse_header_rows(&table).unwrap();
        assert_eq!(record.expert, Some(Value::Text("Kept".into())));
    }

    #[test]
    fn test_inputs_block_resumes_at_next_label() {
        let table = rows(&[
            &[], &[], &[], &[],
            &["Inputs:", "MaximumRisk=0.02"],
            &["", "DecreaseFactor=3"],
            &["", "="],
            &[""],
            &["", "UseTrailing=TRUE"],
            &["", "Comment=a=b"],
            &["Currency:", "USD"],
            &["Initial Deposit:", "10 000.00"],
        ]);

        let (inputs, next) = scan_inputs(&table, 4).unwrap();
        assert_eq!(next, 10);
        assert_eq!(inputs.len(), 4);
        assert_eq!(inputs.get("MaximumRisk"), Some(&Value::Float(0.02)));
        assert_eq!(inputs.get("DecreaseFactor"), Some(&Value::Int(3)));
        assert_eq!(inputs.get("UseTrailing"), Some(&Value::Bool(true)));
        assert_eq!(inputs.get("Comment"), Some(&Value::Text("a=b".into())));

        let record = parse_header_rows(&table).unwrap();
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert_eq!(record.initial_deposit, Some(Value::Float(10000.0)));
        assert_eq!(record.inputs.unwrap().len(), 4);
    }

    #[test]
    fn test_inputs_block_running_to_end_of_table() {
        let table = rows(&[&["Inputs:", "Lots=1"], &["", "Slippage=3"]]);
        let (inputs, next) = scan_inputs(&table, 0).unwrap();
        assert_eq!(next, 2);
        assert_eq!(inputs.len(), 2);
    }

    #[test]
    fn test_expert_without_parameters() {
        let table = rows(&[&["Inputs:", ""], &["Currency:", "USD"]]);
        let (inputs, next) = scan_inputs(&table, 0).unwrap();
        assert_eq!(next, 1);
        assert_eq!(inputs.len(), 0);

        let report = rows(&[&[], &[], &[], &[], &["Inputs:", ""], &["Currency:", "USD"]]);
        let record = parse_header_rows(&report).unwrap();
        assert_eq!(record.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_input_without_equals_is_malformed() {
        let table = rows(&[&["Inputs:", "Lots"]]);
        assert!(matches!(
            scan_inputs(&table, 0),
            Err(ExtractError::MalformedField { ref field, .. }) if field == "inputs"
        ));
    }

    #[test]
    fn test_leverage_ratio_and_history_quality() {
        let table = rows(&[
            &[], &[], &[], &[],
            &["Leverage:", "1:100"],
            &["History Quality:", "99% real ticks"],
        ]);
        let record = parse_header_rows(&table).unwrap();
        assert_eq!(record.leverage, Some(1.0 / 100.0));
        assert_eq!(record.history_quality, Some(Value::Int(99)));

        for (a, b) in [(1, 500), (3, 7), (100, 1)] {
            let ratio = format!("{}:{}", a, b);
            let table = rows(&[&[], &[], &[], &[], &["Leverage:", ratio.as_str()]]);
            let record = parse_header_rows(&table).unwrap();
            assert_eq!(record.leverage, Some(a as f64 / b as f64));
        }
    }

    #[test]
    fn test_leverage_without_ratio_is_malformed() {
        let table = rows(&[&[], &[], &[], &[], &["Leverage:", "1:0"]]);
        assert!(parse_header_rows(&table).is_err());
        let table = rows(&[&[], &[], &[], &[], &["Leverage:", "100"]]);
        assert!(parse_header_rows(&table).is_err());
    }

    #[test]
    fn test_three_pair_rows() {
        let table = rows(&[
            &[], &[], &[], &[],
            &["Bars:", "21", "Ticks:", "1 234 567", "Symbols:", "1"],
            &["Total Net Profit:", "-57.30", "Balance Drawdown Absolute:", "120.00", "Equity Drawdown Absolute:", "131.45"],
            &["Gross Profit:", "400.00", "Balance Drawdown Maximal:", "250.00 (2.45%)", "Equity Drawdown Maximal:", "260.10 (2.55%)"],
            &["Gross Loss:", "-457.30", "Balance Drawdown Relative:", "2.45% (250.00)", "Equity Drawdown Relative:", "2.55% (260.10)"],
            &["Profit Factor:", "0.87", "Expected Payoff:", "-1.43", "Margin Level:", "1523.40%"],
            &["Recovery Factor:", "-0.22", "Sharpe Ratio:", "-0.35", "Z-Score:", "-0.53 (40.39%)"],
            &["AHPR:", "0.9999 (-0.01%)", "LR Correlation:", "-0.41", "OnTester result:", "0"],
            &["GHPR:", "0.9999 (-0.01%)", "LR Standard Error:", "35.12"],
            &["Total Trades:", "40", "Short Trades (won %):", "18 (44.44%)", "Long Trades (won %):", "22 (45.45%)"],
            &["Total Deals:", "80", "Profit Trades (% of total):", "18 (45.00%)", "Loss Trades (% of total):", "22 (55.00%)"],
            &["Correlation (Profits,MFE):", "0.62", "Correlation (Profits,MAE):", "0.48", "Correlation (MFE,MAE):", "-0.15"],
            &["Minimal position holding time:", "0:05:00", "Maximal position holding time:", "72:00:00", "Average position holding time:", "6:31:12"],
        ]);

        let record = parse_header_rows(&table).unwrap();
        assert_eq!(record.ticks, Some(Value::Int(1234567)));
        assert_eq!(record.symbols, Some(Value::Int(1)));
        assert_eq!(record.balance_drawdown_absolute, Some(Drawdown::Amount(Value::Float(120.0))));
        assert_eq!(
            record.equity_drawdown_relative,
            Some(ValuePercentage { value: Value::Float(260.1), percentage: Value::Float(2.55) })
        );
        assert_eq!(record.margin_level, Some(Value::Float(1523.4)));
        assert_eq!(record.z_score.unwrap().percentage, Value::Float(40.39));
        assert_eq!(record.ahpr.unwrap().percentage, Value::Float(-0.01));
        assert_eq!(record.ontester_result, Some(Value::Int(0)));
        assert_eq!(record.lr_standard_error, Some(Value::Float(35.12)));
        assert_eq!(record.short_trades_won.unwrap().value, Value::Int(18));
        assert_eq!(record.loss_trades.unwrap().percentage, Value::Float(55.0));
        assert_eq!(record.correlation_profits_mfe_mae, Some(Value::Float(-0.15)));
        assert_eq!(
            record.maximal_position_holding_time,
            Some(Duration { h: Value::Int(72), m: Value::Int(0), s: Value::Int(0) })
        );
    }

    #[test]
    fn test_sentinel_rows() {
        let table = rows(&[
            &[], &[], &[], &[],
            &["", "Largest profit trade:", "150.00", "Largest loss trade:", "-80.00"],
            &["", "Average profit trade:", "22.22", "Average loss trade:", "-20.79"],
            &["", "Maximum :", "4 (96.10)", "Maximum consecutive losses:", "5 (-110.25)"],
            &["", "Maximal :", "120.50 (3)", "Maximal consecutive loss (count):", "-140.00 (4)"],
            &["", "Average :", "2", "Average consecutive losses:", "3"],
        ]);

        let record = parse_header_rows(&table).unwrap();
        assert_eq!(record.largest_profit_trade, Some(Value::Float(150.0)));
        assert_eq!(record.average_loss_trade, Some(Value::Float(-20.79)));
        assert_eq!(record.maximum, Some(ValueOf { value: Value::Int(4), of: Value::Float(96.1) }));
        assert_eq!(
            record.maximal_consecutive_losses_num,
            Some(ValueDiff { value: Value::Float(-140.0), diff: Value::Int(4) })
        );
        assert_eq!(record.average_consecutive_losses, Some(Value::Int(3)));
    }

    #[test]
    fn test_unknown_rows_are_skipped() {
        let table = rows(&[
            &[], &[], &[], &[],
            &["Company:", "Demo Broker Ltd."],
            &["", "Some future metric:", "1"],
            &["Symbol:", "XAUUSD"],
        ]);
        let record = parse_header_rows(&table).unwrap();
        assert_eq!(record.symbol, Some(Value::Text("XAUUSD".into())));
    }

    #[test]
    fn test_malformed_composite_aborts() {
        let table = rows(&[
            &[], &[], &[], &[],
            &["Expert:", "Grid"],
            &["GHPR:", "n/a", "LR Standard Error:", "1.0"],
        ]);
        match parse_header_rows(&table) {
            Err(ExtractError::MalformedField { field, raw }) => {
                assert_eq!(field, "ghpr");
                assert_eq!(raw, "n/a");
            }
            other => panic!("expected malformed ghpr, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_reports_missing_cell() {
        let table = rows(&[&[], &[], &[], &[], &["Bars:", "21", "Ticks:"]]);
        assert!(matches!(
            parse_header_rows(&table),
            Err(ExtractError::MissingCell { index: 3, .. })
        ));
    }

    #[test]
    fn test_json_keeps_report_order_and_omits_absent_metrics() {
        let mut record = HeaderRecord::default();
        record.expert = Some(Value::Text("MACD".into()));
        let mut inputs = Inputs::default();
        inputs.insert("Zeta".into(), Value::Int(1));
        inputs.insert("Alpha".into(), Value::Bool(false));
        record.inputs = Some(inputs);
        record.leverage = Some(0.01);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"expert":"MACD","inputs":{"Zeta":1,"Alpha":false},"leverage":0.01}"#
        );
    }
}
