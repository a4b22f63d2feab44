// src/lib.rs
//! Extraction of Strategy Tester reports (summary, orders, deals) and
//! optimizer spreadsheets into CSV and JSON.

pub mod extractors;
pub mod report;
pub mod storage;
pub mod utils;

pub use report::{run, ReportKind, RunOptions};
pub use storage::Destination;
pub use utils::AppError;
