// src/extractors/mod.rs
pub mod composite;
pub mod header;
pub mod optimization;
pub mod trades;
pub mod value;

// Re-export key extraction types for convenience
pub use header::{extract_header_table, HeaderRecord};
pub use optimization::{extract_optimization_table, OptimizationTable};
pub use trades::{extract_deals_table, extract_orders_table, OrderRecord, TradeTable};
pub use value::{coerce, Value};
