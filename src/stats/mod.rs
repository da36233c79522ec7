//! Statistics engine and its output formatters

pub mod statistics;
pub mod formatting;

pub use statistics::{compute, compute_samples, format_duration, haversine_km, StatisticsSnapshot, ZERO_DURATION_TEXT};
pub use formatting::{format_snapshot, CsvFormatter, JsonFormatter, OutputFormat, TextFormatter};
