//! Output formatting for statistics snapshots
//!
//! Mirrors what a dashboard shows: distance with two decimals, duration as
//! text, max speed rounded or a dash when unknown, and the point count.

use crate::stats::StatisticsSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown for an unknown max speed
pub const UNKNOWN_SPEED: &str = "-";

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Max speed as displayed: rounded, or [`UNKNOWN_SPEED`]
pub fn max_speed_text(snapshot: &StatisticsSnapshot) -> String {
    match snapshot.max_speed {
        Some(speed) => format!("{}", speed.round()),
        None => UNKNOWN_SPEED.to_string(),
    }
}

/// Human-readable formatter
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    pub compact: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self { compact: true }
    }

    pub fn format_text(&self, snapshot: &StatisticsSnapshot) -> String {
        if self.compact {
            return format!(
                "{:.2} km | {} | max {} | {} pts",
                snapshot.distance_km,
                snapshot.duration_text,
                max_speed_text(snapshot),
                snapshot.point_count
            );
        }

        let mut output = String::new();
        output.push_str(&format!("Distance:  {:.2} km\n", snapshot.distance_km));
        output.push_str(&format!("Duration:  {}\n", snapshot.duration_text));
        output.push_str(&format!("Max speed: {}\n", max_speed_text(snapshot)));
        output.push_str(&format!("Points:    {}\n", snapshot.point_count));
        output
    }
}

/// JSON formatter; an unknown max speed serializes as `null`
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, snapshot: &StatisticsSnapshot) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(snapshot)
        } else {
            serde_json::to_string(snapshot)
        }
    }
}

/// CSV formatter producing one header line and one record per snapshot
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    pub delimiter: char,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> String {
        let d = self.delimiter;
        format!("distance_km{d}duration{d}max_speed{d}point_count")
    }

    pub fn format_csv(&self, snapshot: &StatisticsSnapshot) -> String {
        let d = self.delimiter;
        let speed = snapshot.max_speed.map(|s| s.to_string()).unwrap_or_default();
        format!(
            "{:.3}{d}{}{d}{}{d}{}",
            snapshot.distance_km, snapshot.duration_text, speed, snapshot.point_count
        )
    }
}

/// Render a snapshot in the requested format
pub fn format_snapshot(snapshot: &StatisticsSnapshot, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(TextFormatter::new().format_text(snapshot)),
        OutputFormat::Json => JsonFormatter::pretty().format_json(snapshot),
        OutputFormat::Csv => {
            let formatter = CsvFormatter::new();
            Ok(format!("{}\n{}\n", formatter.header(), formatter.format_csv(snapshot)))
        }
    }
}
