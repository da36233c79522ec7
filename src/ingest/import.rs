//! Bulk import of tabular rows with heuristic column detection

use crate::core::GeoSample;
use crate::ingest::{parse_timestamp, timestamp_from_epoch_millis};
use crate::validation::SampleError;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Failures that reject an import before anything is appended
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not detect latitude/longitude columns in {headers:?}; expected names such as lat, latitude, lon, lng")]
    ColumnDetectionFailure { headers: Vec<String> },
    #[error("no data rows found")]
    NoRows,
    #[error("failed to read tabular data: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ImportResult<T> = Result<T, ImportError>;

/// One cell of a parsed row
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Empty,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Classify a raw cell: blank, numeric, or free text
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => FieldValue::Number(value),
            Err(_) => FieldValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Numeric reading; text may use a decimal comma and surrounding quotes
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(text) => text
                .trim()
                .trim_matches('"')
                .replace(',', ".")
                .parse::<f64>()
                .ok(),
            FieldValue::Empty => None,
        }
    }

    /// Text is parsed as a date/time, numbers as epoch milliseconds
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Number(millis) => timestamp_from_epoch_millis(*millis),
            FieldValue::Text(text) => parse_timestamp(text.trim_matches('"')),
            FieldValue::Empty => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Ordered mapping of column name to cell value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.push(name, value.into());
        self
    }

    pub fn push(&mut self, name: &str, value: FieldValue) {
        self.fields.push((name.to_string(), value));
    }

    /// First field with exactly this name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_empty())
    }
}

/// What a column is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Latitude,
    Longitude,
    Timestamp,
    Speed,
}

/// Name fragments identifying each role, matched case-insensitively as substrings
pub const ROLE_CANDIDATES: [(ColumnRole, &[&str]); 4] = [
    (ColumnRole::Latitude, &["lat", "latitude"]),
    (ColumnRole::Longitude, &["lon", "lng", "longitude", "long"]),
    (ColumnRole::Timestamp, &["time", "timestamp", "datetime", "date", "ts"]),
    (ColumnRole::Speed, &["speed", "velocity"]),
];

/// Columns resolved for each role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub timestamp: Option<String>,
    pub speed: Option<String>,
}

impl ColumnMapping {
    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Latitude => self.latitude.as_deref(),
            ColumnRole::Longitude => self.longitude.as_deref(),
            ColumnRole::Timestamp => self.timestamp.as_deref(),
            ColumnRole::Speed => self.speed.as_deref(),
        }
    }

    fn slot(&mut self, role: ColumnRole) -> &mut Option<String> {
        match role {
            ColumnRole::Latitude => &mut self.latitude,
            ColumnRole::Longitude => &mut self.longitude,
            ColumnRole::Timestamp => &mut self.timestamp,
            ColumnRole::Speed => &mut self.speed,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Assign columns to roles; the first matching column wins each role.
///
/// A single column may satisfy several roles.
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    for header in headers {
        let lower = header.as_ref().to_lowercase();
        for (role, candidates) in ROLE_CANDIDATES.iter() {
            let slot = mapping.slot(*role);
            if slot.is_none() && candidates.iter().any(|c| lower.contains(c)) {
                *slot = Some(header.as_ref().to_string());
            }
        }
    }
    mapping
}

/// Samples extracted from a set of rows
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub samples: Vec<GeoSample>,
    pub mapping: ColumnMapping,
    pub total_rows: usize,
    /// Rows with no latitude/longitude or unreadable coordinates
    pub dropped_rows: usize,
}

/// Converts parsed rows into samples ready for the import track
#[derive(Debug, Clone, Default)]
pub struct ImportAdapter;

impl ImportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Detect columns from the first row and convert every row.
    ///
    /// Fails without producing anything when the rows are empty or the
    /// coordinate columns cannot be identified.
    pub fn convert(&self, rows: &[Row]) -> ImportResult<ImportBatch> {
        let first = rows.first().ok_or(ImportError::NoRows)?;
        let headers = first.keys();
        let mapping = detect_columns(headers.as_slice());
        let (Some(lat_key), Some(lon_key)) = (mapping.latitude.clone(), mapping.longitude.clone()) else {
            return Err(ImportError::ColumnDetectionFailure { headers });
        };
        debug!(?mapping, "import columns detected");

        let mut samples = Vec::with_capacity(rows.len());
        let mut dropped_rows = 0;
        for (index, row) in rows.iter().enumerate() {
            match self.row_to_sample(row, &lat_key, &lon_key, &mapping) {
                Ok(Some(sample)) => samples.push(sample),
                Ok(None) => dropped_rows += 1,
                Err(error) => {
                    debug!(row = index, %error, "dropping unreadable row");
                    dropped_rows += 1;
                }
            }
        }

        info!(rows = rows.len(), samples = samples.len(), dropped_rows, "rows converted");
        Ok(ImportBatch {
            samples,
            mapping,
            total_rows: rows.len(),
            dropped_rows,
        })
    }

    /// `Ok(None)` for rows without coordinates, `Err` for unreadable ones
    fn row_to_sample(
        &self,
        row: &Row,
        lat_key: &str,
        lon_key: &str,
        mapping: &ColumnMapping,
    ) -> Result<Option<GeoSample>, SampleError> {
        let (Some(lat), Some(lon)) = (row.get(lat_key), row.get(lon_key)) else {
            return Ok(None);
        };
        if lat.is_empty() || lon.is_empty() {
            return Ok(None);
        }
        let latitude = lat.as_number().ok_or_else(|| SampleError::Unparseable {
            field: lat_key.to_string(),
            raw: lat.to_string(),
        })?;
        let longitude = lon.as_number().ok_or_else(|| SampleError::Unparseable {
            field: lon_key.to_string(),
            raw: lon.to_string(),
        })?;

        let timestamp = mapping
            .get(ColumnRole::Timestamp)
            .and_then(|key| row.get(key))
            .and_then(FieldValue::as_timestamp);
        let speed = mapping
            .get(ColumnRole::Speed)
            .and_then(|key| row.get(key))
            .and_then(FieldValue::as_number);

        Ok(Some(GeoSample {
            latitude,
            longitude,
            timestamp,
            speed,
        }))
    }
}
