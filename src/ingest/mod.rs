//! Ingestion adapters: live polling and bulk tabular import
//!
//! Both adapters only produce [`GeoSample`](crate::core::GeoSample) values;
//! storing them is the track manager's job.

pub mod timestamp;
pub mod live;
pub mod sources;
pub mod import;
pub mod csv_rows;

pub use timestamp::{parse_timestamp, timestamp_from_epoch_millis};
pub use live::{
    LivePoller, PollOutcome, PositionSource, RawPositionRecord, SourceError, SourceResult, StatusOutcome, TrackerStatus,
};
pub use sources::{ScriptedSource, SimulatedSource};
pub use import::{
    detect_columns, ColumnMapping, ColumnRole, FieldValue, ImportAdapter, ImportBatch, ImportError,
    ImportResult, Row, ROLE_CANDIDATES,
};
pub use csv_rows::{read_rows_from_bytes, read_rows_from_path, read_rows_from_str};
