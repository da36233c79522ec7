//! GPS track viewer
//!
//! Keeps a live track fed by periodic polling and an import track fed from
//! tabular files, draws the active one on a map surface as markers or a path,
//! and derives distance, duration and speed statistics from it.

pub mod core;
pub mod track;
pub mod stats;
pub mod render;
pub mod manager;
pub mod ingest;
pub mod validation;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{DisplayMode, GeoSample, LatLng, TrackKind};
pub use track::{RetentionConfig, Track};
pub use stats::{compute, OutputFormat, StatisticsSnapshot};
pub use render::{GeoBounds, InMemorySurface, MapSurface, PrimitiveId, ViewRenderer};
pub use manager::{ImportReport, SessionEvent, TrackManager};
pub use ingest::{
    ImportAdapter, ImportError, LivePoller, PositionSource, RawPositionRecord, Row, SimulatedSource, SourceError,
    TrackerStatus,
};
pub use validation::{SampleError, SampleValidator};
pub use utils::{ConfigError, ConfigurationManager, TrackerConfig};
