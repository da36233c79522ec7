//! Core data types for the track viewer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Plain geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One geographic fix with optional timing and speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoSample {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub speed: Option<f64>,
}

impl GeoSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp: None,
            speed: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn coordinate(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// The two tracks a session keeps for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Live,
    Import,
}

impl TrackKind {
    pub fn other(self) -> Self {
        match self {
            TrackKind::Live => TrackKind::Import,
            TrackKind::Import => TrackKind::Live,
        }
    }
}

impl FromStr for TrackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(TrackKind::Live),
            "import" => Ok(TrackKind::Import),
            other => Err(format!("unknown track '{}'", other)),
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Live => write!(f, "live"),
            TrackKind::Import => write!(f, "import"),
        }
    }
}

/// Visual representation of a track on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// One marker per sample
    #[default]
    Points,
    /// A single connected line through all samples
    Path,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Points => DisplayMode::Path,
            DisplayMode::Path => DisplayMode::Points,
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "points" => Ok(DisplayMode::Points),
            "path" => Ok(DisplayMode::Path),
            other => Err(format!("unknown display mode '{}'", other)),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Points => write!(f, "points"),
            DisplayMode::Path => write!(f, "path"),
        }
    }
}
