//! Live sample ingestion from a periodically polled source

use crate::core::{GeoSample, DEFAULT_POLL_INTERVAL_SECS};
use crate::ingest::parse_timestamp;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Failures of the live position source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("position source unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("malformed position record: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Position record as delivered by the remote endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPositionRecord {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lng")]
    pub lon: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
}

impl RawPositionRecord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            timestamp: None,
            speed: None,
            altitude: None,
            location: None,
        }
    }

    pub fn from_json(text: &str) -> SourceResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert to a sample; a missing or unreadable timestamp becomes the
    /// time the record was received
    pub fn to_sample(&self, received_at: DateTime<Utc>) -> GeoSample {
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(received_at);
        GeoSample {
            latitude: self.lat,
            longitude: self.lon,
            timestamp: Some(timestamp),
            speed: self.speed,
        }
    }
}

/// Device health reported by the tracker next to its position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerStatus {
    #[serde(default)]
    pub online: bool,
    /// Charge level in percent
    #[serde(default)]
    pub battery: Option<u8>,
    /// Signal quality in percent
    #[serde(default)]
    pub signal_strength: Option<u8>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

impl TrackerStatus {
    pub fn online(device_id: &str) -> Self {
        Self {
            online: true,
            battery: None,
            signal_strength: None,
            last_update: None,
            device_id: Some(device_id.to_string()),
        }
    }

    pub fn from_json(text: &str) -> SourceResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Source of live position records, polled once per tick
pub trait PositionSource {
    /// Returns Ok(Some(record)) when a fix is available, Ok(None) when the
    /// source has nothing new, Err when the source cannot be reached
    fn fetch_position(&mut self) -> SourceResult<Option<RawPositionRecord>>;

    /// Device status, polled on the same cadence as the position.
    /// Sources without a status channel report nothing.
    fn fetch_status(&mut self) -> StatusOutcome {
        Ok(None)
    }

    /// Short label for logs
    fn name(&self) -> &str;
}

/// Result of one poll attempt
pub type PollOutcome = SourceResult<Option<RawPositionRecord>>;

/// Result of one status poll
pub type StatusOutcome = SourceResult<Option<TrackerStatus>>;

/// Drives a [`PositionSource`] at a fixed cadence.
///
/// Cooperative: the caller hands in the current time and the poller decides
/// whether a poll is due. A failed poll is not retried early; the next tick
/// simply polls again.
pub struct LivePoller<P: PositionSource> {
    source: P,
    interval: Duration,
    last_poll: Option<DateTime<Utc>>,
    polls: u64,
    failures: u64,
    status_failures: u64,
}

impl<P: PositionSource> LivePoller<P> {
    pub fn new(source: P, interval_secs: u64) -> Self {
        let interval = match interval_secs {
            0 => None,
            secs => i64::try_from(secs).ok().and_then(Duration::try_seconds),
        };
        let interval = interval.unwrap_or_else(|| {
            warn!(interval_secs, "unusable poll interval replaced by default");
            Duration::seconds(DEFAULT_POLL_INTERVAL_SECS as i64)
        });
        Self {
            source,
            interval,
            last_poll: None,
            polls: 0,
            failures: 0,
            status_failures: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_poll {
            None => true,
            Some(last) => now - last >= self.interval,
        }
    }

    /// Poll if the interval has elapsed
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<PollOutcome> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.poll_now(now))
    }

    /// Poll regardless of cadence (manual refresh)
    pub fn poll_now(&mut self, now: DateTime<Utc>) -> PollOutcome {
        self.last_poll = Some(now);
        self.polls += 1;
        let outcome = self.source.fetch_position();
        match &outcome {
            Ok(Some(record)) => debug!(source = self.source.name(), lat = record.lat, lon = record.lon, "poll delivered fix"),
            Ok(None) => debug!(source = self.source.name(), "poll delivered nothing"),
            Err(error) => {
                self.failures += 1;
                warn!(source = self.source.name(), %error, "poll failed");
            }
        }
        outcome
    }

    /// (polls issued, polls failed)
    pub fn counters(&self) -> (u64, u64) {
        (self.polls, self.failures)
    }

    /// Fetch the device status; called alongside a position poll
    pub fn poll_status(&mut self) -> StatusOutcome {
        let outcome = self.source.fetch_status();
        match &outcome {
            Ok(Some(status)) => debug!(
                source = self.source.name(),
                online = status.online,
                battery = ?status.battery,
                signal = ?status.signal_strength,
                "status received"
            ),
            Ok(None) => {}
            Err(error) => {
                self.status_failures += 1;
                warn!(source = self.source.name(), %error, "status poll failed");
            }
        }
        outcome
    }

    pub fn status_failures(&self) -> u64 {
        self.status_failures
    }
}
