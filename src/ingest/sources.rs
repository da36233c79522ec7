//! Position sources for demos and testing

use crate::ingest::{PositionSource, RawPositionRecord, SourceError, SourceResult, StatusOutcome, TrackerStatus};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

const SIMULATED_DEVICE_ID: &str = "SIM-TRACKER-001";

/// Random-walk tracker around a start point
pub struct SimulatedSource {
    lat: f64,
    lon: f64,
    step_deg: f64,
    max_speed: u32,
    altitude: f64,
    location: String,
    rng: StdRng,
}

impl SimulatedSource {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self::with_rng(lat, lon, StdRng::from_entropy())
    }

    /// Deterministic walk for reproducible runs
    pub fn seeded(lat: f64, lon: f64, seed: u64) -> Self {
        Self::with_rng(lat, lon, StdRng::seed_from_u64(seed))
    }

    fn with_rng(lat: f64, lon: f64, rng: StdRng) -> Self {
        Self {
            lat,
            lon,
            step_deg: 0.001,
            max_speed: 60,
            altitude: 34.0,
            location: "Simulated tracker".to_string(),
            rng,
        }
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }
}

impl PositionSource for SimulatedSource {
    fn fetch_position(&mut self) -> SourceResult<Option<RawPositionRecord>> {
        self.lat = (self.lat + self.rng.gen_range(-self.step_deg..=self.step_deg)).clamp(-90.0, 90.0);
        self.lon = (self.lon + self.rng.gen_range(-self.step_deg..=self.step_deg)).clamp(-180.0, 180.0);
        let speed = self.rng.gen_range(0..=self.max_speed) as f64;

        Ok(Some(RawPositionRecord {
            lat: self.lat,
            lon: self.lon,
            timestamp: Some(Utc::now().to_rfc3339()),
            speed: Some(speed),
            altitude: Some(self.altitude),
            location: Some(self.location.clone()),
        }))
    }

    fn fetch_status(&mut self) -> StatusOutcome {
        Ok(Some(TrackerStatus {
            online: true,
            battery: Some(self.rng.gen_range(60..=100)),
            signal_strength: Some(self.rng.gen_range(70..=100)),
            last_update: Some(Utc::now().to_rfc3339()),
            device_id: Some(SIMULATED_DEVICE_ID.to_string()),
        }))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Source replaying queues of prepared outcomes; an empty queue yields nothing
#[derive(Default)]
pub struct ScriptedSource {
    outcomes: VecDeque<SourceResult<Option<RawPositionRecord>>>,
    statuses: VecDeque<StatusOutcome>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_record(&mut self, record: RawPositionRecord) {
        self.outcomes.push_back(Ok(Some(record)));
    }

    pub fn push_failure(&mut self, reason: &str) {
        self.outcomes.push_back(Err(SourceError::Unavailable {
            reason: reason.to_string(),
        }));
    }

    pub fn push_status(&mut self, status: TrackerStatus) {
        self.statuses.push_back(Ok(Some(status)));
    }

    pub fn push_status_failure(&mut self, reason: &str) {
        self.statuses.push_back(Err(SourceError::Unavailable {
            reason: reason.to_string(),
        }));
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl PositionSource for ScriptedSource {
    fn fetch_position(&mut self) -> SourceResult<Option<RawPositionRecord>> {
        self.outcomes.pop_front().unwrap_or(Ok(None))
    }

    fn fetch_status(&mut self) -> StatusOutcome {
        self.statuses.pop_front().unwrap_or(Ok(None))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
