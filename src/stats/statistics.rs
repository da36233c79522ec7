//! Statistics derived from a track's samples

use crate::core::{GeoSample, EARTH_RADIUS_KM};
use crate::track::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Duration readout when no elapsed time can be derived
pub const ZERO_DURATION_TEXT: &str = "0h 0m";

/// Snapshot of the figures shown for the active track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub distance_km: f64,
    pub duration_text: String,
    /// `None` when no sample carried a usable speed
    pub max_speed: Option<f64>,
    pub point_count: usize,
}

impl Default for StatisticsSnapshot {
    fn default() -> Self {
        Self {
            distance_km: 0.0,
            duration_text: ZERO_DURATION_TEXT.to_string(),
            max_speed: None,
            point_count: 0,
        }
    }
}

/// Great-circle distance between two fixes in kilometres (haversine)
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Compute the snapshot for a track; never mutates it
pub fn compute(track: &Track) -> StatisticsSnapshot {
    compute_samples(track.samples().iter())
}

/// Same as [`compute`] over any ordered sample sequence
pub fn compute_samples<'a, I>(samples: I) -> StatisticsSnapshot
where
    I: IntoIterator<Item = &'a GeoSample>,
{
    let mut distance_km = 0.0;
    let mut max_speed: Option<f64> = None;
    let mut point_count = 0;
    let mut first: Option<&GeoSample> = None;
    let mut previous: Option<&GeoSample> = None;

    for sample in samples {
        if let Some(prev) = previous {
            distance_km += haversine_km(prev.latitude, prev.longitude, sample.latitude, sample.longitude);
        }
        if let Some(speed) = sample.speed.filter(|s| s.is_finite()) {
            max_speed = Some(max_speed.map_or(speed, |m| m.max(speed)));
        }
        if first.is_none() {
            first = Some(sample);
        }
        previous = Some(sample);
        point_count += 1;
    }

    let duration_text = match (first, previous) {
        (Some(a), Some(b)) if point_count >= 2 => match (a.timestamp, b.timestamp) {
            (Some(start), Some(end)) => format_duration(start, end),
            _ => ZERO_DURATION_TEXT.to_string(),
        },
        _ => ZERO_DURATION_TEXT.to_string(),
    };

    StatisticsSnapshot {
        distance_km,
        duration_text,
        max_speed,
        point_count,
    }
}

/// Whole minutes between two instants as `"{h}h {m}m"`, negative spans as zero
pub fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let minutes = (end - start).num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TrackKind;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(minute as i64)
    }

    fn track_of(samples: Vec<GeoSample>) -> Track {
        let mut track = Track::new(TrackKind::Import);
        for sample in samples {
            track.push(sample);
        }
        track
    }

    #[test]
    fn test_empty_track() {
        let stats = compute(&Track::new(TrackKind::Live));
        assert_eq!(stats, StatisticsSnapshot::default());
    }

    #[test]
    fn test_single_sample_has_no_distance() {
        let stats = compute(&track_of(vec![GeoSample::new(10.0, 10.0).with_timestamp(at(0))]));
        assert_eq!(stats.distance_km, 0.0);
        assert_eq!(stats.duration_text, "0h 0m");
        assert_eq!(stats.point_count, 1);
    }

    #[test]
    fn test_same_coordinate_distance_is_zero() {
        let stats = compute(&track_of(vec![GeoSample::new(10.0, 10.0), GeoSample::new(10.0, 10.0)]));
        assert_eq!(stats.distance_km, 0.0);
    }

    #[test]
    fn test_one_degree_at_equator() {
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.2).abs() < 111.2 * 0.01, "distance was {}", d);
    }

    #[test]
    fn test_distance_sums_consecutive_legs() {
        let stats = compute(&track_of(vec![
            GeoSample::new(0.0, 0.0),
            GeoSample::new(0.0, 1.0),
            GeoSample::new(0.0, 2.0),
        ]));
        assert!((stats.distance_km - 2.0 * haversine_km(0.0, 0.0, 0.0, 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_duration_hours_and_minutes() {
        let stats = compute(&track_of(vec![
            GeoSample::new(0.0, 0.0).with_timestamp(at(0)),
            GeoSample::new(0.0, 0.1),
            GeoSample::new(0.0, 0.2).with_timestamp(at(125)),
        ]));
        assert_eq!(stats.duration_text, "2h 5m");
    }

    #[test]
    fn test_duration_needs_both_ends() {
        let stats = compute(&track_of(vec![
            GeoSample::new(0.0, 0.0),
            GeoSample::new(0.0, 0.2).with_timestamp(at(30)),
        ]));
        assert_eq!(stats.duration_text, ZERO_DURATION_TEXT);
    }

    #[test]
    fn test_out_of_order_duration_clamped() {
        let stats = compute(&track_of(vec![
            GeoSample::new(0.0, 0.0).with_timestamp(at(90)),
            GeoSample::new(0.0, 0.2).with_timestamp(at(0)),
        ]));
        assert_eq!(stats.duration_text, "0h 0m");
    }

    #[test]
    fn test_partial_minutes_are_floored() {
        let start = at(0);
        let end = start + chrono::Duration::seconds(299);
        assert_eq!(format_duration(start, end), "0h 4m");
    }

    #[test]
    fn test_max_speed_unknown_without_speeds() {
        let stats = compute(&track_of(vec![GeoSample::new(0.0, 0.0), GeoSample::new(1.0, 1.0)]));
        assert_eq!(stats.max_speed, None);
    }

    #[test]
    fn test_max_speed_zero_is_known() {
        let stats = compute(&track_of(vec![GeoSample::new(0.0, 0.0).with_speed(0.0)]));
        assert_eq!(stats.max_speed, Some(0.0));
    }

    #[test]
    fn test_max_speed_skips_missing() {
        let stats = compute(&track_of(vec![
            GeoSample::new(0.0, 0.0).with_speed(12.5),
            GeoSample::new(0.0, 0.0),
            GeoSample::new(0.0, 0.0).with_speed(48.0),
            GeoSample::new(0.0, 0.0).with_speed(f64::NAN),
        ]));
        assert_eq!(stats.max_speed, Some(48.0));
    }
}
