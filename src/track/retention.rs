//! Retention policy: bounds a track by evicting its oldest samples

use crate::core::DEFAULT_MAX_SAMPLES;
use crate::render::{MapSurface, ViewRenderer};
use crate::track::Track;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Optional upper bound on the number of samples per track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub enabled: bool,
    pub max_samples: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl RetentionConfig {
    pub fn limited(max_samples: usize) -> Self {
        Self {
            enabled: true,
            max_samples,
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    /// The active bound, if any
    pub fn limit(&self) -> Option<usize> {
        self.enabled.then_some(self.max_samples)
    }
}

/// Trim `track` down to the configured bound, oldest first.
///
/// Each evicted sample takes its marker with it. A path-mode track has its
/// vertices resynchronized once at the end. Returns the number of evicted
/// samples; calling again without new samples evicts nothing.
pub fn enforce<S: MapSurface>(
    track: &mut Track,
    config: &RetentionConfig,
    renderer: &mut ViewRenderer<S>,
) -> usize {
    let Some(max_samples) = config.limit() else {
        return 0;
    };
    if max_samples == 0 {
        warn!("retention bound of zero ignored");
        return 0;
    }

    let mut evicted = 0;
    while track.len() > max_samples {
        if track.pop_oldest().is_none() {
            break;
        }
        renderer.discard_oldest_marker(track);
        evicted += 1;
    }

    if evicted > 0 {
        renderer.resync_path(track);
        debug!(track = %track.kind(), evicted, remaining = track.len(), "retention trimmed track");
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DisplayMode, GeoSample, TrackKind};
    use crate::render::InMemorySurface;

    fn filled(n: usize) -> Track {
        let mut track = Track::new(TrackKind::Live);
        for i in 0..n {
            track.push(GeoSample::new(i as f64, 0.0));
        }
        track
    }

    #[test]
    fn test_disabled_is_noop() {
        let mut renderer = ViewRenderer::new(InMemorySurface::default());
        let mut track = filled(10);
        let config = RetentionConfig {
            enabled: false,
            max_samples: 3,
        };
        assert_eq!(enforce(&mut track, &config, &mut renderer), 0);
        assert_eq!(track.len(), 10);
    }

    #[test]
    fn test_keeps_most_recent_in_order() {
        let mut renderer = ViewRenderer::new(InMemorySurface::default());
        let mut track = filled(10);
        assert_eq!(enforce(&mut track, &RetentionConfig::limited(4), &mut renderer), 6);
        let kept: Vec<f64> = track.samples().iter().map(|s| s.latitude).collect();
        assert_eq!(kept, vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_idempotent() {
        let mut renderer = ViewRenderer::new(InMemorySurface::default());
        let mut track = filled(5);
        let config = RetentionConfig::limited(2);
        enforce(&mut track, &config, &mut renderer);
        assert_eq!(enforce(&mut track, &config, &mut renderer), 0);
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn test_evicts_markers_one_for_one() {
        let mut renderer = ViewRenderer::new(InMemorySurface::default());
        let mut track = filled(5);
        renderer.render(&mut track, DisplayMode::Points);
        let markers: Vec<_> = track.visuals().markers().collect();

        enforce(&mut track, &RetentionConfig::limited(3), &mut renderer);

        assert_eq!(track.visuals().markers().collect::<Vec<_>>(), markers[2..].to_vec());
        assert_eq!(renderer.surface().attached_marker_count(), 3);
        assert_eq!(renderer.surface().discarded_count(), 2);
    }

    #[test]
    fn test_resyncs_path_vertices() {
        let mut renderer = ViewRenderer::new(InMemorySurface::default());
        let mut track = filled(5);
        renderer.render(&mut track, DisplayMode::Path);

        enforce(&mut track, &RetentionConfig::limited(2), &mut renderer);

        assert_eq!(renderer.surface().attached_path_vertices().unwrap(), track.coordinates());
    }

    #[test]
    fn test_unrendered_track_trims_samples_only() {
        let mut renderer = ViewRenderer::new(InMemorySurface::default());
        let mut track = filled(4);
        enforce(&mut track, &RetentionConfig::limited(1), &mut renderer);
        assert_eq!(track.len(), 1);
        assert_eq!(renderer.surface().primitive_count(), 0);
    }

    #[test]
    fn test_zero_bound_ignored() {
        let mut renderer = ViewRenderer::new(InMemorySurface::default());
        let mut track = filled(4);
        assert_eq!(enforce(&mut track, &RetentionConfig::limited(0), &mut renderer), 0);
        assert_eq!(track.len(), 4);
    }
}
