use crate::core::{GeoSample, LatLng, TrackKind};
use crate::render::TrackVisuals;
use std::collections::VecDeque;

/// Ordered, bounded sequence of samples for one source, oldest first.
///
/// A track also owns the primitives drawn for it; they are created and
/// released by the view renderer only.
#[derive(Debug)]
pub struct Track {
    kind: TrackKind,
    pub(crate) samples: VecDeque<GeoSample>,
    pub(crate) visuals: TrackVisuals,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            samples: VecDeque::new(),
            visuals: TrackVisuals::default(),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn samples(&self) -> &VecDeque<GeoSample> {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&GeoSample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&GeoSample> {
        self.samples.back()
    }

    /// Sample coordinates in track order
    pub fn coordinates(&self) -> Vec<LatLng> {
        self.samples.iter().map(GeoSample::coordinate).collect()
    }

    pub fn visuals(&self) -> &TrackVisuals {
        &self.visuals
    }

    pub(crate) fn push(&mut self, sample: GeoSample) {
        self.samples.push_back(sample);
    }

    pub(crate) fn pop_oldest(&mut self) -> Option<GeoSample> {
        self.samples.pop_front()
    }
}
