//! View renderer
//!
//! Maps a track and a display mode onto surface primitives. This is the only
//! code that creates, attaches, detaches or discards primitives.

use crate::core::{DisplayMode, GeoSample, LatLng, TrackKind};
use crate::render::{GeoBounds, MapSurface, PrimitiveStyle, Viewport};
use crate::track::Track;
use tracing::{debug, trace};

/// Marker and path styles for one track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStyle {
    pub marker: PrimitiveStyle,
    pub path: PrimitiveStyle,
}

impl TrackStyle {
    pub fn for_kind(kind: TrackKind) -> Self {
        let color = match kind {
            TrackKind::Live => "blue",
            TrackKind::Import => "green",
        };
        Self {
            marker: PrimitiveStyle::marker(color),
            path: PrimitiveStyle::path(color),
        }
    }
}

/// Owns the map surface and draws tracks onto it
pub struct ViewRenderer<S: MapSurface> {
    surface: S,
    live_style: TrackStyle,
    import_style: TrackStyle,
}

impl<S: MapSurface> ViewRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            live_style: TrackStyle::for_kind(TrackKind::Live),
            import_style: TrackStyle::for_kind(TrackKind::Import),
        }
    }

    /// Read-only access for readouts and inspection
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn style(&self, kind: TrackKind) -> &TrackStyle {
        match kind {
            TrackKind::Live => &self.live_style,
            TrackKind::Import => &self.import_style,
        }
    }

    /// Show `track` in `mode`, rebuilding whatever is missing from its samples
    pub fn render(&mut self, track: &mut Track, mode: DisplayMode) {
        track.visuals.mode = mode;
        track.visuals.shown = true;
        match mode {
            DisplayMode::Points => {
                if let Some(path) = track.visuals.path {
                    self.surface.detach(path);
                }
                self.fill_missing_markers(track);
                for marker in track.visuals.markers.iter() {
                    self.surface.attach(*marker);
                }
            }
            DisplayMode::Path => {
                for marker in track.visuals.markers.iter() {
                    self.surface.detach(*marker);
                }
                let path = self.ensure_path(track);
                self.surface.attach(path);
            }
        }
        debug!(
            track = %track.kind(),
            %mode,
            samples = track.len(),
            markers = track.visuals.markers.len(),
            "rendered track"
        );
    }

    /// Draw the newest sample of an already shown track.
    ///
    /// Points mode adds exactly one marker; path mode rewrites the existing
    /// path's vertex data. A hidden track is left alone and catches up on
    /// its next activation.
    pub fn append_incremental(&mut self, track: &mut Track, mode: DisplayMode) {
        if !track.visuals.shown {
            trace!(track = %track.kind(), "track hidden, deferring draw");
            return;
        }
        if track.visuals.mode != mode {
            self.render(track, mode);
            return;
        }
        match mode {
            DisplayMode::Points => {
                // Normally a single sample is missing its marker
                let before = track.visuals.markers.len();
                self.fill_missing_markers(track);
                for marker in track.visuals.markers.iter().skip(before) {
                    self.surface.attach(*marker);
                }
            }
            DisplayMode::Path => {
                let path = self.ensure_path(track);
                self.surface.attach(path);
            }
        }
    }

    /// Attach every primitive applicable to the track's last-rendered mode
    pub fn activate(&mut self, track: &mut Track) {
        let mode = track.visuals.mode;
        self.render(track, mode);
    }

    /// Detach all of the track's primitives, keeping them for reuse
    pub fn deactivate(&mut self, track: &mut Track) {
        for marker in track.visuals.markers.iter() {
            self.surface.detach(*marker);
        }
        if let Some(path) = track.visuals.path {
            self.surface.detach(path);
        }
        track.visuals.shown = false;
        debug!(track = %track.kind(), "track detached");
    }

    /// Drop the marker belonging to the sample that was just evicted
    pub(crate) fn discard_oldest_marker(&mut self, track: &mut Track) {
        if let Some(marker) = track.visuals.markers.pop_front() {
            self.surface.discard(marker);
        }
    }

    /// Bring a path-mode track's vertices back in line with its samples
    pub(crate) fn resync_path(&mut self, track: &Track) {
        if track.visuals.mode != DisplayMode::Path {
            return;
        }
        if let Some(path) = track.visuals.path {
            self.surface.set_path_vertices(path, &track.coordinates());
        }
    }

    pub fn fit_bounds(&mut self, bounds: &GeoBounds) {
        self.surface.fit_bounds(bounds);
    }

    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.surface.set_view(center, zoom);
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    fn fill_missing_markers(&mut self, track: &mut Track) {
        let style = self.style(track.kind()).marker.clone();
        let have = track.visuals.markers.len();
        let missing: Vec<LatLng> = track
            .samples
            .iter()
            .skip(have)
            .map(GeoSample::coordinate)
            .collect();
        for at in missing {
            let marker = self.surface.create_marker(at, &style);
            track.visuals.markers.push_back(marker);
        }
    }

    fn ensure_path(&mut self, track: &mut Track) -> crate::render::PrimitiveId {
        let vertices = track.coordinates();
        match track.visuals.path {
            Some(path) => {
                self.surface.set_path_vertices(path, &vertices);
                path
            }
            None => {
                let style = self.style(track.kind()).path.clone();
                let path = self.surface.create_path(&vertices, &style);
                track.visuals.path = Some(path);
                path
            }
        }
    }
}
