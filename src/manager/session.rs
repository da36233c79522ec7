//! Track manager: owns both tracks and coordinates every mutation

use crate::core::{DisplayMode, GeoSample, LatLng, TrackKind, FOCUS_ZOOM};
use crate::ingest::{
    read_rows_from_path, ImportAdapter, ImportError, ImportResult, PollOutcome, RawPositionRecord, Row, StatusOutcome,
    TrackerStatus,
};
use crate::manager::{EventQueue, SessionEvent};
use crate::render::{GeoBounds, MapSurface, ViewRenderer};
use crate::stats::{self, StatisticsSnapshot};
use crate::track::{self, RetentionConfig, Track};
use crate::utils::TrackerConfig;
use crate::validation::SampleValidator;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Counts produced by one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Samples appended to the import track
    pub accepted: usize,
    /// Samples refused by validation
    pub rejected: usize,
    /// Samples removed from the import track by retention
    pub evicted: usize,
    /// Rows without usable coordinates
    pub dropped_rows: usize,
}

/// Session state for the two tracks and the map they are drawn on.
///
/// Single writer: every change to samples or primitives goes through one
/// of the methods below and runs to completion before the next.
pub struct TrackManager<S: MapSurface> {
    live: Track,
    import: Track,
    active_view: TrackKind,
    mode: DisplayMode,
    retention: RetentionConfig,
    renderer: ViewRenderer<S>,
    validator: SampleValidator,
    adapter: ImportAdapter,
    statistics: StatisticsSnapshot,
    current_position: Option<RawPositionRecord>,
    tracker_status: Option<TrackerStatus>,
    follow: bool,
    fit_padding: f64,
    activate_on_import: bool,
    last_import_error: Option<ImportError>,
    events: EventQueue,
}

impl<S: MapSurface> TrackManager<S> {
    /// Create a session drawing on `surface`, showing the configured view
    pub fn new(surface: S, config: &TrackerConfig) -> Self {
        let mut renderer = ViewRenderer::new(surface);
        renderer.set_view(LatLng::new(config.map.center_lat, config.map.center_lon), config.map.zoom);

        let mut manager = Self {
            live: Track::new(TrackKind::Live),
            import: Track::new(TrackKind::Import),
            active_view: config.initial_view,
            mode: config.display_mode,
            retention: config.retention,
            renderer,
            validator: SampleValidator::new(),
            adapter: ImportAdapter::new(),
            statistics: StatisticsSnapshot::default(),
            current_position: None,
            tracker_status: None,
            follow: config.follow_live,
            fit_padding: config.fit_padding_ratio,
            activate_on_import: config.activate_on_import,
            last_import_error: None,
            events: EventQueue::new(),
        };

        let mode = manager.mode;
        let inactive = manager.active_view.other();
        manager.track_mut(inactive).visuals.mode = mode;
        let (active, renderer) = manager.split(manager.active_view);
        renderer.render(active, mode);

        info!(view = %manager.active_view, %mode, retention = ?manager.retention, "track session started");
        manager
    }

    pub fn with_defaults(surface: S) -> Self {
        Self::new(surface, &TrackerConfig::default())
    }

    pub fn active_view(&self) -> TrackKind {
        self.active_view
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn retention(&self) -> RetentionConfig {
        self.retention
    }

    pub fn track(&self, kind: TrackKind) -> &Track {
        match kind {
            TrackKind::Live => &self.live,
            TrackKind::Import => &self.import,
        }
    }

    pub fn active_track(&self) -> &Track {
        self.track(self.active_view)
    }

    /// Statistics of the active track as of the last mutation
    pub fn statistics(&self) -> &StatisticsSnapshot {
        &self.statistics
    }

    /// Latest raw live record, kept even while the live track is hidden
    pub fn current_position(&self) -> Option<&RawPositionRecord> {
        self.current_position.as_ref()
    }

    /// Latest device status; kept when a later status poll fails
    pub fn tracker_status(&self) -> Option<&TrackerStatus> {
        self.tracker_status.as_ref()
    }

    pub fn renderer(&self) -> &ViewRenderer<S> {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn into_surface(self) -> S {
        self.renderer.into_surface()
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn last_import_error(&self) -> Option<&ImportError> {
        self.last_import_error.as_ref()
    }

    /// Validate and append one live sample.
    ///
    /// Invalid samples are logged and dropped. Returns whether the sample
    /// was stored.
    pub fn append_live(&mut self, sample: GeoSample) -> bool {
        let sample = match self.validator.validate(sample) {
            Ok(sample) => sample,
            Err(error) => {
                warn!(%error, "live sample rejected");
                return false;
            }
        };
        let coordinate = sample.coordinate();
        let retention = self.retention;
        let mode = self.mode;
        let shown = self.active_view == TrackKind::Live;
        let follow = self.follow;

        let (live, renderer) = self.split(TrackKind::Live);
        live.push(sample);
        track::enforce(live, &retention, renderer);

        if shown {
            renderer.append_incremental(live, mode);
            if follow {
                let zoom = renderer.viewport().zoom;
                renderer.set_view(coordinate, zoom);
            }
            self.refresh_statistics();
        }
        debug!(samples = self.live.len(), shown, "live sample appended");
        true
    }

    /// Record a raw live fix and append it; `received_at` stands in for a
    /// missing or unreadable timestamp
    pub fn ingest_live_record(&mut self, record: RawPositionRecord, received_at: DateTime<Utc>) -> bool {
        let sample = record.to_sample(received_at);
        self.current_position = Some(record);
        self.append_live(sample)
    }

    /// Apply the result of one live poll; failures leave the session untouched
    pub fn handle_poll(&mut self, outcome: PollOutcome, received_at: DateTime<Utc>) -> bool {
        match outcome {
            Ok(Some(record)) => self.ingest_live_record(record, received_at),
            Ok(None) => false,
            Err(error) => {
                warn!(%error, "live source unavailable, keeping current state");
                false
            }
        }
    }

    /// Apply the result of one status poll; returns whether the status changed
    pub fn handle_status(&mut self, outcome: StatusOutcome) -> bool {
        match outcome {
            Ok(Some(status)) => {
                debug!(online = status.online, battery = ?status.battery, "tracker status updated");
                self.tracker_status = Some(status);
                true
            }
            Ok(None) => false,
            Err(error) => {
                warn!(%error, "tracker status unavailable, keeping last known");
                false
            }
        }
    }

    /// Validate and append a batch to the import track, then frame it
    pub fn append_import_batch(&mut self, samples: Vec<GeoSample>) -> ImportReport {
        let validation = self.validator.validate_batch(samples);
        for (sample, error) in &validation.rejected_samples {
            debug!(lat = sample.latitude, lon = sample.longitude, %error, "import sample rejected");
        }
        let mut report = ImportReport {
            accepted: validation.valid_samples.len(),
            rejected: validation.rejected_count(),
            ..ImportReport::default()
        };

        let bounds = GeoBounds::from_coordinates(validation.valid_samples.iter().map(GeoSample::coordinate));
        let retention = self.retention;
        let (import, renderer) = self.split(TrackKind::Import);
        for sample in validation.valid_samples {
            import.push(sample);
        }
        report.evicted = track::enforce(import, &retention, renderer);

        if let Some(bounds) = bounds {
            let padded = bounds.padded(self.fit_padding);
            self.renderer.fit_bounds(&padded);
        }

        if self.activate_on_import && report.accepted > 0 && self.active_view != TrackKind::Import {
            self.switch_view(TrackKind::Import);
        } else if self.active_view == TrackKind::Import {
            let mode = self.mode;
            let (import, renderer) = self.split(TrackKind::Import);
            renderer.render(import, mode);
            self.refresh_statistics();
        }

        if report.rejected > 0 {
            warn!(rejected = report.rejected, "import batch contained invalid samples");
        }
        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            evicted = report.evicted,
            samples = self.import.len(),
            "import batch appended"
        );
        report
    }

    /// Convert parsed rows and append them; nothing changes on error
    pub fn import_rows(&mut self, rows: &[Row]) -> ImportResult<ImportReport> {
        let batch = self.adapter.convert(rows)?;
        debug!(
            rows = batch.total_rows,
            dropped = batch.dropped_rows,
            mapping = ?batch.mapping,
            "rows ready for import"
        );
        let dropped_rows = batch.dropped_rows;
        let mut report = self.append_import_batch(batch.samples);
        report.dropped_rows = dropped_rows;
        Ok(report)
    }

    /// Read a CSV file and import its rows
    pub fn import_csv_file<P: AsRef<Path>>(&mut self, path: P) -> ImportResult<ImportReport> {
        let rows = read_rows_from_path(path)?;
        self.import_rows(&rows)
    }

    /// Make `target` the visible track
    pub fn switch_view(&mut self, target: TrackKind) {
        if target == self.active_view {
            return;
        }
        let previous = self.active_view;
        let (current, renderer) = self.split(previous);
        renderer.deactivate(current);

        self.active_view = target;
        let (next, renderer) = self.split(target);
        renderer.activate(next);
        self.refresh_statistics();
        info!(from = %previous, to = %target, "view switched");
    }

    /// Change the display mode; only the active track is redrawn
    pub fn set_mode(&mut self, mode: DisplayMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        let inactive = self.active_view.other();
        self.track_mut(inactive).visuals.mode = mode;
        let (active, renderer) = self.split(self.active_view);
        renderer.render(active, mode);
        info!(%mode, "display mode changed");
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    /// Apply a new retention bound to both tracks at once.
    ///
    /// Returns the number of samples evicted across both tracks.
    pub fn set_retention(&mut self, config: RetentionConfig) -> usize {
        self.retention = config;
        let (live, renderer) = self.split(TrackKind::Live);
        let live_evicted = track::enforce(live, &config, renderer);
        let (import, renderer) = self.split(TrackKind::Import);
        let import_evicted = track::enforce(import, &config, renderer);

        let active_evicted = match self.active_view {
            TrackKind::Live => live_evicted,
            TrackKind::Import => import_evicted,
        };
        if active_evicted > 0 {
            self.refresh_statistics();
        }
        info!(?config, live_evicted, import_evicted, "retention updated");
        live_evicted + import_evicted
    }

    /// Toggle re-centring on new live fixes; returns the previous setting
    pub fn set_follow(&mut self, follow: bool) -> bool {
        std::mem::replace(&mut self.follow, follow)
    }

    /// Centre the map on the current position at street zoom
    pub fn center_on_current(&mut self) -> Option<LatLng> {
        let target = self
            .current_position
            .as_ref()
            .and_then(|record| self.validator.validate(GeoSample::new(record.lat, record.lon)).ok())
            .or_else(|| self.live.last().cloned())
            .map(|sample| sample.coordinate())?;
        self.renderer.set_view(target, FOCUS_ZOOM);
        Some(target)
    }

    /// Queue an event for the next [`process`](Self::process) call
    pub fn enqueue(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Dispatch queued events in arrival order; returns how many ran
    pub fn process(&mut self) -> usize {
        let mut handled = 0;
        while let Some(envelope) = self.events.pop() {
            debug!(event = %envelope.event, queued_at = %envelope.arrived_at, "dispatching event");
            self.dispatch(envelope.event);
            handled += 1;
        }
        handled
    }

    fn dispatch(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::PollCompleted { outcome, received_at } => {
                self.handle_poll(outcome, received_at);
            }
            SessionEvent::StatusCompleted(outcome) => {
                self.handle_status(outcome);
            }
            SessionEvent::ImportCompleted(rows) => {
                match rows.and_then(|rows| self.import_rows(&rows)) {
                    Ok(_) => self.last_import_error = None,
                    Err(error) => {
                        warn!(%error, "import rejected");
                        self.last_import_error = Some(error);
                    }
                }
            }
            SessionEvent::SwitchView(target) => self.switch_view(target),
            SessionEvent::SetMode(mode) => self.set_mode(mode),
            SessionEvent::SetRetention(config) => {
                self.set_retention(config);
            }
        }
    }

    fn refresh_statistics(&mut self) {
        self.statistics = stats::compute(self.track(self.active_view));
    }

    fn track_mut(&mut self, kind: TrackKind) -> &mut Track {
        match kind {
            TrackKind::Live => &mut self.live,
            TrackKind::Import => &mut self.import,
        }
    }

    fn split(&mut self, kind: TrackKind) -> (&mut Track, &mut ViewRenderer<S>) {
        let track = match kind {
            TrackKind::Live => &mut self.live,
            TrackKind::Import => &mut self.import,
        };
        (track, &mut self.renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{LivePoller, ScriptedSource, SourceError};
    use crate::render::InMemorySurface;
    use chrono::TimeZone;

    fn manager() -> TrackManager<InMemorySurface> {
        TrackManager::with_defaults(InMemorySurface::default())
    }

    fn sample(i: usize) -> GeoSample {
        GeoSample::new(50.0 + i as f64 * 0.001, 10.0 + i as f64 * 0.001)
    }

    fn example_rows() -> Vec<Row> {
        vec![
            Row::new()
                .with("lat", 52.5)
                .with("lon", 13.4)
                .with("time", "2024-01-01T00:00:00Z")
                .with("speed", 10.0),
            Row::new()
                .with("lat", 52.51)
                .with("lon", 13.41)
                .with("time", "2024-01-01T00:05:00Z")
                .with("speed", 20.0),
        ]
    }

    #[test]
    fn test_initial_state() {
        let manager = manager();
        assert_eq!(manager.active_view(), TrackKind::Live);
        assert_eq!(manager.mode(), DisplayMode::Points);
        assert!(manager.track(TrackKind::Live).visuals().is_shown());
        assert!(!manager.track(TrackKind::Import).visuals().is_shown());
        assert_eq!(manager.statistics(), &StatisticsSnapshot::default());
    }

    #[test]
    fn test_unbounded_appends_keep_order() {
        let mut manager = manager();
        for i in 0..5 {
            assert!(manager.append_live(sample(i)));
        }
        assert!(!manager.append_live(GeoSample::new(120.0, 0.0)));
        assert!(!manager.append_live(GeoSample::new(f64::NAN, 0.0)));

        let live = manager.track(TrackKind::Live);
        assert_eq!(live.len(), 5);
        let lats: Vec<f64> = live.samples().iter().map(|s| s.latitude).collect();
        assert_eq!(lats, (0..5).map(|i| sample(i).latitude).collect::<Vec<_>>());
        assert_eq!(manager.surface().attached_marker_count(), 5);
        assert_eq!(manager.statistics().point_count, 5);
    }

    #[test]
    fn test_retention_keeps_most_recent() {
        let mut manager = manager();
        manager.set_retention(RetentionConfig::limited(3));
        for i in 0..10 {
            manager.append_live(sample(i));
        }
        let live = manager.track(TrackKind::Live);
        assert_eq!(live.len(), 3);
        assert_eq!(live.first().unwrap().latitude, sample(7).latitude);
        assert_eq!(live.last().unwrap().latitude, sample(9).latitude);
        assert_eq!(manager.surface().attached_marker_count(), 3);
        assert_eq!(manager.surface().primitive_count(), 3);
        assert_eq!(
            manager.surface().attached_marker_positions(),
            live.coordinates()
        );
    }

    #[test]
    fn test_retention_in_path_mode_resyncs_vertices() {
        let mut manager = manager();
        manager.set_mode(DisplayMode::Path);
        manager.set_retention(RetentionConfig::limited(4));
        for i in 0..9 {
            manager.append_live(sample(i));
        }
        let live = manager.track(TrackKind::Live);
        assert_eq!(manager.surface().attached_path_count(), 1);
        assert_eq!(manager.surface().attached_marker_count(), 0);
        assert_eq!(manager.surface().attached_path_vertices().unwrap(), live.coordinates());
    }

    #[test]
    fn test_lowering_retention_trims_immediately() {
        let mut manager = manager();
        for i in 0..8 {
            manager.append_live(sample(i));
        }
        manager.import_rows(&example_rows()).unwrap();

        let evicted = manager.set_retention(RetentionConfig::limited(2));
        assert_eq!(evicted, 6);
        assert_eq!(manager.track(TrackKind::Live).len(), 2);
        assert_eq!(manager.track(TrackKind::Import).len(), 2);
        assert_eq!(manager.statistics().point_count, 2);
        assert_eq!(manager.surface().attached_marker_count(), 2);
    }

    #[test]
    fn test_tightening_enabled_retention() {
        let mut manager = manager();
        manager.set_retention(RetentionConfig::limited(5));
        for i in 0..8 {
            manager.append_live(sample(i));
        }
        assert_eq!(manager.track(TrackKind::Live).len(), 5);

        let evicted = manager.set_retention(RetentionConfig::limited(2));
        assert_eq!(evicted, 3);

        let live = manager.track(TrackKind::Live);
        assert_eq!(live.len(), 2);
        assert_eq!(live.first().unwrap().latitude, sample(6).latitude);
        assert_eq!(live.visuals().marker_count(), 2);
        assert_eq!(manager.surface().attached_marker_positions(), live.coordinates());
        assert_eq!(manager.surface().primitive_count(), 2);
        assert_eq!(manager.statistics().point_count, 2);
    }

    #[test]
    fn test_view_round_trip_restores_state() {
        let mut manager = manager();
        for i in 0..4 {
            manager.append_live(sample(i));
        }
        manager.import_rows(&example_rows()).unwrap();

        let attached = manager.surface().attached_ids().clone();
        let stats = manager.statistics().clone();

        manager.switch_view(TrackKind::Import);
        assert_ne!(manager.surface().attached_ids(), &attached);
        assert_eq!(manager.statistics().point_count, 2);

        manager.switch_view(TrackKind::Live);
        assert_eq!(manager.surface().attached_ids(), &attached);
        assert_eq!(manager.statistics(), &stats);
    }

    #[test]
    fn test_switch_to_active_view_is_noop() {
        let mut manager = manager();
        manager.append_live(sample(0));
        let attached = manager.surface().attached_ids().clone();
        manager.switch_view(TrackKind::Live);
        assert_eq!(manager.surface().attached_ids(), &attached);
    }

    #[test]
    fn test_mode_round_trip() {
        let mut manager = manager();
        for i in 0..6 {
            manager.append_live(sample(i));
        }
        let stats = manager.statistics().clone();

        manager.set_mode(DisplayMode::Path);
        assert_eq!(manager.surface().attached_marker_count(), 0);
        assert_eq!(manager.surface().attached_path_count(), 1);

        manager.set_mode(DisplayMode::Points);
        assert_eq!(manager.surface().attached_marker_count(), 6);
        assert_eq!(manager.surface().attached_path_count(), 0);
        assert_eq!(manager.statistics(), &stats);
    }

    #[test]
    fn test_import_rows_example() {
        let mut manager = manager();
        let report = manager.import_rows(&example_rows()).unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 0);
        assert_eq!(manager.track(TrackKind::Import).len(), 2);

        manager.switch_view(TrackKind::Import);
        let stats = manager.statistics();
        assert_eq!(stats.point_count, 2);
        assert_eq!(stats.max_speed, Some(20.0));
        assert_eq!(stats.duration_text, "0h 5m");
        assert!(stats.distance_km > 0.0);
    }

    #[test]
    fn test_missing_coordinate_columns_rejects_batch() {
        let mut manager = manager();
        manager.import_rows(&example_rows()).unwrap();
        let before = manager.track(TrackKind::Import).coordinates();

        let rows = vec![Row::new().with("name", "a").with("speed", 3.0)];
        let result = manager.import_rows(&rows);

        assert!(matches!(result, Err(ImportError::ColumnDetectionFailure { .. })));
        assert_eq!(manager.track(TrackKind::Import).coordinates(), before);
    }

    #[test]
    fn test_import_fits_viewport() {
        let mut manager = manager();
        manager.import_rows(&example_rows()).unwrap();
        let fit = manager.surface().last_fit().unwrap();
        assert!(fit.contains(LatLng::new(52.5, 13.4)));
        assert!(fit.contains(LatLng::new(52.51, 13.41)));
        assert!(fit.south() < 52.5);
    }

    #[test]
    fn test_import_without_valid_samples_keeps_viewport() {
        let mut manager = manager();
        let report = manager.append_import_batch(vec![GeoSample::new(95.0, 0.0)]);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected, 1);
        assert!(manager.surface().last_fit().is_none());
    }

    #[test]
    fn test_import_while_live_active_stays_hidden() {
        let mut manager = manager();
        manager.append_live(sample(0));
        manager.import_rows(&example_rows()).unwrap();
        assert_eq!(manager.active_view(), TrackKind::Live);
        assert_eq!(manager.surface().attached_marker_count(), 1);
        assert_eq!(manager.statistics().point_count, 1);
    }

    #[test]
    fn test_import_while_import_active_rerenders() {
        let mut manager = manager();
        manager.switch_view(TrackKind::Import);
        manager.import_rows(&example_rows()).unwrap();
        assert_eq!(manager.surface().attached_marker_count(), 2);
        assert_eq!(manager.statistics().max_speed, Some(20.0));
    }

    #[test]
    fn test_activate_on_import() {
        let config = TrackerConfig {
            activate_on_import: true,
            ..TrackerConfig::default()
        };
        let mut manager = TrackManager::new(InMemorySurface::default(), &config);
        manager.import_rows(&example_rows()).unwrap();
        assert_eq!(manager.active_view(), TrackKind::Import);
        assert_eq!(manager.statistics().point_count, 2);
    }

    #[test]
    fn test_hidden_live_appends_catch_up() {
        let mut manager = manager();
        manager.switch_view(TrackKind::Import);
        for i in 0..3 {
            manager.append_live(sample(i));
        }
        assert_eq!(manager.surface().primitive_count(), 0);
        assert_eq!(manager.statistics().point_count, 0);

        manager.switch_view(TrackKind::Live);
        assert_eq!(manager.surface().attached_marker_count(), 3);
        assert_eq!(manager.statistics().point_count, 3);
    }

    #[test]
    fn test_mode_change_reaches_inactive_track_on_activation() {
        let mut manager = manager();
        manager.append_live(sample(0));
        manager.append_live(sample(1));
        manager.switch_view(TrackKind::Import);
        manager.set_mode(DisplayMode::Path);
        assert_eq!(manager.track(TrackKind::Live).visuals().mode(), DisplayMode::Path);
        assert_eq!(manager.surface().attached_ids().len(), 1);

        manager.switch_view(TrackKind::Live);
        assert_eq!(manager.surface().attached_path_count(), 1);
        assert_eq!(manager.surface().attached_marker_count(), 0);
        assert_eq!(
            manager.surface().attached_path_vertices().unwrap(),
            manager.track(TrackKind::Live).coordinates()
        );
    }

    #[test]
    fn test_follow_recentres_on_live_fix() {
        let mut manager = manager();
        manager.append_live(GeoSample::new(48.1, 11.5));
        assert_eq!(manager.surface().viewport().center, LatLng::new(48.1, 11.5));

        assert!(manager.set_follow(false));
        manager.append_live(GeoSample::new(48.2, 11.6));
        assert_eq!(manager.surface().viewport().center, LatLng::new(48.1, 11.5));
    }

    #[test]
    fn test_center_on_current() {
        let mut manager = manager();
        assert!(manager.center_on_current().is_none());

        manager.switch_view(TrackKind::Import);
        let received = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        manager.ingest_live_record(RawPositionRecord::new(47.0, 8.0), received);
        assert_eq!(manager.current_position().unwrap().lat, 47.0);

        assert_eq!(manager.center_on_current(), Some(LatLng::new(47.0, 8.0)));
        assert_eq!(manager.surface().viewport().zoom, FOCUS_ZOOM);
    }

    #[test]
    fn test_live_record_without_timestamp_uses_receive_time() {
        let mut manager = manager();
        let received = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        manager.ingest_live_record(RawPositionRecord::new(47.0, 8.0), received);
        assert_eq!(manager.track(TrackKind::Live).last().unwrap().timestamp, Some(received));
    }

    #[test]
    fn test_failed_poll_leaves_state_unchanged() {
        let mut manager = manager();
        manager.append_live(sample(0));
        let stats = manager.statistics().clone();

        let outcome = Err(SourceError::Unavailable {
            reason: "timeout".to_string(),
        });
        assert!(!manager.handle_poll(outcome, Utc::now()));
        assert!(!manager.handle_poll(Ok(None), Utc::now()));
        assert_eq!(manager.track(TrackKind::Live).len(), 1);
        assert_eq!(manager.statistics(), &stats);
    }

    #[test]
    fn test_poller_feeds_manager() {
        let mut source = ScriptedSource::new();
        source.push_record(RawPositionRecord::new(52.0, 13.0));
        source.push_failure("offline");
        source.push_record(RawPositionRecord::new(52.001, 13.001));
        let mut poller = LivePoller::new(source, 5);
        let mut manager = manager();

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for tick in 0..3 {
            let now = start + chrono::Duration::seconds(5 * tick);
            if let Some(outcome) = poller.tick(now) {
                manager.handle_poll(outcome, now);
            }
        }
        assert_eq!(manager.track(TrackKind::Live).len(), 2);
        assert_eq!(poller.counters(), (3, 1));
    }

    #[test]
    fn test_tracker_status_kept_on_failure() {
        let mut source = ScriptedSource::new();
        let mut status = TrackerStatus::online("GPS-TRACKER-001");
        status.battery = Some(80);
        source.push_status(status.clone());
        source.push_status_failure("offline");
        source.push_record(RawPositionRecord::new(52.0, 13.0));
        let mut poller = LivePoller::new(source, 5);
        let mut manager = manager();
        assert!(manager.tracker_status().is_none());

        let now = Utc::now();
        manager.switch_view(TrackKind::Import);
        assert!(manager.handle_status(poller.poll_status()));
        assert_eq!(manager.tracker_status(), Some(&status));

        assert!(!manager.handle_status(poller.poll_status()));
        assert_eq!(manager.tracker_status(), Some(&status));
        assert_eq!(poller.status_failures(), 1);

        assert!(!manager.handle_status(poller.poll_status()));
        assert_eq!(manager.tracker_status(), Some(&status));

        if let Some(outcome) = poller.tick(now) {
            manager.handle_poll(outcome, now);
        }
        assert_eq!(manager.track(TrackKind::Live).len(), 1);
    }

    #[test]
    fn test_status_event_updates_session() {
        let mut manager = manager();
        manager.enqueue(SessionEvent::StatusCompleted(Ok(Some(TrackerStatus::online("dev-7")))));
        manager.enqueue(SessionEvent::StatusCompleted(Err(SourceError::Unavailable {
            reason: "timeout".to_string(),
        })));
        assert_eq!(manager.process(), 2);
        assert_eq!(
            manager.tracker_status().and_then(|s| s.device_id.as_deref()),
            Some("dev-7")
        );
    }

    #[test]
    fn test_events_dispatch_in_order() {
        let mut manager = manager();
        manager.enqueue(SessionEvent::PollCompleted {
            outcome: Ok(Some(RawPositionRecord::new(52.0, 13.0))),
            received_at: Utc::now(),
        });
        manager.enqueue(SessionEvent::ImportCompleted(Ok(example_rows())));
        manager.enqueue(SessionEvent::SwitchView(TrackKind::Import));
        manager.enqueue(SessionEvent::SetMode(DisplayMode::Path));
        manager.enqueue(SessionEvent::SetRetention(RetentionConfig::limited(1)));
        assert_eq!(manager.pending_events(), 5);

        assert_eq!(manager.process(), 5);
        assert_eq!(manager.pending_events(), 0);
        assert_eq!(manager.active_view(), TrackKind::Import);
        assert_eq!(manager.mode(), DisplayMode::Path);
        assert_eq!(manager.track(TrackKind::Import).len(), 1);
        assert_eq!(manager.statistics().point_count, 1);
        assert_eq!(manager.surface().attached_path_count(), 1);
    }

    #[test]
    fn test_failed_import_event_is_recorded() {
        let mut manager = manager();
        manager.enqueue(SessionEvent::ImportCompleted(Err(ImportError::NoRows)));
        manager.process();
        assert!(matches!(manager.last_import_error(), Some(ImportError::NoRows)));

        manager.enqueue(SessionEvent::ImportCompleted(Ok(example_rows())));
        manager.process();
        assert!(manager.last_import_error().is_none());
    }
}
