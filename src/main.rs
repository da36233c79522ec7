use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trackview::ingest::read_rows_from_path;
use trackview::stats::format_snapshot;
use trackview::{
    ConfigurationManager, DisplayMode, InMemorySurface, LatLng, LivePoller, OutputFormat, RetentionConfig,
    SessionEvent, SimulatedSource, TrackKind, TrackManager,
};

/// Run a track session against an in-memory map and print its statistics
#[derive(Parser, Debug)]
#[command(name = "trackview", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV file to load into the import track
    #[arg(long)]
    import: Option<PathBuf>,

    /// Number of simulated live polls
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Display mode (points|path)
    #[arg(long)]
    mode: Option<DisplayMode>,

    /// Track to show at the end (live|import)
    #[arg(long)]
    view: Option<TrackKind>,

    /// Keep at most this many samples per track
    #[arg(long)]
    limit: Option<usize>,

    /// Statistics output (text|json|csv)
    #[arg(long, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Seed for the simulated live source
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_manager = match &cli.config {
        Some(path) => ConfigurationManager::from_file(path)?,
        None => ConfigurationManager::new(),
    };
    let config = config_manager.get_config().clone();

    let default_level = if config.debug_logging { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();

    for warning in ConfigurationManager::validate_config(&config).warnings {
        tracing::warn!("{}", warning);
    }

    let mut manager = TrackManager::new(InMemorySurface::default(), &config);

    if let Some(mode) = cli.mode {
        manager.enqueue(SessionEvent::SetMode(mode));
    }
    if let Some(limit) = cli.limit {
        manager.enqueue(SessionEvent::SetRetention(RetentionConfig::limited(limit)));
    }
    if let Some(path) = &cli.import {
        info!(path = %path.display(), "loading import file");
        manager.enqueue(SessionEvent::ImportCompleted(read_rows_from_path(path)));
    }
    manager.process();
    if let Some(error) = manager.last_import_error() {
        eprintln!("Import failed: {}", error);
    }

    if cli.ticks > 0 {
        let start = LatLng::new(config.map.center_lat, config.map.center_lon);
        let source = match cli.seed {
            Some(seed) => SimulatedSource::seeded(start.lat, start.lon, seed),
            None => SimulatedSource::new(start.lat, start.lon),
        };
        let mut poller = LivePoller::new(source, config.poll_interval_secs);
        let mut now = Utc::now();
        for _ in 0..cli.ticks {
            if let Some(outcome) = poller.tick(now) {
                manager.enqueue(SessionEvent::PollCompleted {
                    outcome,
                    received_at: now,
                });
                manager.enqueue(SessionEvent::StatusCompleted(poller.poll_status()));
                manager.process();
            }
            now += poller.interval();
        }
        let (polls, failures) = poller.counters();
        info!(polls, failures, status_failures = poller.status_failures(), "live polling finished");
    }

    if let Some(view) = cli.view {
        manager.enqueue(SessionEvent::SwitchView(view));
        manager.process();
    }

    if let Some(position) = manager.current_position() {
        info!(
            lat = position.lat,
            lon = position.lon,
            altitude = ?position.altitude,
            location = ?position.location,
            "current position"
        );
    }

    if let Some(status) = manager.tracker_status() {
        info!(
            online = status.online,
            battery = ?status.battery,
            signal = ?status.signal_strength,
            device = ?status.device_id,
            "tracker status"
        );
    }

    println!("{}", format_snapshot(manager.statistics(), cli.format)?);
    Ok(())
}
