//! Geodetic constants and session defaults

/// Mean Earth radius used for great-circle distances (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default live polling cadence (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Longest accepted polling cadence (one day)
pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

/// Default retention bound when the limit is switched on
pub const DEFAULT_MAX_SAMPLES: usize = 50;

/// Relative padding applied around an imported track when fitting the viewport
pub const FIT_BOUNDS_PADDING: f64 = 0.1;

/// Zoom level used when re-centering on the current live fix
pub const FOCUS_ZOOM: u8 = 15;

/// Initial map centre (Berlin)
pub const DEFAULT_MAP_CENTER: (f64, f64) = (52.520008, 13.404954);
pub const DEFAULT_MAP_ZOOM: u8 = 13;
pub const MAX_MAP_ZOOM: u8 = 19;
