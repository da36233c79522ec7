use crate::core::{
    DisplayMode, TrackKind, DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, DEFAULT_POLL_INTERVAL_SECS,
    FIT_BOUNDS_PADDING, MAX_MAP_ZOOM, MAX_POLL_INTERVAL_SECS,
};
use crate::track::RetentionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Session-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Live polling cadence (seconds)
    pub poll_interval_secs: u64,
    /// Sample bound applied to both tracks
    pub retention: RetentionConfig,
    /// Initial display mode
    pub display_mode: DisplayMode,
    /// Track shown at startup
    pub initial_view: TrackKind,
    /// Initial map viewport
    pub map: MapConfig,
    /// Relative padding around an imported track when fitting the viewport
    pub fit_padding_ratio: f64,
    /// Switch to the import view after a successful import
    pub activate_on_import: bool,
    /// Re-centre the map on every live fix
    pub follow_live: bool,
    /// Enable debug logging
    pub debug_logging: bool,
}

/// Initial map centre and zoom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            retention: RetentionConfig::default(),
            display_mode: DisplayMode::Points,
            initial_view: TrackKind::Live,
            map: MapConfig::default(),
            fit_padding_ratio: FIT_BOUNDS_PADDING,
            activate_on_import: false,
            follow_live: true,
            debug_logging: false,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: DEFAULT_MAP_CENTER.0,
            center_lon: DEFAULT_MAP_CENTER.1,
            zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl ConfigError {
    fn invalid(parameter: &str, value: impl ToString, reason: &str) -> Self {
        ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// First error, if any
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next()
    }
}

/// Holds the active configuration and its backing file
pub struct ConfigurationManager {
    config: TrackerConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationManager {
    /// Create a manager with default settings
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
            config_file_path: None,
            is_modified: false,
        }
    }

    /// Create a manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn get_config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replace the whole configuration after validation
    pub fn update_config(&mut self, config: TrackerConfig) -> Result<(), ConfigError> {
        let validation = Self::validate_config(&config);
        if !validation.is_valid {
            return Err(validation.into_error().unwrap_or_else(|| {
                ConfigError::invalid("config", "invalid", "configuration validation failed")
            }));
        }
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from a JSON file; missing keys take defaults
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;

        let config: TrackerConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Serialization {
            message: format!("failed to parse config file '{}': {}", path_str, e),
        })?;

        let validation = Self::validate_config(&config);
        if let Some(error) = validation.into_error() {
            return Err(error);
        }

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::Serialization {
            message: format!("failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::Io {
            message: format!("failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was loaded from
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::Io {
                message: "no file path set for saving configuration".to_string(),
            }),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    // Runtime parameter adjustment; each setter returns the previous value

    pub fn set_poll_interval(&mut self, secs: u64) -> Result<u64, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::invalid("poll_interval_secs", secs, "must be at least one second"));
        }
        if secs > MAX_POLL_INTERVAL_SECS {
            return Err(ConfigError::invalid("poll_interval_secs", secs, "must be at most one day"));
        }
        let old = std::mem::replace(&mut self.config.poll_interval_secs, secs);
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_retention_enabled(&mut self, enabled: bool) -> bool {
        let old = std::mem::replace(&mut self.config.retention.enabled, enabled);
        self.is_modified = true;
        old
    }

    pub fn set_max_samples(&mut self, max_samples: usize) -> Result<usize, ConfigError> {
        if max_samples == 0 {
            return Err(ConfigError::invalid("retention.max_samples", max_samples, "must be greater than zero"));
        }
        let old = std::mem::replace(&mut self.config.retention.max_samples, max_samples);
        self.is_modified = true;
        Ok(old)
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) -> DisplayMode {
        let old = std::mem::replace(&mut self.config.display_mode, mode);
        self.is_modified = true;
        old
    }

    pub fn set_fit_padding(&mut self, ratio: f64) -> Result<f64, ConfigError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::invalid("fit_padding_ratio", ratio, "must be between 0 and 1"));
        }
        let old = std::mem::replace(&mut self.config.fit_padding_ratio, ratio);
        self.is_modified = true;
        Ok(old)
    }

    /// Check every parameter against its allowed range
    pub fn validate_config(config: &TrackerConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if config.poll_interval_secs == 0 {
            errors.push(ConfigError::invalid("poll_interval_secs", 0, "must be at least one second"));
        } else if config.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            errors.push(ConfigError::invalid(
                "poll_interval_secs",
                config.poll_interval_secs,
                "must be at most one day",
            ));
        } else if config.poll_interval_secs > 3600 {
            warnings.push(format!(
                "poll interval of {}s is unusually long for live tracking",
                config.poll_interval_secs
            ));
        }

        if config.retention.max_samples == 0 {
            errors.push(ConfigError::invalid("retention.max_samples", 0, "must be greater than zero"));
        }

        if !(0.0..=1.0).contains(&config.fit_padding_ratio) {
            errors.push(ConfigError::invalid(
                "fit_padding_ratio",
                config.fit_padding_ratio,
                "must be between 0 and 1",
            ));
        }

        if !(-90.0..=90.0).contains(&config.map.center_lat) {
            errors.push(ConfigError::invalid("map.center_lat", config.map.center_lat, "must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&config.map.center_lon) {
            errors.push(ConfigError::invalid("map.center_lon", config.map.center_lon, "must be within [-180, 180]"));
        }
        if config.map.zoom > MAX_MAP_ZOOM {
            errors.push(ConfigError::invalid("map.zoom", config.map.zoom, "must be at most 19"));
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
