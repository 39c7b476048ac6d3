//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! forecast-chart.toml file: the time zone that decides where calendar days
//! start, the peak label threshold, and which document to chart.

use crate::chart::ChartOptions;
use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "forecast-chart.toml";

/// Errors raised while turning configuration values into runtime types.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The `timezone` setting is not an IANA zone name
    #[error("unknown time zone: {0}")]
    UnknownTimezone(String),

    /// Writing the configuration failed
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the configuration failed
    #[error("config format: {0}")]
    Format(#[from] toml::ser::Error),

    /// `stagger_window_minutes` does not fit a duration
    #[error("stagger window of {0} minutes is out of range")]
    InvalidStaggerWindow(i64),
}

/// Application configuration loaded from forecast-chart.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Chart and annotation settings
    pub chart: ChartConfig,
    /// Which document to read
    pub source: SourceConfig,
}

/// Chart and annotation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChartConfig {
    /// IANA time zone used for calendar days (e.g. "Europe/Vilnius")
    pub timezone: String,
    /// Minimum temperature swing (°C) for a reversal to get a value label
    pub peak_threshold: f64,
    /// Entries closer than this many minutes get staggered condition icons
    pub stagger_window_minutes: i64,
}

/// Kind of document the source path points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Forecast,
    Observations,
}

/// Input document configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub mode: SourceMode,
    /// Document(s) read when none are given on the command line
    pub paths: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chart: ChartConfig {
                timezone: "Europe/Vilnius".to_string(),
                peak_threshold: 1.0,
                stagger_window_minutes: 60,
            },
            source: SourceConfig {
                mode: SourceMode::Forecast,
                paths: vec![PathBuf::from("forecast.json")],
            },
        }
    }
}

impl ChartConfig {
    /// Resolve the configured time zone name
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn options(&self) -> Result<ChartOptions, ConfigError> {
        let stagger_window = Duration::try_minutes(self.stagger_window_minutes)
            .ok_or(ConfigError::InvalidStaggerWindow(self.stagger_window_minutes))?;
        Ok(ChartOptions {
            peak_threshold: self.peak_threshold,
            stagger_window,
        })
    }
}

impl Config {
    /// Load configuration from forecast-chart.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        tz = %config.chart.timezone,
                        "loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!("Invalid config file format: {e}");
                    tracing::warn!("Using default configuration (Europe/Vilnius)");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        tracing::info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
