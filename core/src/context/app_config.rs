//! Persisted application configuration.

use super::install::{DEFAULT_INSTALL_BASE, locate_game_dir};
use crate::error::{ConfigError, InstallError};
use caster_types::{OutputMarkers, Timings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Name the config is stored under (`<config dir>/caster/`).
pub const APP_NAME: &str = "caster";

const API_KEY_ENV: &str = "RIOT_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Platform id matches are polled on, e.g. `EUW1`.
    pub region: String,
    pub locale: String,
    pub install_base: PathBuf,
    /// Explicit client directory; skips discovery under `install_base`.
    pub game_dir: Option<PathBuf>,
    pub executable: String,
    /// Observer endpoint override; defaults to the region's spectator host.
    pub observer_host: Option<String>,
    pub observer_port: u16,
    pub timings: Timings,
    /// Crash relaunches per session, 5 when not set.
    pub max_launch_retries: Option<u32>,
    /// Clear duplicate suppression after a replay download failure so the
    /// next poll tries the same match again.
    pub requeue_failed_downloads: bool,
    pub markers: OutputMarkers,
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: "EUW1".to_string(),
            locale: "en_GB".to_string(),
            install_base: PathBuf::from(DEFAULT_INSTALL_BASE),
            game_dir: None,
            executable: "League of Legends.exe".to_string(),
            observer_host: None,
            observer_port: 80,
            timings: Timings::default(),
            max_launch_retries: Some(5),
            requeue_failed_downloads: true,
            markers: OutputMarkers::default(),
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Load the stored config, falling back to defaults if it is unreadable.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Using default config");
                Self::default()
            }
        }
    }

    pub fn try_load() -> Result<Self, ConfigError> {
        confy::load(APP_NAME, None).map_err(ConfigError::Load)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, self).map_err(ConfigError::Save)
    }

    pub fn path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, None).ok()
    }

    /// Configured key, or the `RIOT_API_KEY` environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// Directory the spectator client runs from.
    pub fn resolve_game_dir(&self) -> Result<PathBuf, InstallError> {
        match &self.game_dir {
            Some(dir) => Ok(dir.clone()),
            None => locate_game_dir(&self.install_base),
        }
    }
}
