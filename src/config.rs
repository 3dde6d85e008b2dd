use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::game::Geometry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for one game session. Geometry is in world units, timings in ms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub screen_width: f64,
    pub screen_height: f64,
    pub player_width: f64,
    pub player_height: f64,
    pub obstacle_width: f64,
    pub obstacle_height: f64,
    /// Distance moved per accepted left/right press.
    pub move_step: f64,
    pub spawn_interval_ms: u64,
    pub fall_duration_ms: u64,
    /// Extra time after the fall before an obstacle is removed, so it is
    /// fully off screen when it disappears.
    pub expiry_slack_ms: u64,
    pub score_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 1000.0,
            screen_height: 600.0,
            player_width: 100.0,
            player_height: 100.0,
            obstacle_width: 50.0,
            obstacle_height: 50.0,
            move_step: 20.0,
            spawn_interval_ms: 500,
            fall_duration_ms: 3000,
            expiry_slack_ms: 100,
            score_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Load `path` if given. Any problem is logged and the defaults are used,
    /// a bad config file should never keep the game from starting.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Err(err) => {
                tracing::warn!(error = %err, "using default config");
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("obstacle_width", self.obstacle_width),
            ("obstacle_height", self.obstacle_height),
            ("move_step", self.move_step),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        let timings = [
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("fall_duration_ms", self.fall_duration_ms),
            ("score_interval_ms", self.score_interval_ms),
        ];
        for (name, value) in timings {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be non-zero")));
            }
        }
        if self.player_width > self.screen_width {
            return Err(ConfigError::Invalid("player is wider than the screen".into()));
        }
        if self.obstacle_width > self.screen_width {
            return Err(ConfigError::Invalid("obstacle is wider than the screen".into()));
        }
        Ok(())
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            player_width: self.player_width,
            player_height: self.player_height,
            obstacle_width: self.obstacle_width,
            obstacle_height: self.obstacle_height,
        }
    }
}
