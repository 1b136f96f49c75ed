//! Game configuration: hard-coded defaults, optionally overridden by a TOML
//! file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::policy::SpeedCurve;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "SNAKE_RUSH_CONFIG";
/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "snake_rush.toml";
pub const LEADERBOARD_FILE: &str = "snake_rush_leaderboard.json";

pub const GRID_WIDTH: i16 = 32;
pub const GRID_HEIGHT: i16 = 24;
/// Largest accepted grid side, in cells.
pub const MAX_GRID_SIDE: i16 = 256;
/// Pixels per cell.
pub const CELL_SIZE: u16 = 30;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub speed: SpeedCurve,
    pub audio: AudioConfig,
    pub display: DisplayConfig,
    pub leaderboard_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i16,
    pub height: i16,
    pub cell_size: u16,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            cell_size: CELL_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sfx_muted: bool,
    pub bgm_muted: bool,
    pub bgm_volume: f32,
    pub game_over_volume: f32,
    pub food_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            sfx_muted: false,
            bgm_muted: false,
            bgm_volume: 0.3,
            game_over_volume: 0.7,
            food_volume: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub fullscreen: bool,
}

/// Player-adjustable toggles. Owned by the session and changed only through
/// commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub sfx_muted: bool,
    pub bgm_muted: bool,
    pub fullscreen: bool,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Loads from `$SNAKE_RUSH_CONFIG` or `./snake_rush.toml`. No file at
    /// either place yields the defaults.
    pub fn locate() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        info!(path = %path.display(), "loading config");
        Self::load_file(&path)
    }

    /// [`Config::locate`], falling back to defaults on any error.
    pub fn locate_or_default() -> Self {
        Self::locate().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring config file");
            Config::default()
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width < 2 || self.grid.height < 2 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 2x2, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        if self.grid.width > MAX_GRID_SIDE || self.grid.height > MAX_GRID_SIDE {
            return Err(ConfigError::Invalid(format!(
                "grid sides are capped at {MAX_GRID_SIDE}, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        if self.grid.cell_size == 0 {
            return Err(ConfigError::Invalid("cell_size must be positive".into()));
        }
        let speed = &self.speed;
        if speed.base == 0 || speed.interval == 0 || speed.max < speed.base {
            return Err(ConfigError::Invalid(format!(
                "speed needs base >= 1, interval >= 1 and max >= base, got {speed:?}"
            )));
        }
        Ok(())
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid.width, self.grid.height)
    }

    pub fn settings(&self) -> Settings {
        Settings {
            sfx_muted: self.audio.sfx_muted,
            bgm_muted: self.audio.bgm_muted,
            fullscreen: self.display.fullscreen,
        }
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.leaderboard_path
            .clone()
            .unwrap_or_else(default_leaderboard_path)
    }
}

/// Per-user writable location for the leaderboard file.
pub fn default_leaderboard_path() -> PathBuf {
    let dir = if cfg!(windows) {
        std::env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join("SnakeRush"))
    } else {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".snakerush"))
    };
    dir.unwrap_or_default().join(LEADERBOARD_FILE)
}
