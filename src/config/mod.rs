// Settings for cplayer, read once at startup and passed around explicitly
// Missing files and missing sections fall back to defaults

use crate::audio::PlaylistOrder;
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "cplayer";

fn app_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playlist: PlaylistConfig,
    pub player: PlayerConfig,
    pub appearance: AppearanceConfig,
    pub development: DevelopmentConfig,
    /// Where this config was read from; `save` writes back there
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub directory: PathBuf,
    /// Playlist restored on startup when no path is given
    pub selected: Option<PathBuf>,
    pub order: PlaylistOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub tick_interval_ms: u64,
    pub seek_step_seconds: f64,
    pub volume: f32,
    pub extensions: Vec<String>,
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub footer: bool,
    pub spectrum: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentConfig {
    /// Log directory, relative to the config directory unless absolute
    pub logfile: PathBuf,
    pub level: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            directory: app_dir().join("playlists"),
            selected: None,
            order: PlaylistOrder::Ascending,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            seek_step_seconds: 5.0,
            volume: 0.7,
            extensions: vec!["mp3".to_string(), "wav".to_string()],
            recursive: false,
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            footer: true,
            spectrum: false,
        }
    }
}

impl Default for DevelopmentConfig {
    fn default() -> Self {
        Self {
            logfile: PathBuf::from("logs"),
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first run
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        } else {
            let mut config = Config::default();
            config.source = Some(path.to_path_buf());
            config.save()?;
            config
        };

        config.source = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.source.clone().unwrap_or_else(Self::config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.player.tick_interval_ms == 0 {
            anyhow::bail!("player.tick_interval_ms must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.player.volume) {
            anyhow::bail!("player.volume must be between 0.0 and 1.0, got {}", self.player.volume);
        }
        if self.player.seek_step_seconds <= 0.0 {
            anyhow::bail!("player.seek_step_seconds must be positive");
        }
        if self.player.extensions.is_empty() {
            anyhow::bail!("player.extensions must list at least one audio extension");
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.player.tick_interval_ms)
    }

    /// Log directory resolved against the config file's directory
    pub fn log_directory(&self) -> PathBuf {
        let logfile = &self.development.logfile;
        if logfile.is_absolute() {
            return logfile.clone();
        }
        let base = self
            .source
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(app_dir);
        base.join(logfile)
    }

    pub fn config_path() -> PathBuf {
        app_dir().join("config.toml")
    }
}
