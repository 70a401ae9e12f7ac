//! User configuration for abreview.
//!
//! Read once at startup from `$XDG_CONFIG_HOME/abreview/config.toml`. Every key
//! is optional; a missing file is the same as an empty one. Command-line flags
//! are applied on top with [`Config::apply_overrides`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Which media backend opens the two videos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    /// Two mpv windows driven over JSON IPC.
    #[default]
    Mpv,
    /// No playback; the view lists the media URLs instead.
    None,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the results API, without the `/api` suffix.
    pub api_url: String,
    /// Origin that serves `uploads/`. Defaults to `api_url`.
    pub media_url: Option<String>,
    pub theme: String,
    pub player: PlayerKind,
    pub mpv_path: String,
    pub request_timeout_secs: u64,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_owned(),
            media_url: None,
            theme: "catppuccin-mocha".to_owned(),
            player: PlayerKind::Mpv,
            mpv_path: "mpv".to_owned(),
            request_timeout_secs: 30,
            log_file: PathBuf::from(".abreview").join("abreview.log"),
        }
    }
}

/// Values supplied on the command line; `None` leaves the file value alone.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub media_url: Option<String>,
    pub no_player: bool,
}

impl Config {
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(url) = overrides.media_url {
            self.media_url = Some(url);
        }
        if overrides.no_player {
            self.player = PlayerKind::None;
        }
    }

    pub fn media_base(&self) -> &str {
        self.media_url.as_deref().unwrap_or(&self.api_url)
    }

    /// Request timeout; zero in the file is treated as the default.
    pub fn timeout(&self) -> Duration {
        match self.request_timeout_secs {
            0 => abreview_core::api::DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Returns the path to the abreview config file.
///
/// Prefers `$XDG_CONFIG_HOME/abreview/config.toml`; falls back to
/// `~/.config/abreview/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("abreview").join("config.toml")
}

/// Loads the config at `path`. A missing file yields the defaults.
///
/// Errors are soft: the caller logs them and continues with
/// `Config::default()`. They are returned rather than logged here because
/// the log file location is itself configured.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::Read { path: path.to_owned(), source }),
    };
    Ok(toml::from_str(&raw)?)
}
