//! On-disk configuration and the directories the client writes to.
//!
//! Everything is optional: a missing `config.toml` yields defaults, and the
//! API url can be overridden from the environment without touching the file.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

/// Relocates config and logs under a single directory when set.
pub const HOME_ENV: &str = "SONG_MANAGER_HOME";
/// Overrides `api.base_url`.
pub const API_URL_ENV: &str = "SONG_MANAGER_API_URL";

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_LOG_FILTER: &str = "song_manager=debug,reqwest=info,warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not determine a home directory")]
    Directories,
}

/// Resolved locations for the config file and log output.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Honor `SONG_MANAGER_HOME`, otherwise use the platform directories.
    pub fn detect() -> Result<Self, ConfigError> {
        if let Ok(home) = env::var(HOME_ENV) {
            return Self::at(home);
        }

        let dirs = ProjectDirs::from("com", "song-manager", "song-manager")
            .ok_or(ConfigError::Directories)?;
        Self::create(
            dirs.config_dir().to_path_buf(),
            dirs.data_dir().to_path_buf(),
        )
    }

    /// Keep config and logs together beneath `base`.
    pub fn at(base: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let base = base.into();
        Self::create(base.clone(), base)
    }

    fn create(config_dir: PathBuf, data_dir: PathBuf) -> Result<Self, ConfigError> {
        let log_dir = data_dir.join("logs");
        fs::create_dir_all(&config_dir)?;
        fs::create_dir_all(&log_dir)?;
        Ok(Self {
            config_dir,
            data_dir,
            log_dir,
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Origin the `/api/songs` endpoints are resolved against.
    pub base_url: String,
    /// Per-request timeout. Unset means requests never time out.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Read the config file from `paths` and apply environment overrides.
    pub fn load(paths: &AppPaths) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&paths.config_file())?;
        config.apply_api_url_override(env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Parse `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_api_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url {
            let url = url.trim();
            if !url.is_empty() {
                self.api.base_url = url.to_string();
            }
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }
}
