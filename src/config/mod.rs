use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{Backend, RenderMode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcript source settings
    pub provider: ProviderConfig,

    /// HTTP client settings
    pub http: HttpConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend used when `--backend` is not given
    pub backend: Backend,

    /// yt-dlp executable for the yt-dlp backend
    pub yt_dlp_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent to YouTube
    pub user_agent: String,

    /// Accept-Language header; YouTube localizes track names with it
    pub accept_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Filename used when `--output` is not given
    pub default_file: PathBuf,

    /// Layout used when `--mode` is not given
    pub mode: RenderMode,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Web,
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            user_agent: concat!("ytscribe/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_language: "en-US".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_file: PathBuf::from("transcript.md"),
            mode: RenderMode::Detailed,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when none exists
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a specific configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("ytscribe").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be greater than zero");
        }

        if self.provider.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("provider.yt_dlp_path must not be empty");
        }

        if self.output.default_file.as_os_str().is_empty() {
            anyhow::bail!("output.default_file must not be empty");
        }

        Ok(())
    }

    /// Timeout applied to every HTTP request
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        if let Some(path) = Self::config_path() {
            println!("  Config File: {}", path.display());
        }
        println!("  Backend: {}", self.provider.backend);
        println!("  yt-dlp Path: {}", self.provider.yt_dlp_path);
        println!("  HTTP Timeout: {}s", self.http.timeout_secs);
        println!("  Accept-Language: {}", self.http.accept_language);
        println!("  Default Output: {}", self.output.default_file.display());
        println!("  Render Mode: {}", self.output.mode);
    }
}
