//! Global configuration parsing, validation, and worker config assembly.
//!
//! Settings are read once from TOML and turned into explicit
//! [`WorkerConfig`] values; the supervisor itself never reads them.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::models::content::{ContentKind, ContentSource, WorkerConfig};
use crate::models::display::DisplayDescriptor;
use crate::worker::launcher::LaunchSpec;
use crate::worker::lifecycle::CloseStrategy;
use crate::{AppError, Result};

/// File name of a wallpaper's customisable property set.
pub const PROPERTY_FILE_NAME: &str = "LivelyProperties.json";

/// Worker shutdown settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CloseConfig {
    /// Ask the worker to exit before killing it.
    #[serde(default)]
    pub graceful: bool,
    /// Time allowed for a graceful exit.
    #[serde(default = "default_grace_seconds")]
    pub grace_seconds: u64,
}

impl Default for CloseConfig {
    fn default() -> Self {
        Self {
            graceful: false,
            grace_seconds: default_grace_seconds(),
        }
    }
}

fn default_grace_seconds() -> u64 {
    4
}

fn default_audio_volume() -> u8 {
    50
}

fn default_handshake_timeout() -> u64 {
    30
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Renderer executable.
    pub worker_executable: PathBuf,
    /// Arguments placed before the generated worker arguments.
    #[serde(default)]
    pub worker_leading_args: Vec<String>,
    /// Working directory for the worker; defaults to the executable's folder.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Application data root holding the disk cache and property copies.
    pub data_dir: PathBuf,
    /// Global audio volume, 0-100.
    #[serde(default = "default_audio_volume")]
    pub audio_volume: u8,
    /// Remote debugging port for the renderer.
    #[serde(default)]
    pub web_debug_port: Option<u16>,
    /// Enable the renderer's disk cache for online pages.
    #[serde(default)]
    pub disk_cache: bool,
    /// Launcher shortcut handed to every worker.
    #[serde(default)]
    pub launcher_shortcut: Option<PathBuf>,
    /// How long the host waits for the `Initialized` event.
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_seconds: u64,
    /// Worker shutdown behaviour.
    #[serde(default)]
    pub close: CloseConfig,
}

/// Content the host asks a worker to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    /// Page, file or stream.
    pub source: ContentSource,
    /// Content classification.
    pub kind: ContentKind,
    /// Per-wallpaper extra worker arguments.
    pub arguments: String,
    /// Folder of a customisable wallpaper; enables the property override.
    pub wallpaper_folder: Option<PathBuf>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// How to start the worker executable.
    #[must_use]
    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            executable: self.worker_executable.clone(),
            leading_args: self.worker_leading_args.clone(),
            working_dir: self.working_dir.clone(),
        }
    }

    /// Root of the per-display disk caches.
    #[must_use]
    pub fn cache_root(&self) -> PathBuf {
        self.data_dir.join("Cef").join("cache")
    }

    /// Per-display copy of a wallpaper's property file.
    ///
    /// `<data>/SaveData/wpdata/<wallpaper folder name>/<display id>/LivelyProperties.json`.
    #[must_use]
    pub fn property_copy_path(
        &self,
        wallpaper_folder: &Path,
        display: &DisplayDescriptor,
    ) -> PathBuf {
        let folder_name = wallpaper_folder.file_name().unwrap_or_default();
        self.data_dir
            .join("SaveData")
            .join("wpdata")
            .join(folder_name)
            .join(&display.numeric_id)
            .join(PROPERTY_FILE_NAME)
    }

    /// Time the host allows for the handshake.
    #[must_use]
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_seconds)
    }

    /// Close strategy selected by `[close]`.
    #[must_use]
    pub fn close_strategy(&self) -> CloseStrategy {
        if self.close.graceful {
            CloseStrategy::Graceful {
                timeout: Duration::from_secs(self.close.grace_seconds),
            }
        } else {
            CloseStrategy::Immediate
        }
    }

    /// Assemble the immutable worker configuration for `content` on `display`.
    #[must_use]
    pub fn worker_config(
        &self,
        content: &ContentRequest,
        display: &DisplayDescriptor,
    ) -> WorkerConfig {
        let property_path = if content.kind.is_online() {
            None
        } else {
            content
                .wallpaper_folder
                .as_deref()
                .map(|folder| self.property_copy_path(folder, display))
        };

        WorkerConfig {
            content_source: content.source.clone(),
            content_kind: content.kind,
            display: display.clone(),
            volume: self.audio_volume,
            debug_port: self.web_debug_port,
            cache_dir: self.disk_cache.then(|| self.cache_root()),
            property_path,
            extra_args: content.arguments.clone(),
            launcher_shortcut: self.launcher_shortcut.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.worker_executable.as_os_str().is_empty() {
            return Err(AppError::Config("worker_executable must not be empty".into()));
        }

        if self.audio_volume > 100 {
            return Err(AppError::Config(format!(
                "audio_volume must be between 0 and 100, got {}",
                self.audio_volume
            )));
        }

        if self.handshake_timeout_seconds == 0 {
            return Err(AppError::Config(
                "handshake_timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.close.graceful && self.close.grace_seconds == 0 {
            return Err(AppError::Config(
                "close.grace_seconds must be greater than zero when graceful".into(),
            ));
        }

        Ok(())
    }
}
