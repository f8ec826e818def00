//! Worker content and launch configuration.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::display::DisplayDescriptor;

/// Classification of the content a worker renders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Remote web page.
    Online,
    /// Local HTML file.
    Local,
    /// Local page driven by system audio.
    WebAudio,
    /// Remote video stream.
    VideoStream,
}

impl ContentKind {
    /// Whether the worker treats this content as remote (`--type online`).
    #[must_use]
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online | Self::VideoStream)
    }
}

/// Where the rendered content comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Remote URI.
    Url(String),
    /// File on the local disk.
    LocalPath(PathBuf),
}

impl ContentSource {
    /// Render the source the way the worker expects it after `--url`.
    #[must_use]
    pub fn as_arg(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::LocalPath(path) => path.to_string_lossy().into_owned(),
        }
    }
}

/// Everything the launcher needs to start one worker.
///
/// Built once by the host (see
/// [`GlobalConfig::worker_config`](crate::config::GlobalConfig::worker_config))
/// and never mutated after launch; the supervisor reads no ambient settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Page or stream to render.
    pub content_source: ContentSource,
    /// Kind of content, selects the worker flags.
    pub content_kind: ContentKind,
    /// Target monitor.
    pub display: DisplayDescriptor,
    /// Global volume, 0-100.
    pub volume: u8,
    /// Remote debugging port; the flag is omitted when unset.
    pub debug_port: Option<u16>,
    /// Disk cache root; the per-display directory is appended by the launcher.
    pub cache_dir: Option<PathBuf>,
    /// Per-display property override file for customisable local content.
    pub property_path: Option<PathBuf>,
    /// Free-form arguments appended verbatim.
    pub extra_args: String,
    /// Optional launcher shortcut handed to the worker.
    pub launcher_shortcut: Option<PathBuf>,
}
