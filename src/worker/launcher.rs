//! Worker process launcher.
//!
//! Translates a [`WorkerConfig`] into the renderer's command line and spawns
//! it with:
//! - no shell in between; arguments are passed as a vector.
//! - stdin, stdout and stderr piped for the handshake and control plane.
//! - `kill_on_drop(true)` so a dropped handle never leaks a renderer.
//!
//! The renderer's argument parser rejects a flag with an empty value, so
//! optional settings are left out entirely when unset.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::{DateTime, Utc};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

use crate::models::content::{ContentKind, WorkerConfig};
use crate::{AppError, Result};

/// How to start the worker executable, independent of the content shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Renderer executable.
    pub executable: PathBuf,
    /// Arguments placed before the generated worker arguments.
    pub leading_args: Vec<String>,
    /// Working directory; defaults to the executable's directory.
    pub working_dir: Option<PathBuf>,
}

impl LaunchSpec {
    /// Spec for `executable` with no leading arguments.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            leading_args: Vec::new(),
            working_dir: None,
        }
    }

    fn effective_working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref().or_else(|| {
            self.executable
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
        })
    }
}

/// Generated worker arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerArgs(Vec<String>);

impl WorkerArgs {
    /// Argument vector as handed to the OS.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Value following `flag`, if the flag is present.
    #[must_use]
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.0
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.0.get(index + 1))
            .map(String::as_str)
    }

    /// Single command-line string, quoting arguments that need it.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.0
            .iter()
            .map(|arg| quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn flag(&mut self, flag: &str, value: impl AsRef<str>) {
        let value = value.as_ref();
        if value.trim().is_empty() {
            debug!(flag, "omitting worker flag with empty value");
            return;
        }
        self.0.push(flag.to_owned());
        self.0.push(value.to_owned());
    }

    fn path_flag(&mut self, flag: &str, value: &Path) {
        self.flag(flag, value.to_string_lossy());
    }
}

/// Build the worker argument vector for `config`.
#[must_use]
pub fn build_args(config: &WorkerConfig) -> WorkerArgs {
    let mut args = WorkerArgs::default();

    args.flag("--url", config.content_source.as_arg());
    args.flag("--display", &config.display.numeric_id);
    args.flag("--volume", config.volume.min(100).to_string());

    if config.content_kind.is_online() {
        args.flag("--type", "online");
    } else {
        args.flag("--type", "local");
        if let Some(property) = &config.property_path {
            args.path_flag("--property", property);
        }
    }

    if let Some(port) = config.debug_port {
        args.flag("--debug", port.to_string());
    }

    // Disk cache only pays off for remote pages.
    if config.content_kind == ContentKind::Online {
        if let Some(cache_root) = &config.cache_dir {
            args.path_flag("--cache", &cache_root.join(&config.display.numeric_id));
        }
    }

    if config.content_kind == ContentKind::WebAudio {
        args.flag("--audio", "true");
    }

    args.0.extend(split_extra_args(&config.extra_args));

    if let Some(shortcut) = &config.launcher_shortcut {
        args.path_flag("--launcher", shortcut);
    }

    args
}

/// Split free-form extra arguments the way a command line is tokenised:
/// whitespace separates, double quotes group, empty tokens are dropped.
#[must_use]
pub fn split_extra_args(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in raw.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || c == '"') {
        return arg.to_owned();
    }
    format!("\"{}\"", arg.replace('"', "\\\""))
}

// ── Worker handle ────────────────────────────────────────────────────────────

/// Running worker process and its redirected streams.
#[derive(Debug)]
pub struct WorkerHandle {
    /// OS process id, `None` if the process was already reaped.
    pub pid: Option<u32>,
    /// Process handle; has `kill_on_drop(true)`.
    pub child: Child,
    /// Control-plane input.
    pub stdin: ChildStdin,
    /// Handshake and log output.
    pub stdout: ChildStdout,
    /// Diagnostic output.
    pub stderr: ChildStderr,
    /// Spawn time.
    pub launched_at: DateTime<Utc>,
}

/// Spawn the worker for `config`.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// - `AppError::Launch("worker executable not found: …")` when the
///   executable does not exist.
/// - `AppError::Launch("failed to spawn worker: …")` on any other OS refusal.
/// - `AppError::Launch("failed to capture worker …")` if a pipe is missing.
pub fn launch(spec: &LaunchSpec, config: &WorkerConfig) -> Result<WorkerHandle> {
    let args = build_args(config);

    let mut cmd = Command::new(&spec.executable);
    cmd.args(&spec.leading_args)
        .args(args.as_slice())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = spec.effective_working_dir() {
        cmd.current_dir(dir);
    }

    debug!(
        executable = %spec.executable.display(),
        command_line = %args.command_line(),
        "spawning worker"
    );

    let mut child = cmd.spawn().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            AppError::Launch(format!(
                "worker executable not found: {} ({err})",
                spec.executable.display()
            ))
        } else {
            AppError::Launch(format!("failed to spawn worker: {err}"))
        }
    })?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| AppError::Launch("failed to capture worker stdin".into()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AppError::Launch("failed to capture worker stdout".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| AppError::Launch("failed to capture worker stderr".into()))?;

    let pid = child.id();
    info!(pid, display = %config.display, kind = ?config.content_kind, "worker launched");

    Ok(WorkerHandle {
        pid,
        child,
        stdin,
        stdout,
        stderr,
        launched_at: Utc::now(),
    })
}
