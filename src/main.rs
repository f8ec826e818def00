#![forbid(unsafe_code)]

//! `wallpaper-host` runs one web wallpaper worker on one display.
//!
//! Loads configuration, launches the renderer, waits for its handshake,
//! prints the `Initialized` event as a JSON line, and keeps the worker alive
//! until ctrl-c or SIGTERM.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use wallpaper_host::config::{ContentRequest, GlobalConfig};
use wallpaper_host::models::content::{ContentKind, ContentSource};
use wallpaper_host::models::display::{DisplayDescriptor, Rect};
use wallpaper_host::worker::supervisor::{Supervisor, SupervisorServices};
use wallpaper_host::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "wallpaper-host",
    about = "Web wallpaper worker supervisor",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// URL or local file to render.
    #[arg(long)]
    source: String,

    /// Content kind.
    #[arg(long, value_enum, default_value_t = ContentKind::Online)]
    kind: ContentKind,

    /// Target display id or OS device name (e.g. `\\.\DISPLAY2`).
    #[arg(long, default_value = "1")]
    display: String,

    /// Display bounds.
    #[arg(long, default_value_t = 0)]
    x: i32,
    #[arg(long, default_value_t = 0)]
    y: i32,
    #[arg(long, default_value_t = 1920)]
    width: u32,
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Extra worker arguments, appended verbatim.
    #[arg(long, default_value = "")]
    arguments: String,

    /// Folder of a customisable wallpaper (enables `--property`).
    #[arg(long)]
    wallpaper_folder: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    info!("wallpaper-host bootstrap");

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))
        .and_then(|runtime| runtime.block_on(run(args)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "wallpaper-host failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let config = GlobalConfig::load_from_path(&args.config)?;
    info!("configuration loaded");

    let display_id = DisplayDescriptor::id_from_device_name(&args.display)
        .ok_or_else(|| AppError::Config(format!("invalid display: {}", args.display)))?;
    let display = DisplayDescriptor::new(
        display_id,
        Rect {
            x: args.x,
            y: args.y,
            width: args.width,
            height: args.height,
        },
    );

    let source = match args.kind {
        ContentKind::Online | ContentKind::VideoStream => ContentSource::Url(args.source),
        ContentKind::Local | ContentKind::WebAudio => ContentSource::LocalPath(args.source.into()),
    };
    let content = ContentRequest {
        source,
        kind: args.kind,
        arguments: args.arguments,
        wallpaper_folder: args.wallpaper_folder,
    };

    let mut supervisor = Supervisor::new(
        config.launch_spec(),
        config.worker_config(&content, &display),
        SupervisorServices::native(),
    )
    .with_close_strategy(config.close_strategy());

    let init_rx = supervisor
        .take_initialized()
        .ok_or_else(|| AppError::InvalidState("initialization receiver missing".into()))?;
    supervisor.show()?;

    let timeout = config.handshake_timeout();
    let initialized = match tokio::time::timeout(timeout, init_rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => {
            supervisor.terminate().await;
            return Err(AppError::Handshake("initialization event dropped".into()));
        }
        Err(_elapsed) => {
            warn!(?timeout, "worker did not report a window in time");
            supervisor.close().await;
            return Err(AppError::Handshake(format!(
                "no handshake within {timeout:?}"
            )));
        }
    };

    let event = serde_json::to_string(&initialized)
        .map_err(|err| AppError::Io(format!("failed to encode event: {err}")))?;
    println!("{event}");

    if !initialized.success {
        supervisor.close().await;
        return Err(AppError::Handshake(
            initialized
                .error
                .map_or_else(|| "initialization failed".to_owned(), |err| err.to_string()),
        ));
    }

    supervisor.play();
    info!(pid = supervisor.pid(), "wallpaper running");

    shutdown_signal().await;
    info!("shutdown signal received");
    supervisor.close().await;
    info!("wallpaper-host shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
