//! Collaborator interfaces between the supervisor and its host.
//!
//! The compositing host, the output log, and the wallpaper backends are
//! outside this crate. The supervisor only talks to them through the traits
//! below, so a host can plug in its own compositor while tests plug in
//! recording fakes.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info};

use crate::models::content::ContentKind;
use crate::models::handshake::WindowHandle;

/// Desktop composition owner, asked to redraw after a worker goes away.
pub trait DesktopCompositor: Send + Sync {
    /// Refresh the desktop surface so no stale frame of the worker remains.
    fn refresh_desktop(&self);
}

/// Receiver for every line the worker writes to its standard output.
pub trait OutputSink: Send + Sync {
    /// Record one trimmed, non-empty output line.
    fn line(&self, pid: Option<u32>, line: &str);
}

/// Forwards worker output to `tracing` under the `worker_output` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn line(&self, pid: Option<u32>, line: &str) {
        info!(target: "worker_output", pid, line, "worker output");
    }
}

/// Compositor used when no host is attached; only logs the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingCompositor;

impl DesktopCompositor for LoggingCompositor {
    fn refresh_desktop(&self) {
        debug!("desktop refresh requested");
    }
}

/// Boxed future returned by the asynchronous [`RenderableSurface`] methods.
pub type SurfaceFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Capability set shared by every wallpaper backend.
///
/// The host drives all backends through this trait; the web worker
/// [`Supervisor`](crate::worker::supervisor::Supervisor) is one
/// implementation. None of the methods report failure: control calls are
/// best-effort and a backend without a window treats them as no-ops.
pub trait RenderableSurface: Send {
    /// Content window once initialization succeeded.
    fn window_handle(&self) -> Option<WindowHandle>;

    /// Kind of content rendered by this surface.
    fn content_kind(&self) -> ContentKind;

    /// Show the surface.
    fn play(&self);

    /// Hide the surface without stopping the backend.
    fn pause(&self);

    /// Stop playback.
    fn stop(&self);

    /// Resume after [`stop`](Self::stop).
    fn resume(&self);

    /// Deliver a control message to the backend.
    fn send_message<'a>(&'a mut self, message: &'a str) -> SurfaceFuture<'a>;

    /// Tear the backend down.
    fn close(&mut self) -> SurfaceFuture<'_>;

    /// Tear the backend down immediately.
    fn terminate(&mut self) -> SurfaceFuture<'_>;
}
