//! Worker control surface, exit monitoring and teardown.
//!
//! Control calls are best-effort: the worker has no reply channel, so
//! window calls and stdin writes log their failures and never surface them.
//! Calls made before a window was resolved are no-ops.

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::process::{Child, ChildStdin};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::host::DesktopCompositor;
use crate::models::handshake::{HandshakeResult, InitError};
use crate::models::state::SupervisorState;
use crate::platform::WindowSystem;
use crate::worker::codec::WorkerCodec;
use crate::worker::shared::SharedState;

/// Control message asking the worker to shut itself down.
pub const TERMINATE_MESSAGE: &str = "lively:terminate";

/// How long the exit monitor waits for buffered output after the process
/// exits before deciding that no handshake arrived.
pub const STREAM_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How [`LifecycleController::close`] ends the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloseStrategy {
    /// Force-kill right away.
    ///
    /// The default: the renderer's own shutdown crashes when several
    /// instances close at the same time.
    #[default]
    Immediate,
    /// Ask the worker to exit, then force-kill after `timeout`.
    Graceful {
        /// Time allowed for a self-initiated exit.
        timeout: Duration,
    },
}

/// How the worker process ended, as seen by the exit monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    /// The process exited on its own.
    Exited {
        /// Exit code, `None` when ended by a signal.
        code: Option<i32>,
        /// Whether the monitor already refreshed the desktop.
        refreshed: bool,
    },
    /// The process was killed on request.
    Killed,
}

/// Spawn a background task that owns `child` until it exits or is killed.
///
/// On a natural exit the task waits up to [`STREAM_DRAIN_GRACE`] for
/// `stream_closed`, delivers a [`InitError::PrematureExit`] failure if no
/// handshake was evaluated and enters the terminal state. It refreshes the
/// desktop unless `kill` was cancelled in the meantime, in which case the
/// caller's teardown owns the refresh. When `kill` fires first it kills the
/// process, swallowing any error; teardown is then left to the caller.
#[must_use]
pub fn spawn_exit_monitor(
    pid: Option<u32>,
    mut child: Child,
    shared: Arc<SharedState>,
    compositor: Arc<dyn DesktopCompositor>,
    stream_closed: CancellationToken,
    kill: CancellationToken,
) -> JoinHandle<ExitReport> {
    tokio::spawn(async move {
        tokio::select! {
            result = child.wait() => {
                let code = match result {
                    Ok(status) => {
                        info!(pid, ?status, "worker process exited");
                        status.code()
                    }
                    Err(err) => {
                        warn!(pid, %err, "error waiting for worker process");
                        None
                    }
                };

                if tokio::time::timeout(STREAM_DRAIN_GRACE, stream_closed.cancelled())
                    .await
                    .is_err()
                {
                    debug!(pid, "worker output still open after exit");
                }

                if shared.deliver(HandshakeResult::failed(InitError::PrematureExit, "")) {
                    warn!(pid, "worker exited before reporting a window");
                }
                shared.finish();
                let refreshed = !kill.is_cancelled();
                if refreshed {
                    compositor.refresh_desktop();
                }
                ExitReport::Exited { code, refreshed }
            }
            () = kill.cancelled() => {
                if let Err(err) = child.kill().await {
                    debug!(pid, %err, "kill failed, worker already gone");
                }
                ExitReport::Killed
            }
        }
    })
}

/// Play / pause / message / teardown operations for one running worker.
pub struct LifecycleController {
    pid: Option<u32>,
    shared: Arc<SharedState>,
    windows: Arc<dyn WindowSystem>,
    compositor: Arc<dyn DesktopCompositor>,
    stdin: Option<FramedWrite<ChildStdin, WorkerCodec>>,
    kill: CancellationToken,
    monitor: Option<JoinHandle<ExitReport>>,
    readers: Vec<JoinHandle<()>>,
    close_strategy: CloseStrategy,
}

/// Parts a [`LifecycleController`] takes ownership of.
pub struct ControllerParts {
    /// Worker process id.
    pub pid: Option<u32>,
    /// Shared lifecycle state.
    pub shared: Arc<SharedState>,
    /// Window calls for play / pause.
    pub windows: Arc<dyn WindowSystem>,
    /// Desktop refresh after teardown.
    pub compositor: Arc<dyn DesktopCompositor>,
    /// Worker stdin.
    pub stdin: ChildStdin,
    /// Token the exit monitor kills on.
    pub kill: CancellationToken,
    /// Exit monitor task.
    pub monitor: JoinHandle<ExitReport>,
    /// Output reader tasks, aborted at teardown.
    pub readers: Vec<JoinHandle<()>>,
    /// Close behaviour.
    pub close_strategy: CloseStrategy,
}

impl LifecycleController {
    /// Take ownership of a launched worker's control parts.
    #[must_use]
    pub fn new(parts: ControllerParts) -> Self {
        Self {
            pid: parts.pid,
            shared: parts.shared,
            windows: parts.windows,
            compositor: parts.compositor,
            stdin: Some(FramedWrite::new(parts.stdin, WorkerCodec::new())),
            kill: parts.kill,
            monitor: Some(parts.monitor),
            readers: parts.readers,
            close_strategy: parts.close_strategy,
        }
    }

    /// Show and restore the content window.
    pub fn play(&self) {
        let Some(window) = self.shared.window() else {
            debug!(pid = self.pid, "play before window resolved, ignoring");
            return;
        };
        if let Err(err) = self.windows.restore(window) {
            warn!(pid = self.pid, %err, "failed to restore worker window");
        }
        if self.shared.state() == SupervisorState::Paused {
            self.shared.transition(SupervisorState::Running);
        }
    }

    /// Minimize the content window.
    pub fn pause(&self) {
        let Some(window) = self.shared.window() else {
            debug!(pid = self.pid, "pause before window resolved, ignoring");
            return;
        };
        if let Err(err) = self.windows.minimize(window) {
            warn!(pid = self.pid, %err, "failed to minimize worker window");
        }
        if self.shared.state() == SupervisorState::Running {
            self.shared.transition(SupervisorState::Paused);
        }
    }

    /// Reserved; the worker has no stop command.
    pub fn stop(&self) {}

    /// Reserved; the worker has no resume command.
    pub fn resume(&self) {}

    /// Reserved; per-application volume is not applied to web workers.
    ///
    /// See [`apply_volume_to_tree`](crate::platform::process_tree::apply_volume_to_tree)
    /// for the tree-wide variant.
    pub fn set_volume(&self, level: u8) {
        debug!(pid = self.pid, level, "volume change ignored for web worker");
    }

    /// Write `message` as one line to the worker's stdin.
    ///
    /// Failures are logged and swallowed.
    pub async fn send_message(&mut self, message: &str) {
        let Some(stdin) = self.stdin.as_mut() else {
            debug!(pid = self.pid, "send_message after teardown, ignoring");
            return;
        };
        if let Err(err) = stdin.send(message.to_owned()).await {
            debug!(pid = self.pid, %err, "worker stdin write failed");
        }
    }

    /// End the worker using the configured [`CloseStrategy`].
    ///
    /// A graceful exit within the timeout is not followed by a kill, and the
    /// desktop is refreshed once, by the exit monitor.
    pub async fn close(&mut self) {
        if let CloseStrategy::Graceful { timeout } = self.close_strategy {
            self.send_message(TERMINATE_MESSAGE).await;
            if let Some(monitor) = self.monitor.as_mut() {
                match tokio::time::timeout(timeout, monitor).await {
                    Ok(report) => {
                        self.monitor = None;
                        let refreshed = match report {
                            Ok(ExitReport::Exited { refreshed, .. }) => refreshed,
                            Ok(ExitReport::Killed) => false,
                            Err(err) => {
                                warn!(pid = self.pid, %err, "exit monitor task failed");
                                false
                            }
                        };
                        self.teardown(!refreshed).await;
                        return;
                    }
                    Err(_elapsed) => {
                        info!(
                            pid = self.pid,
                            ?timeout,
                            "worker ignored terminate request, killing"
                        );
                    }
                }
            }
        }
        self.terminate().await;
    }

    /// Force-kill the worker, release its resources and refresh the desktop.
    ///
    /// Never fails: killing a process that already exited is ignored, and
    /// the desktop refresh happens regardless, exactly once per call.
    pub async fn terminate(&mut self) {
        self.teardown(true).await;
    }

    async fn teardown(&mut self, refresh: bool) {
        let pid = self.pid;
        async {
            if !self.shared.state().is_terminated() {
                self.shared.transition(SupervisorState::Terminating);
            }

            self.kill.cancel();
            if let Some(monitor) = self.monitor.take() {
                match monitor.await {
                    Ok(report) => debug!(?report, "exit monitor finished"),
                    Err(err) => warn!(%err, "exit monitor task failed"),
                }
            }

            self.stdin = None;
            for reader in self.readers.drain(..) {
                reader.abort();
            }

            self.shared
                .deliver(HandshakeResult::failed(InitError::Terminated, ""));
            let state = self.shared.finish();
            info!(?state, "worker terminated");

            if refresh {
                self.compositor.refresh_desktop();
            }
        }
        .instrument(info_span!("terminate", pid))
        .await;
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        // The exit monitor owns the child.
        self.kill.cancel();
    }
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("pid", &self.pid)
            .field("close_strategy", &self.close_strategy)
            .finish_non_exhaustive()
    }
}
