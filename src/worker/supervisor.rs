//! Web worker supervisor facade.
//!
//! A [`Supervisor`] owns one renderer process for one display, from
//! [`show`](Supervisor::show) to [`close`](Supervisor::close). It is not
//! restartable: new content needs a new supervisor.
//!
//! # Lifecycle
//!
//! 1. [`Supervisor::new`] stores the launch spec, worker config and services.
//! 2. [`Supervisor::show`] spawns the worker, the output listener and the
//!    exit monitor.
//! 3. The host awaits [`Supervisor::wait_initialized`] (or the receiver from
//!    [`Supervisor::take_initialized`]) for the single `Initialized` event.
//! 4. The host drives play / pause / messages, then closes or terminates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::host::{
    DesktopCompositor, LoggingCompositor, OutputSink, RenderableSurface, SurfaceFuture,
    TracingSink,
};
use crate::models::content::{ContentKind, WorkerConfig};
use crate::models::display::DisplayDescriptor;
use crate::models::handshake::{HandshakeResult, InitError, WindowHandle};
use crate::models::state::SupervisorState;
use crate::platform::{native_window_system, WindowSystem};
use crate::worker::launcher::{self, LaunchSpec};
use crate::worker::lifecycle::{
    spawn_exit_monitor, CloseStrategy, ControllerParts, LifecycleController,
};
use crate::worker::listener::{run_listener, run_stderr_drain};
use crate::worker::resolver::WindowResolver;
use crate::worker::shared::{InitReceiver, SharedState};
use crate::{AppError, Result};

/// External collaborators a supervisor talks to.
#[derive(Clone)]
pub struct SupervisorServices {
    /// Window tree access for resolution and play / pause.
    pub windows: Arc<dyn WindowSystem>,
    /// Desktop refresh after teardown.
    pub compositor: Arc<dyn DesktopCompositor>,
    /// Destination of worker output lines.
    pub output: Arc<dyn OutputSink>,
}

impl SupervisorServices {
    /// Native window system, logging compositor, `tracing` output.
    #[must_use]
    pub fn native() -> Self {
        Self {
            windows: native_window_system(),
            compositor: Arc::new(LoggingCompositor),
            output: Arc::new(TracingSink),
        }
    }

    /// Replace the compositor.
    #[must_use]
    pub fn with_compositor(mut self, compositor: Arc<dyn DesktopCompositor>) -> Self {
        self.compositor = compositor;
        self
    }
}

impl std::fmt::Debug for SupervisorServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupervisorServices").finish_non_exhaustive()
    }
}

/// Owner of one web worker process and its resolved window.
#[derive(Debug)]
pub struct Supervisor {
    id: Uuid,
    launch: LaunchSpec,
    config: WorkerConfig,
    display: DisplayDescriptor,
    services: SupervisorServices,
    close_strategy: CloseStrategy,
    shared: Arc<SharedState>,
    init_rx: Option<InitReceiver>,
    controller: Option<LifecycleController>,
    pid: Option<u32>,
    launched_at: Option<DateTime<Utc>>,
}

impl Supervisor {
    /// Supervisor for `config`, not yet started.
    #[must_use]
    pub fn new(launch: LaunchSpec, config: WorkerConfig, services: SupervisorServices) -> Self {
        let (shared, init_rx) = SharedState::new();
        Self {
            id: Uuid::new_v4(),
            launch,
            display: config.display.clone(),
            config,
            services,
            close_strategy: CloseStrategy::default(),
            shared: Arc::new(shared),
            init_rx: Some(init_rx),
            controller: None,
            pid: None,
            launched_at: None,
        }
    }

    /// Use `strategy` for [`close`](Self::close).
    #[must_use]
    pub fn with_close_strategy(mut self, strategy: CloseStrategy) -> Self {
        self.close_strategy = strategy;
        self
    }

    /// Spawn the worker and start listening for its handshake.
    ///
    /// A launch failure is also delivered as the `Initialized(false)` event,
    /// after which the supervisor is terminated and the desktop refreshed.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidState` if the supervisor was already started.
    /// - `AppError::Launch` if the worker could not be spawned.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime: the worker process and
    /// its reader and monitor tasks are spawned on the current runtime.
    pub fn show(&mut self) -> Result<()> {
        let span = info_span!("show", supervisor = %self.id, display = %self.display);
        let _guard = span.enter();

        if !self.shared.transition(SupervisorState::Starting) {
            return Err(AppError::InvalidState(format!(
                "cannot show a supervisor in state {:?}",
                self.shared.state()
            )));
        }

        let handle = match launcher::launch(&self.launch, &self.config) {
            Ok(handle) => handle,
            Err(err) => {
                error!(%err, "worker launch failed");
                self.shared.deliver(HandshakeResult::failed(
                    InitError::Launch(err.to_string()),
                    "",
                ));
                self.shared.finish();
                self.services.compositor.refresh_desktop();
                return Err(err);
            }
        };

        self.pid = handle.pid;
        self.launched_at = Some(handle.launched_at);
        self.shared.transition(SupervisorState::AwaitingHandshake);

        let stream_closed = CancellationToken::new();
        let kill = CancellationToken::new();
        let task_span = info_span!("worker", supervisor = %self.id, pid = handle.pid);

        let listener = tokio::spawn(
            run_listener(
                handle.pid,
                handle.stdout,
                Arc::clone(&self.shared),
                WindowResolver::new(Arc::clone(&self.services.windows)),
                Arc::clone(&self.services.output),
                stream_closed.clone(),
            )
            .instrument(task_span.clone()),
        );
        let stderr = tokio::spawn(
            run_stderr_drain(handle.pid, handle.stderr).instrument(task_span.clone()),
        );
        let monitor = spawn_exit_monitor(
            handle.pid,
            handle.child,
            Arc::clone(&self.shared),
            Arc::clone(&self.services.compositor),
            stream_closed,
            kill.clone(),
        );

        self.controller = Some(LifecycleController::new(ControllerParts {
            pid: handle.pid,
            shared: Arc::clone(&self.shared),
            windows: Arc::clone(&self.services.windows),
            compositor: Arc::clone(&self.services.compositor),
            stdin: handle.stdin,
            kill,
            monitor,
            readers: vec![listener, stderr],
            close_strategy: self.close_strategy,
        }));

        info!(pid = self.pid, "awaiting worker handshake");
        Ok(())
    }

    /// Take the receiver of the single `Initialized` event.
    ///
    /// Returns `None` once taken.
    pub fn take_initialized(&mut self) -> Option<InitReceiver> {
        self.init_rx.take()
    }

    /// Wait for the `Initialized` event.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidState` if the event receiver was already
    /// taken or consumed.
    pub async fn wait_initialized(&mut self) -> Result<HandshakeResult> {
        let init_rx = self.init_rx.take().ok_or_else(|| {
            AppError::InvalidState("initialization event already consumed".into())
        })?;
        init_rx
            .await
            .map_err(|_| AppError::InvalidState("initialization event was never delivered".into()))
    }

    /// Instance identifier used in log spans.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Worker process id once shown.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Spawn time once shown.
    #[must_use]
    pub fn launched_at(&self) -> Option<DateTime<Utc>> {
        self.launched_at
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SupervisorState {
        self.shared.state()
    }

    /// Target display metadata.
    #[must_use]
    pub fn display(&self) -> &DisplayDescriptor {
        &self.display
    }

    /// Update the display metadata.
    ///
    /// A running worker keeps rendering for the display it was launched
    /// with; only the host-facing descriptor changes.
    pub fn set_display(&mut self, display: DisplayDescriptor) {
        self.display = display;
    }

    /// Launch configuration.
    #[must_use]
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Kind of content shown.
    #[must_use]
    pub fn content_kind(&self) -> ContentKind {
        self.config.content_kind
    }

    /// Resolved content window.
    #[must_use]
    pub fn window_handle(&self) -> Option<WindowHandle> {
        self.shared.window()
    }

    /// Show the content window. No-op before initialization.
    pub fn play(&self) {
        if let Some(controller) = &self.controller {
            controller.play();
        }
    }

    /// Minimize the content window. No-op before initialization.
    pub fn pause(&self) {
        if let Some(controller) = &self.controller {
            controller.pause();
        }
    }

    /// Reserved no-op.
    pub fn stop(&self) {
        if let Some(controller) = &self.controller {
            controller.stop();
        }
    }

    /// Reserved no-op.
    pub fn resume(&self) {
        if let Some(controller) = &self.controller {
            controller.resume();
        }
    }

    /// Reserved no-op.
    pub fn set_volume(&self, level: u8) {
        if let Some(controller) = &self.controller {
            controller.set_volume(level);
        }
    }

    /// Send a control line to the worker; failures are swallowed.
    pub async fn send_message(&mut self, message: &str) {
        if let Some(controller) = self.controller.as_mut() {
            controller.send_message(message).await;
        }
    }

    /// Close the worker using the configured [`CloseStrategy`].
    pub async fn close(&mut self) {
        match self.controller.take() {
            Some(mut controller) => controller.close().await,
            None => self.teardown_without_worker(),
        }
    }

    /// Kill the worker immediately and refresh the desktop.
    pub async fn terminate(&mut self) {
        match self.controller.take() {
            Some(mut controller) => controller.terminate().await,
            None => self.teardown_without_worker(),
        }
    }

    fn teardown_without_worker(&self) {
        self.shared
            .deliver(HandshakeResult::failed(InitError::Terminated, ""));
        self.shared.finish();
        self.services.compositor.refresh_desktop();
    }
}

impl RenderableSurface for Supervisor {
    fn window_handle(&self) -> Option<WindowHandle> {
        Supervisor::window_handle(self)
    }

    fn content_kind(&self) -> ContentKind {
        Supervisor::content_kind(self)
    }

    fn play(&self) {
        Supervisor::play(self);
    }

    fn pause(&self) {
        Supervisor::pause(self);
    }

    fn stop(&self) {
        Supervisor::stop(self);
    }

    fn resume(&self) {
        Supervisor::resume(self);
    }

    fn send_message<'a>(&'a mut self, message: &'a str) -> SurfaceFuture<'a> {
        Box::pin(Supervisor::send_message(self, message))
    }

    fn close(&mut self) -> SurfaceFuture<'_> {
        Box::pin(Supervisor::close(self))
    }

    fn terminate(&mut self) -> SurfaceFuture<'_> {
        Box::pin(Supervisor::terminate(self))
    }
}
