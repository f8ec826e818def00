//! Supervisor lifecycle states.

use serde::Serialize;

/// Lifecycle status of a [`Supervisor`](crate::worker::supervisor::Supervisor).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorState {
    /// Constructed, nothing spawned yet.
    Created,
    /// Process creation in progress.
    Starting,
    /// Process running, no successful handshake yet.
    AwaitingHandshake,
    /// Window resolved and visible.
    Running,
    /// Window minimized by the host.
    Paused,
    /// Kill and cleanup in progress.
    Terminating,
    /// Worker gone; `failed` when initialization never succeeded.
    Terminated {
        /// Initialization did not succeed.
        failed: bool,
    },
}

impl SupervisorState {
    /// Whether a worker handle is owned in this state.
    #[must_use]
    pub fn has_worker(self) -> bool {
        matches!(
            self,
            Self::Starting
                | Self::AwaitingHandshake
                | Self::Running
                | Self::Paused
                | Self::Terminating
        )
    }

    /// Whether the worker has gone for good.
    #[must_use]
    pub fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated { .. })
    }

    /// Determine whether a lifecycle transition is permitted.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Starting)
                | (Self::Starting, Self::AwaitingHandshake)
                | (Self::AwaitingHandshake | Self::Paused, Self::Running)
                | (Self::Running, Self::Paused)
                | (
                    Self::Created | Self::Starting | Self::AwaitingHandshake,
                    Self::Terminated { failed: true }
                )
                | (
                    Self::AwaitingHandshake | Self::Running | Self::Paused,
                    Self::Terminating | Self::Terminated { .. }
                )
                | (Self::Terminating, Self::Terminated { .. })
        )
    }
}
