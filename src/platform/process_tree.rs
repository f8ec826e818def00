//! Process-tree enumeration for the dormant volume and kill-tree helpers.
//!
//! The renderer spawns helper processes (GPU, audio, renderer) under the
//! worker. Per-application volume and a full tree kill must therefore reach
//! every descendant. Neither helper is wired into termination; the
//! supervisor only kills the worker itself.

use std::collections::HashSet;

use sysinfo::{Pid, System};
use tracing::debug;

use crate::{AppError, Result};

/// Parent/child process relation.
pub trait ProcessTree: Send + Sync {
    /// Direct children of `pid`.
    fn child_processes(&self, pid: u32) -> Vec<u32>;
}

/// Per-application audio volume control.
pub trait VolumeMixer: Send + Sync {
    /// Set the volume of every audio session owned by `pid`.
    ///
    /// # Errors
    ///
    /// Returns an error when the process owns no session or the mixer
    /// refuses the change.
    fn set_application_volume(&self, pid: u32, level: u8) -> Result<()>;
}

/// Forced termination of a single process.
pub trait ProcessKiller: Send + Sync {
    /// Kill `pid`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` when the process is gone or cannot be killed.
    fn kill(&self, pid: u32) -> Result<()>;
}

/// [`ProcessTree`] and [`ProcessKiller`] backed by a `sysinfo` snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoProcessTree;

impl ProcessTree for SysinfoProcessTree {
    fn child_processes(&self, pid: u32) -> Vec<u32> {
        let mut sys = System::new();
        sys.refresh_processes();
        let parent = Pid::from_u32(pid);
        sys.processes()
            .values()
            .filter(|process| process.parent() == Some(parent))
            .map(|process| process.pid().as_u32())
            .collect()
    }
}

impl ProcessKiller for SysinfoProcessTree {
    fn kill(&self, pid: u32) -> Result<()> {
        let mut sys = System::new();
        let target = Pid::from_u32(pid);
        sys.refresh_process(target);
        match sys.process(target) {
            Some(process) if process.kill() => Ok(()),
            Some(_) => Err(AppError::Io(format!("kill refused for process {pid}"))),
            None => Err(AppError::Io(format!("process {pid} already exited"))),
        }
    }
}

/// Every process in the tree rooted at `root`, descendants before their
/// parents and `root` last.
///
/// Walks iteratively so deep trees cannot exhaust the stack; a pid seen twice
/// (pid reuse while walking) is visited once.
#[must_use]
pub fn descendants_post_order(tree: &dyn ProcessTree, root: u32) -> Vec<u32> {
    let mut order = Vec::new();
    let mut seen = HashSet::from([root]);
    let mut stack = vec![(root, false)];

    while let Some((pid, expanded)) = stack.pop() {
        if expanded {
            order.push(pid);
            continue;
        }
        stack.push((pid, true));
        for child in tree.child_processes(pid) {
            if seen.insert(child) {
                stack.push((child, false));
            }
        }
    }

    order
}

/// Apply `level` to every process in the tree rooted at `root`.
///
/// Failures are per-process and swallowed: most helpers own no audio session.
pub fn apply_volume_to_tree(tree: &dyn ProcessTree, mixer: &dyn VolumeMixer, root: u32, level: u8) {
    let level = level.min(100);
    for pid in descendants_post_order(tree, root) {
        if let Err(err) = mixer.set_application_volume(pid, level) {
            debug!(pid, %err, "volume change skipped");
        }
    }
}

/// Kill every process in the tree rooted at `root`, leaves first.
///
/// Processes that already exited are skipped silently.
pub fn kill_tree(tree: &dyn ProcessTree, killer: &dyn ProcessKiller, root: u32) {
    for pid in descendants_post_order(tree, root) {
        if let Err(err) = killer.kill(pid) {
            debug!(pid, %err, "kill skipped");
        }
    }
}
