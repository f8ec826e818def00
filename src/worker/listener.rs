//! Worker output listener and handshake evaluation.
//!
//! The renderer reports its container window once, on standard output, as a
//! line of the form `HWND<decimal>`. Anything printed before it is ordinary
//! log output. The first handshake-shaped line decides initialization; every
//! later one is logged and otherwise ignored.
//!
//! | Line                     | Effect                                     |
//! |--------------------------|--------------------------------------------|
//! | empty / whitespace       | Skipped                                    |
//! | `HWND<int>` (first)      | Resolved, initialization delivered         |
//! | `HWND<garbage>` (first)  | Initialization delivered as failure        |
//! | `HWND…` (later)          | Logged only                                |
//! | anything else            | Logged only                                |

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::host::OutputSink;
use crate::models::handshake::{HandshakeResult, InitError};
use crate::worker::codec::WorkerCodec;
use crate::worker::resolver::WindowResolver;
use crate::worker::shared::SharedState;
use crate::{AppError, Result};

/// Prefix of the handshake line.
pub const HANDSHAKE_TAG: &str = "HWND";

/// Parse a trimmed output line as a handshake.
///
/// # Return value
///
/// - `None`: the line is not handshake-shaped.
/// - `Some(Ok(raw))`: the raw container handle.
/// - `Some(Err(AppError::Handshake(…)))`: tagged line with a bad payload.
#[must_use]
pub fn parse_handshake_line(line: &str) -> Option<Result<i64>> {
    let payload = line.strip_prefix(HANDSHAKE_TAG)?;
    Some(payload.trim().parse::<i64>().map_err(|err| {
        AppError::Handshake(format!("invalid window handle payload {payload:?}: {err}"))
    }))
}

/// Turn a parsed handshake into the initialization result.
#[must_use]
pub fn evaluate_handshake(
    parsed: Result<i64>,
    resolver: &WindowResolver,
    raw_message: &str,
) -> HandshakeResult {
    match parsed {
        Ok(raw) => match resolver.resolve(raw) {
            Some(window) => HandshakeResult::resolved(window, raw_message),
            None => HandshakeResult::failed(
                InitError::Handshake(format!("no content window under handle {raw}")),
                raw_message,
            ),
        },
        Err(err) => HandshakeResult::failed(InitError::Handshake(err.to_string()), raw_message),
    }
}

/// Output listener task; reads worker stdout until it closes.
///
/// Every non-empty line goes to `sink`. The first handshake-shaped line is
/// evaluated and delivered through `shared`; a delivery that loses the race
/// against the exit monitor is dropped.
///
/// Cancels `stream_closed` when the stream ends, whether by EOF or by an I/O
/// error. The stream closing is not by itself a failure.
pub async fn run_listener<R>(
    pid: Option<u32>,
    stdout: R,
    shared: Arc<SharedState>,
    resolver: WindowResolver,
    sink: Arc<dyn OutputSink>,
    stream_closed: CancellationToken,
) where
    R: AsyncRead + Unpin + Send,
{
    let mut framed = FramedRead::new(stdout, WorkerCodec::new());

    while let Some(item) = framed.next().await {
        let line = match item {
            Ok(line) => line,
            Err(err) => {
                warn!(pid, error = %err, "worker output: read failed, stopping");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        sink.line(pid, line);

        let Some(parsed) = parse_handshake_line(line) else {
            continue;
        };

        if shared.is_initialized() {
            debug!(pid, line, "worker output: handshake already evaluated, ignoring");
            continue;
        }

        let result = evaluate_handshake(parsed, &resolver, line);
        let success = result.success;
        if shared.deliver(result) {
            if success {
                info!(pid, line, "worker reported its window");
            } else {
                warn!(pid, line, "worker handshake failed");
            }
        } else {
            debug!(pid, line, "worker output: initialization decided elsewhere");
        }
    }

    debug!(pid, "worker output: stream closed");
    stream_closed.cancel();
}

/// Drain worker stderr into the log at `WARN`.
pub async fn run_stderr_drain<R>(pid: Option<u32>, stderr: R)
where
    R: AsyncRead + Unpin + Send,
{
    let mut framed = FramedRead::new(stderr, WorkerCodec::new());
    while let Some(Ok(line)) = framed.next().await {
        let line = line.trim();
        if !line.is_empty() {
            warn!(target: "worker_output", pid, line, "worker stderr");
        }
    }
}
