//! Sensor monitor process and the task that turns its output into events.

use std::process::Stdio;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use rotate_core::{sensor::parse_line, CoreError, Event};

use crate::error::DaemonError;

/// Spawn the sensor monitor with its stdout piped back to us.
///
/// The child is killed when the returned handle is dropped.
pub fn spawn_monitor(command: &[String]) -> Result<(Child, ChildStdout), DaemonError> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| DaemonError::Protocol("empty sensor command".to_string()))?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| DaemonError::SensorUnavailable {
            program: program.clone(),
            source,
        })?;

    let stdout = child.stdout.take().ok_or_else(|| {
        DaemonError::Protocol(format!("sensor monitor '{program}' has no stdout"))
    })?;
    tracing::info!(%program, pid = child.id(), "sensor monitor started");
    Ok((child, stdout))
}

/// Read sensor lines until EOF or cancellation, queueing orientation events.
///
/// Unknown orientations and lines that are not valid UTF-8 are logged and
/// skipped; the stream ending is not an error.
pub async fn forward_orientations<R>(
    mut reader: R,
    events: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
) -> Result<(), DaemonError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            read = reader.read_until(b'\n', &mut buf) => read,
        };
        match read {
            Ok(0) => {
                tracing::warn!("sensor monitor output ended; no further orientation updates");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "failed to read sensor monitor output");
                break;
            }
        }

        // Non UTF-8 bytes cannot form a recognized line; keep reading.
        let line = String::from_utf8_lossy(&buf);
        match parse_line(&line) {
            Ok(Some(orientation)) => {
                tracing::debug!(%orientation, "sensor orientation");
                if events.send(orientation.into()).is_err() {
                    break;
                }
            }
            Ok(None) => tracing::debug!(%line, "ignored sensor line"),
            Err(CoreError::UnknownOrientation(name)) => {
                tracing::warn!(orientation = %name, "unknown orientation");
            }
            Err(err) => tracing::warn!(error = %err, %line, "unparsable sensor line"),
        }
    }
    Ok(())
}

/// Run the configured sensor monitor and forward its orientations.
pub async fn sensor_task(
    command: Vec<String>,
    events: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
) -> Result<(), DaemonError> {
    let (_child, stdout) = spawn_monitor(&command)?;
    forward_orientations(BufReader::new(stdout), events, cancel).await
}
