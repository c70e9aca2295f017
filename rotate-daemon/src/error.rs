use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use rotate_core::{CoreError, Rotation};

/// Error surface for the daemon runtime, socket protocol and actuator.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("rotating output to {rotation} failed ({status})")]
    ActuationFailed {
        rotation: Rotation,
        status: ExitStatus,
    },

    #[error("another instance already owns {socket}")]
    AlreadyRunning { socket: PathBuf },

    #[error("daemon is not running (no socket at {socket})")]
    DaemonNotRunning { socket: PathBuf },

    #[error("could not start sensor monitor '{program}': {source}")]
    SensorUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("daemon protocol error: {0}")]
    Protocol(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
