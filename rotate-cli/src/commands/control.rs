//! `sway-rotate enable|disable|toggle`: one-shot commands to the daemon.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use rotate_core::Command;
use rotate_daemon::{send_command, DaemonError};

/// Arguments for `sway-rotate disable`.
#[derive(Args, Debug)]
pub struct DisableArgs {
    /// The disable comes from a hardware switch; forces the configured orientation.
    #[arg(long)]
    pub hardware: bool,
}

impl DisableArgs {
    pub fn command(&self) -> Command {
        if self.hardware {
            Command::DisableHardware
        } else {
            Command::Disable
        }
    }

    pub fn run(self, socket: &Path) -> Result<ExitCode> {
        send(socket, self.command())
    }
}

/// Send `command`, exiting 1 when no daemon is running for this session.
pub fn send(socket: &Path, command: Command) -> Result<ExitCode> {
    match send_command(socket, command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(DaemonError::DaemonNotRunning { socket }) => {
            tracing::error!(
                socket = %socket.display(),
                "no instance of 'sway-rotate status' found running"
            );
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err).with_context(|| format!("failed to send '{command}'")),
    }
}
