//! sway-rotate: automatic screen rotation for Sway, with a waybar status.
//!
//! # Usage
//!
//! ```text
//! sway-rotate [-v...] status [--enabled-text ..] [--disabled-text ..]
//!             [--hardware-disabled-orientation ..] [--output-name ..]
//! sway-rotate disable [--hardware]
//! sway-rotate enable
//! sway-rotate toggle
//! ```
//!
//! `status` is the long-running process that actually rotates the screen;
//! the other subcommands send one command to it and exit.

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{control::DisableArgs, status::StatusArgs};
use rotate_core::{Command, Orientation};
use rotate_daemon::paths::{socket_path, DEFAULT_SOCKET_PREFIX};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sway-rotate",
    version,
    about = "Rotate the screen from accelerometer events, with a waybar status",
    long_about = None,
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Sway IPC socket of the current session; namespaces the control socket.
    #[arg(long, env = "SWAYSOCK", global = true, hide_env_values = true)]
    session_socket: Option<PathBuf>,

    /// Compositor prefix of the session socket file name.
    #[arg(long, default_value = DEFAULT_SOCKET_PREFIX, global = true)]
    socket_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn control_socket(&self) -> Result<PathBuf> {
        let session = self
            .session_socket
            .as_deref()
            .context("not running in Sway: SWAYSOCK is unset (or pass --session-socket)")?;
        Ok(socket_path(session, &self.socket_prefix))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as a waybar status. This is the process that actually rotates the screen.
    Status(StatusArgs),

    /// Disable automatic rotation.
    Disable(DisableArgs),

    /// Enable automatic rotation.
    Enable,

    /// Toggle automatic rotation.
    Toggle,
}

// ---------------------------------------------------------------------------
// Orientation argument: parsed from CLI strings, converts to core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap reports the accepted orientation names.
#[derive(Debug, Clone, Copy)]
pub struct OrientationArg(pub Orientation);

impl FromStr for OrientationArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|_| {
            let expected: Vec<&str> = Orientation::ALL.iter().map(|o| o.as_str()).collect();
            format!(
                "unknown orientation '{s}'; expected: {}",
                expected.join(", ")
            )
        })
    }
}

impl fmt::Display for OrientationArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<OrientationArg> for Orientation {
    fn from(o: OrientationArg) -> Self {
        o.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    rotate_daemon::init_tracing(cli.verbose);

    let socket = cli.control_socket()?;
    match cli.command {
        Commands::Status(args) => args.run(socket),
        Commands::Disable(args) => args.run(&socket),
        Commands::Enable => commands::control::send(&socket, Command::Enable),
        Commands::Toggle => commands::control::send(&socket, Command::Toggle),
    }
}
