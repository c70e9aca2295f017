//! `sway-rotate status`: run the daemon, or relay the running one.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use rotate_core::Orientation;
use rotate_daemon::config::{
    split_command, StatusLabels, DEFAULT_DISABLED_TEXT, DEFAULT_ENABLED_TEXT, DEFAULT_OUTPUT,
    DEFAULT_SENSOR_COMMAND, DEFAULT_TRANSFORM_COMMAND,
};
use rotate_daemon::{start_blocking, DaemonConfig};

use crate::OrientationArg;

/// Arguments for `sway-rotate status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Text printed while automatic rotation is enabled.
    #[arg(long, default_value = DEFAULT_ENABLED_TEXT)]
    pub enabled_text: String,

    /// Text printed while automatic rotation is disabled.
    #[arg(long, default_value = DEFAULT_DISABLED_TEXT)]
    pub disabled_text: String,

    /// Orientation applied on `disable --hardware` ("unset" leaves the screen alone).
    #[arg(long, default_value = "normal")]
    pub hardware_disabled_orientation: OrientationArg,

    /// Output to rotate. See `man 5 sway-output` for selectors.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output_name: String,

    /// Sensor monitor command line (whitespace separated).
    #[arg(long, default_value = DEFAULT_SENSOR_COMMAND)]
    pub sensor_command: String,

    /// Transform command line; `output <name> transform <angle>` is appended.
    #[arg(long, default_value = DEFAULT_TRANSFORM_COMMAND)]
    pub transform_command: String,
}

impl StatusArgs {
    pub fn config(self, socket: PathBuf) -> DaemonConfig {
        DaemonConfig {
            socket,
            output: self.output_name,
            labels: StatusLabels {
                enabled: self.enabled_text,
                disabled: self.disabled_text,
            },
            hardware_disabled_orientation: Orientation::from(self.hardware_disabled_orientation),
            sensor_command: split_command(&self.sensor_command),
            transform_command: split_command(&self.transform_command),
        }
    }

    pub fn run(self, socket: PathBuf) -> Result<ExitCode> {
        start_blocking(self.config(socket)).context("status daemon exited with error")?;
        Ok(ExitCode::SUCCESS)
    }
}
