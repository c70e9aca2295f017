//! Applies a rotation by running the compositor's output transform command.

use std::process::Stdio;

use tokio::process::Command;

use rotate_core::Rotation;

use crate::error::{io_err, DaemonError};

/// Runs `<command...> output <selector> transform <angle>`.
#[derive(Debug, Clone)]
pub struct RotationActuator {
    program: String,
    args: Vec<String>,
    output: String,
}

impl RotationActuator {
    /// Build from a program followed by leading arguments, e.g. `["swaymsg"]`.
    pub fn from_command(command: &[String], output: impl Into<String>) -> Result<Self, DaemonError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| DaemonError::Protocol("empty transform command".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            output: output.into(),
        })
    }

    /// Rotate the configured output and wait for the command to finish.
    ///
    /// A non-zero exit is [`DaemonError::ActuationFailed`].
    pub async fn actuate(&self, rotation: Rotation) -> Result<(), DaemonError> {
        tracing::info!(output = %self.output, %rotation, "rotating screen");
        let status = Command::new(&self.program)
            .args(&self.args)
            .args(["output", self.output.as_str(), "transform"])
            .arg(rotation.angle().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .await
            .map_err(|e| io_err(&self.program, e))?;

        if !status.success() {
            return Err(DaemonError::ActuationFailed { rotation, status });
        }
        tracing::debug!(%rotation, angle = rotation.angle(), "rotated screen");
        Ok(())
    }
}
