//! Static per-invocation daemon configuration.

use std::path::PathBuf;

use rotate_core::Orientation;

pub const DEFAULT_OUTPUT: &str = "*";
pub const DEFAULT_ENABLED_TEXT: &str = "auto-rotate ON";
pub const DEFAULT_DISABLED_TEXT: &str = "auto-rotate OFF";
pub const DEFAULT_SENSOR_COMMAND: &str = "monitor-sensor --accel";
pub const DEFAULT_TRANSFORM_COMMAND: &str = "swaymsg";

/// Everything the daemon needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Control socket path (see [`crate::paths::socket_path`]).
    pub socket: PathBuf,
    /// Output selector handed to the transform command.
    pub output: String,
    pub labels: StatusLabels,
    /// Orientation forced by a hardware disable; `Unset` leaves the screen alone.
    pub hardware_disabled_orientation: Orientation,
    /// Sensor monitor program followed by its arguments.
    pub sensor_command: Vec<String>,
    /// Transform program and leading arguments; `output <selector> transform
    /// <angle>` is appended.
    pub transform_command: Vec<String>,
}

impl DaemonConfig {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
            output: DEFAULT_OUTPUT.to_string(),
            labels: StatusLabels::default(),
            hardware_disabled_orientation: Orientation::Normal,
            sensor_command: split_command(DEFAULT_SENSOR_COMMAND),
            transform_command: split_command(DEFAULT_TRANSFORM_COMMAND),
        }
    }
}

/// Split a command line on whitespace. No quoting is supported.
pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// Status bar text for each `enabled` state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLabels {
    pub enabled: String,
    pub disabled: String,
}

impl StatusLabels {
    pub fn for_state(&self, enabled: bool) -> &str {
        if enabled {
            &self.enabled
        } else {
            &self.disabled
        }
    }
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_ENABLED_TEXT.to_string(),
            disabled: DEFAULT_DISABLED_TEXT.to_string(),
        }
    }
}
