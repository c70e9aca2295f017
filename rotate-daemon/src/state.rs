//! The daemon's state machine.
//!
//! [`DaemonState::apply`] is pure: it updates `enabled`/`orientation` and
//! returns the rotation to apply, if any. The runtime loop performs the
//! actuation and the broadcast.

use serde::Serialize;

use rotate_core::{Command, Event, Orientation, Rotation};

use crate::config::StatusLabels;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonState {
    pub enabled: bool,
    pub orientation: Orientation,
}

impl Default for DaemonState {
    fn default() -> Self {
        Self {
            enabled: true,
            orientation: Orientation::Unset,
        }
    }
}

impl DaemonState {
    /// Apply one queue event and return the rotation to actuate, if any.
    ///
    /// `hardware_disabled` is the orientation forced by
    /// [`Command::DisableHardware`]; `Unset` means "leave the screen as is".
    pub fn apply(&mut self, event: Event, hardware_disabled: Orientation) -> Option<Rotation> {
        match event {
            Event::Command(Command::Disable) => {
                self.enabled = false;
                tracing::debug!("automatic rotation disabled");
                None
            }
            Event::Command(Command::Enable) => {
                self.enabled = true;
                tracing::debug!("automatic rotation enabled");
                Rotation::try_from(self.orientation).ok()
            }
            // Re-enabling through a toggle does not re-apply the stored
            // orientation; the next sensor event or an explicit enable does.
            Event::Command(Command::Toggle) => {
                self.enabled = !self.enabled;
                tracing::debug!(enabled = self.enabled, "automatic rotation toggled");
                None
            }
            Event::Command(Command::DisableHardware) => {
                self.enabled = false;
                tracing::debug!(forced = %hardware_disabled, "automatic rotation disabled (hardware)");
                Rotation::try_from(hardware_disabled).ok()
            }
            Event::Command(Command::ProxyEvents) => None,
            Event::Orientation(orientation) => {
                self.orientation = orientation;
                if self.enabled {
                    Rotation::try_from(orientation).ok()
                } else {
                    tracing::debug!(%orientation, "stored desired orientation");
                    None
                }
            }
        }
    }

    pub fn status(&self, labels: &StatusLabels) -> Status {
        Status {
            text: labels.for_state(self.enabled).to_string(),
            tooltip: format!(
                "Automatic rotation enabled: {}\nOrientation: {}",
                self.enabled, self.orientation
            ),
            class: [
                if self.enabled { "enabled" } else { "disabled" }.to_string(),
                self.orientation.to_string(),
            ],
        }
    }
}

/// One line of the status stream, in the waybar custom module format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub text: String,
    pub tooltip: String,
    pub class: [String; 2],
}

impl Status {
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
