//! Domain types shared by the daemon and its clients.
//!
//! [`Orientation`] uses the same lowercase-hyphenated names everywhere:
//! `monitor-sensor` output, CLI values and the JSON status stream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A control command sent by a short-lived client to the running daemon.
///
/// The discriminant is the wire byte; see [`crate::codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Disable = 0,
    Enable = 1,
    Toggle = 2,
    /// Disable triggered by a hardware switch (tablet mode off, lid, ...).
    DisableHardware = 3,
    /// Turn this connection into a status stream subscriber.
    ProxyEvents = 4,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Disable,
        Command::Enable,
        Command::Toggle,
        Command::DisableHardware,
        Command::ProxyEvents,
    ];
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Disable => write!(f, "disable"),
            Command::Enable => write!(f, "enable"),
            Command::Toggle => write!(f, "toggle"),
            Command::DisableHardware => write!(f, "disable-hardware"),
            Command::ProxyEvents => write!(f, "proxy-events"),
        }
    }
}

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// Physical orientation of the display as reported by the accelerometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Unset,
    Normal,
    LeftUp,
    RightUp,
    BottomUp,
}

impl Orientation {
    pub const ALL: [Orientation; 5] = [
        Orientation::Unset,
        Orientation::Normal,
        Orientation::LeftUp,
        Orientation::RightUp,
        Orientation::BottomUp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Unset => "unset",
            Orientation::Normal => "normal",
            Orientation::LeftUp => "left-up",
            Orientation::RightUp => "right-up",
            Orientation::BottomUp => "bottom-up",
        }
    }

    pub fn is_set(self) -> bool {
        self != Orientation::Unset
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| CoreError::UnknownOrientation(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// An orientation the display can actually be rotated to.
///
/// Only constructible from a set [`Orientation`], so `Unset` never reaches
/// the transform command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation(Orientation);

impl Rotation {
    pub fn orientation(self) -> Orientation {
        self.0
    }

    /// Clockwise transform angle in degrees.
    pub fn angle(self) -> u16 {
        match self.0 {
            Orientation::Normal => 0,
            Orientation::RightUp => 90,
            Orientation::BottomUp => 180,
            Orientation::LeftUp => 270,
            Orientation::Unset => unreachable!("Rotation is never built from Unset"),
        }
    }
}

impl TryFrom<Orientation> for Rotation {
    type Error = CoreError;

    fn try_from(orientation: Orientation) -> Result<Self, Self::Error> {
        if orientation.is_set() {
            Ok(Self(orientation))
        } else {
            Err(CoreError::UnsetRotation)
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One item of the daemon's event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Command(Command),
    Orientation(Orientation),
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        Event::Command(command)
    }
}

impl From<Orientation> for Event {
    fn from(orientation: Orientation) -> Self {
        Event::Orientation(orientation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_display_matches_sensor_names() {
        assert_eq!(Orientation::LeftUp.to_string(), "left-up");
        assert_eq!(Orientation::BottomUp.to_string(), "bottom-up");
        assert_eq!(Orientation::Unset.to_string(), "unset");
    }

    #[test]
    fn orientation_from_str_rejects_unknown() {
        assert_eq!("right-up".parse(), Ok(Orientation::RightUp));
        assert_eq!(
            "face-up".parse::<Orientation>(),
            Err(CoreError::UnknownOrientation("face-up".to_string()))
        );
        // Case matters: the sensor always reports lowercase.
        assert!("Normal".parse::<Orientation>().is_err());
    }

    #[test]
    fn orientation_default_is_unset() {
        assert_eq!(Orientation::default(), Orientation::Unset);
        assert!(!Orientation::default().is_set());
    }

    #[test]
    fn rotation_rejects_unset() {
        assert_eq!(
            Rotation::try_from(Orientation::Unset),
            Err(CoreError::UnsetRotation)
        );
    }

    #[test]
    fn rotation_angles() {
        let angle = |o: Orientation| Rotation::try_from(o).expect("set orientation").angle();
        assert_eq!(angle(Orientation::Normal), 0);
        assert_eq!(angle(Orientation::RightUp), 90);
        assert_eq!(angle(Orientation::BottomUp), 180);
        assert_eq!(angle(Orientation::LeftUp), 270);
    }

    #[test]
    fn command_display() {
        assert_eq!(Command::DisableHardware.to_string(), "disable-hardware");
        assert_eq!(Command::ProxyEvents.to_string(), "proxy-events");
    }
}
