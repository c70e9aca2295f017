//! One-byte wire form of [`Command`].
//!
//! A client connection carries exactly one byte: the command ordinal.

use crate::error::CoreError;
use crate::types::Command;

/// Encode a command to its wire byte.
pub fn encode(command: Command) -> u8 {
    command as u8
}

/// Decode a wire byte, failing with [`CoreError::InvalidCommand`] for
/// anything outside `0..=4`.
pub fn decode(byte: u8) -> Result<Command, CoreError> {
    match byte {
        0 => Ok(Command::Disable),
        1 => Ok(Command::Enable),
        2 => Ok(Command::Toggle),
        3 => Ok(Command::DisableHardware),
        4 => Ok(Command::ProxyEvents),
        other => Err(CoreError::InvalidCommand(other)),
    }
}

impl TryFrom<u8> for Command {
    type Error = CoreError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        decode(byte)
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        encode(command)
    }
}
