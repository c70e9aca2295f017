//! Error types for rotate-core.

use thiserror::Error;

/// Errors raised while decoding client bytes or sensor output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A client sent a byte that is not a known command ordinal.
    #[error("invalid command byte {0:#04x}")]
    InvalidCommand(u8),

    /// The sensor reported an orientation name outside the known set.
    #[error("unknown orientation '{0}'")]
    UnknownOrientation(String),

    /// `Orientation::Unset` was used where a concrete rotation is required.
    #[error("orientation 'unset' is not a rotation target")]
    UnsetRotation,
}
