//! sway-rotate core library: domain types, the wire codec and sensor line parsing.
//!
//! Public API surface:
//! - [`types`]: [`Command`], [`Orientation`], [`Rotation`], [`Event`]
//! - [`codec`]: one-byte command wire form
//! - [`sensor`]: `monitor-sensor` output parsing
//! - [`error`]: [`CoreError`]

pub mod codec;
pub mod error;
pub mod sensor;
pub mod types;

pub use error::CoreError;
pub use types::{Command, Event, Orientation, Rotation};
