//! sway-rotate daemon: sensor reader + state machine + socket server.

pub mod actuator;
pub mod broadcast;
pub mod config;
mod error;
pub mod paths;
pub mod protocol;
mod runtime;
pub mod sensor;
pub mod state;

pub use config::DaemonConfig;
pub use error::DaemonError;
pub use protocol::{relay_status, send_command};
pub use runtime::{bind_exclusive, init_tracing, run, serve, start_blocking};
