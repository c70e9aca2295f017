//! Parsing of `monitor-sensor --accel` output.
//!
//! Two line shapes carry an orientation:
//!
//! ```text
//! === Has accelerometer (orientation: normal, tilt: vertical)
//!     Accelerometer orientation changed: left-up
//! ```
//!
//! Everything else (light sensor, proximity, blank lines) is irrelevant.

use crate::error::CoreError;
use crate::types::Orientation;

const CHANGED_PREFIX: &str = "    Accelerometer orientation changed: ";
const INITIAL_PREFIX: &str = "=== Has accelerometer (orientation: ";

/// Extract the raw orientation name from a sensor line, if the line has one
/// of the recognized shapes.
pub fn orientation_name(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(name) = line.strip_prefix(CHANGED_PREFIX) {
        return Some(name);
    }
    let rest = line.strip_prefix(INITIAL_PREFIX)?.strip_suffix(')')?;
    rest.split_once(", ").map(|(name, _)| name)
}

/// Parse one sensor line.
///
/// Returns `Ok(None)` for lines that carry no orientation and
/// [`CoreError::UnknownOrientation`] when a recognized line names an
/// orientation outside the known set.
pub fn parse_line(line: &str) -> Result<Option<Orientation>, CoreError> {
    orientation_name(line)
        .map(str::parse::<Orientation>)
        .transpose()
}
