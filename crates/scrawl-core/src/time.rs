//! Wall-clock timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as unix milliseconds, the unit used for all commit and
/// join timestamps on the wire.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
