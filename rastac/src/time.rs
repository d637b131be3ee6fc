//! Time-related utility functions.
//!
//! Layer identifiers are derived from wall-clock time; this module provides
//! the millisecond timestamp helper used to mint them.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// Saturates to zero if the system clock reports a time before the epoch,
/// which keeps identifier minting total rather than panicking on a
/// misconfigured clock.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
