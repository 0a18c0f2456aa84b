//! General utilities shared across the crate.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::protocol_constants::AIRPLAY_VOLUME_RANGE_DB;

// ─────────────────────────────────────────────────────────────────────────────
// Time Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the current Unix timestamp in milliseconds.
///
/// Returns 0 if the system clock is before the Unix epoch (shouldn't happen in practice).
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Volume Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Clamps a linear volume into `0.0..=1.0`. NaN maps to 0.
#[must_use]
pub fn clamp_volume(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Converts a linear `0.0..=1.0` volume to AirPlay device units.
///
/// AirPlay receivers take a decibel-like value where `0` is full volume and
/// `-30` is the quietest step.
#[must_use]
pub fn linear_to_airplay_units(level: f64) -> f64 {
    (level - 1.0) * AIRPLAY_VOLUME_RANGE_DB
}
