//! Read-only projections of storage-node state for display.

use std::fmt::Write;

/// Seconds per hour.
const SECS_PER_HOUR: f32 = 3600.0;

/// Modifier tiers shown in [`info_string`].
pub const ILLUSTRATIVE_TIERS: [f32; 3] = [1.0, 2.0, 3.0];

/// Hours of supply held by `stored` at `rate_constant` with no modifier.
///
/// # Examples
///
/// ```
/// use outpost_power::report::base_duration_hours;
///
/// assert_eq!(base_duration_hours(360.0, 0.5), 0.2);
/// ```
pub fn base_duration_hours(stored: f32, rate_constant: f32) -> f32 {
    stored / rate_constant / SECS_PER_HOUR
}

/// Hours of supply held by `stored` with the node's modifier applied.
pub fn adjusted_duration_hours(stored: f32, rate_constant: f32, modifier: f32) -> f32 {
    base_duration_hours(stored, rate_constant) * modifier
}

/// Multi-line description of a storage node for user-facing panels.
pub fn info_string(resource: &str, stored: f32, capacity: f32, rate_constant: f32) -> String {
    let base = base_duration_hours(stored, rate_constant);
    let mut s = format!("{resource}: {stored:.2}/{capacity:.2}");
    for tier in ILLUSTRATIVE_TIERS {
        // Writing to a String cannot fail.
        let _ = write!(s, "\nPower-Unit-Hours ({tier}x): {:.2}", base * tier);
    }
    s
}
