//! Minutes-remaining estimate shown while the trip is in progress.

/// Assumed length of a ride when no better figure is known.
pub const DEFAULT_ASSUMED_TRIP_MINUTES: u32 = 15;

/// `max(1, round((1 - clamp(progress, 0, 1)) * assumed_total_minutes))`.
///
/// Never reports zero: the rider still sees "1 min" on the final stretch.
pub fn eta_minutes(progress: f64, assumed_total_minutes: u32) -> u32 {
    let progress = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let remaining = ((1.0 - progress) * f64::from(assumed_total_minutes)).round() as u32;
    remaining.max(1)
}
