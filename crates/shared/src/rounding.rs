//! Numeric helpers.

/// Rounds a value to the given number of decimal places.
///
/// Values too large to scale are already integral at that precision and are
/// returned unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
