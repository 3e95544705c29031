//! Signed relative change between two scalar readings

/// Relative change from `previous` to `current`, signed and unbounded.
///
/// Zero-handling: both zero is no change; growth from zero is reported as
/// exactly 1.0, a 100%-increase sentinel rather than a derived ratio.
/// Never fails or divides by zero.
pub fn relative_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 && current == 0.0 {
        return 0.0;
    }
    if previous == 0.0 && current > 0.0 {
        return 1.0;
    }
    let denom = if previous == 0.0 { 1.0 } else { previous };
    (current - previous) / denom
}
