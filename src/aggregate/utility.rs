/// Signed percentage change from `previous` to `current`.
///
/// Returns exactly `0.0` when `previous` is zero, so the result is never NaN
/// or infinite. The value is not rounded.
pub fn trend_percent(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        0.0
    } else {
        ((current as f64 - previous as f64) / previous as f64) * 100.0
    }
}
