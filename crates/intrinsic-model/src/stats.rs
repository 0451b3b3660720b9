//! Summary statistics over ordered yearly series.
//!
//! Inputs are ordered oldest to newest. Non-finite values are dropped
//! before aggregation so a single bad ratio cannot poison a median.

/// The last `n` values of a series (the whole series if shorter).
pub fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Median of the finite values.
///
/// An even count yields the mean of the two middle values. Returns `None`
/// when no finite value is present.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = finite(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean of the finite values.
pub fn mean(values: &[f64]) -> Option<f64> {
    let kept = finite(values);
    if kept.is_empty() {
        return None;
    }
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Median of the trailing `window` values.
pub fn trailing_median(values: &[f64], window: usize) -> Option<f64> {
    median(tail(values, window))
}

/// Mean of the trailing `window` values.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    mean(tail(values, window))
}

/// Compound annual growth rate between two positive values.
///
/// `(last / first)^(1 / periods) - 1`. Returns `None` for zero periods or
/// non-positive endpoints.
pub fn cagr(first: f64, last: f64, periods: usize) -> Option<f64> {
    if periods == 0 || first <= 0.0 || last <= 0.0 || !first.is_finite() || !last.is_finite() {
        return None;
    }
    Some((last / first).powf(1.0 / periods as f64) - 1.0)
}

/// Simple average of period-over-period growth rates.
///
/// Periods whose starting value is zero are skipped.
pub fn mean_period_growth(values: &[f64]) -> Option<f64> {
    let growth: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    mean(&growth)
}
