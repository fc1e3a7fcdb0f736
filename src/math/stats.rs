//! Order statistics.

/// Percentiles `qs ⊂ [0, 100]` of `values` with a single sort, using linear
/// interpolation between the two nearest order statistics
/// (rank `q/100 · (n − 1)`).
///
/// Returns `None` for empty input, any out-of-range `q` or any NaN.
pub fn percentiles(values: &[f64], qs: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    qs.iter()
        .map(|&q| (0.0..=100.0).contains(&q).then(|| interpolate_sorted(&sorted, q)))
        .collect()
}

fn interpolate_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = q / 100.0 * (n as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}
