//! Small numeric kernels shared by the symmetry estimator and the detail
//! thresholder. All accumulation happens in `f64` regardless of input width.

use num_traits::{Float, ToPrimitive};

/// Arithmetic mean. Returns `0.0` for an empty slice.
pub fn mean<T: ToPrimitive + Copy>(values: &[T]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|v| v.to_f64().unwrap_or(0.0)).sum();
    sum / values.len() as f64
}

/// Population variance (divides by `n`). Returns `0.0` for an empty slice.
pub fn variance<T: ToPrimitive + Copy>(values: &[T]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let sq: f64 = values
        .iter()
        .map(|v| {
            let d = v.to_f64().unwrap_or(0.0) - m;
            d * d
        })
        .sum();
    sq / values.len() as f64
}

/// Median of the absolute values. Even lengths average the two middle values.
/// Returns `None` for an empty slice.
pub fn median_abs<T: Float>(values: &[T]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut abs: Vec<f64> = values
        .iter()
        .map(|v| v.abs().to_f64().unwrap_or(0.0))
        .collect();
    abs.sort_by(|a, b| a.total_cmp(b));

    let n = abs.len();
    let median = if n % 2 == 1 {
        abs[n / 2]
    } else {
        (abs[n / 2 - 1] + abs[n / 2]) / 2.0
    };
    Some(median)
}
