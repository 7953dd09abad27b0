//! This module contains the detail-coefficient denoising kernel.
//!
//! The noise scale of a detail band is estimated robustly from the median
//! absolute value (MAD, normalized to a Gaussian sigma by `0.6745`), and the
//! band is soft-thresholded at `factor * sigma`. This step is lossy and runs
//! only on the encode side; decode consumes the shrunk values verbatim.

use super::stats::median_abs;

/// Normalizes the median absolute deviation to a Gaussian-equivalent sigma.
pub const MAD_TO_SIGMA: f64 = 0.6745;

/// Estimates the noise sigma of a detail band. Empty bands have zero noise.
pub fn estimate_sigma(detail: &[f32]) -> f64 {
    median_abs(detail).map_or(0.0, |m| m / MAD_TO_SIGMA)
}

/// Soft-shrinks a single value toward zero by `thresh`.
#[inline]
pub fn shrink(x: f32, thresh: f32) -> f32 {
    let magnitude = x.abs() - thresh;
    if magnitude > 0.0 {
        x.signum() * magnitude
    } else {
        0.0
    }
}

/// Denoises one detail band: `sign(x) * max(|x| - factor * sigma, 0)`.
///
/// Applying this twice with the same `factor` is a no-op the second time
/// whenever `factor >= 2 * 0.6745`, because the first pass zeroes more than
/// half of the band and the recomputed threshold collapses to zero.
pub fn threshold(detail: &[f32], factor: f32) -> Vec<f32> {
    if detail.is_empty() {
        return Vec::new();
    }
    let thresh = (factor as f64 * estimate_sigma(detail)) as f32;
    detail.iter().map(|&x| shrink(x, thresh)).collect()
}
