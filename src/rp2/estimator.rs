//! The symmetry gain estimator.
//!
//! Decides whether a sequence's first half is close enough to the negated,
//! reversed second half that coding the half plus a residual beats coding the
//! whole. The score is in arbitrary units; only its sign is meaningful.

use crate::kernels::stats::variance;

/// Sequences shorter than this cannot amortize the two-stream overhead.
pub const MIN_SYMMETRIC_LEN: usize = 512;

/// Modelled bits per sample.
const BITS_PER_SAMPLE: f64 = 32.0;
/// Conservatism discount applied to the modelled savings.
const CONSERVATISM: f64 = 0.5;
/// Fixed framing and compressor overhead of a symmetric block.
const FIXED_OVERHEAD: f64 = 2000.0;
/// Keeps the variance ratio finite for constant inputs.
const VARIANCE_EPSILON: f64 = 1e-10;

/// A signed savings score. Negative means "do not apply symmetric encoding".
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SymmetryGain(pub f64);

impl SymmetryGain {
    /// The sentinel returned whenever symmetric encoding is ruled out.
    pub const NONE: SymmetryGain = SymmetryGain(-1.0);

    /// True if the symmetric two-stream encoding should be used.
    pub fn is_worthwhile(&self) -> bool {
        self.0 >= 0.0
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Scores the anti-symmetric half-split of `seq`.
pub fn estimate(seq: &[f32]) -> SymmetryGain {
    let n = seq.len();
    if n < MIN_SYMMETRIC_LEN {
        return SymmetryGain::NONE;
    }

    let mid = n / 2;
    let left = &seq[..mid];
    let tail_end = (mid + left.len()).min(n);
    let flipped: Vec<f32> = seq[mid..tail_end].iter().rev().map(|&v| -v).collect();
    if flipped.len() != left.len() {
        return SymmetryGain::NONE;
    }

    let delta: Vec<f32> = left.iter().zip(&flipped).map(|(&l, &f)| l - f).collect();
    let delta_var = variance(&delta);
    let data_var = variance(seq);
    if delta_var >= data_var {
        return SymmetryGain::NONE;
    }

    let ratio = delta_var / (data_var + VARIANCE_EPSILON);
    SymmetryGain(n as f64 * BITS_PER_SAMPLE * (1.0 - ratio) * CONSERVATISM - FIXED_OVERHEAD)
}
