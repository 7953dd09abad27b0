//! This module defines the collaborator traits the hybrid pipeline is written against.

use crate::error::HybridError;
use crate::transform::CoefficientSet;

/// A multi-level wavelet transform addressed by opaque basis identifiers.
///
/// Implementations must be deterministic. A basis that cannot handle a given
/// input reports `HybridError::TransformError` or `HybridError::UnsupportedBasis`;
/// the family selector treats both as "skip this candidate".
pub trait WaveletTransform: Send + Sync {
    /// Decomposes `signal` into one approximation array and `levels` detail
    /// arrays, coarsest detail first.
    fn decompose(
        &self,
        signal: &[f32],
        basis_id: &str,
        levels: usize,
    ) -> Result<CoefficientSet, HybridError>;

    /// Inverts [`WaveletTransform::decompose`]. The result may be longer than the
    /// original signal; callers truncate to the stored length.
    fn reconstruct(&self, coeffs: &CoefficientSet, basis_id: &str)
        -> Result<Vec<f32>, HybridError>;
}
