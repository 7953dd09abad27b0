//! Wavelet decomposition used by the hybrid pipeline.
//!
//! The pipeline only talks to the [`crate::traits::WaveletTransform`] trait;
//! [`PeriodicDwt`] is the built-in implementation backed by the orthogonal
//! filter banks in [`filters`].

pub mod dwt;
pub mod filters;

pub use dwt::PeriodicDwt;
pub use filters::{FilterBank, SUPPORTED_BASES};

/// The output of a multi-level decomposition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientSet {
    /// Coarsest-scale approximation coefficients.
    pub approximation: Vec<f32>,
    /// Detail bands, coarsest first.
    pub details: Vec<Vec<f32>>,
}

impl CoefficientSet {
    pub fn new(approximation: Vec<f32>, details: Vec<Vec<f32>>) -> Self {
        Self {
            approximation,
            details,
        }
    }

    /// Number of decomposition levels (one per detail band).
    pub fn levels(&self) -> usize {
        self.details.len()
    }

    pub fn total_coefficients(&self) -> usize {
        self.approximation.len() + self.details.iter().map(Vec::len).sum::<usize>()
    }
}
