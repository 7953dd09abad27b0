// In: src/hybrid/orchestrator.rs

//! The pure compression coordinator for a single signal.
//!
//! `compress` validates the configuration, runs the family selector and
//! measures the winner against the plain backend; `decompress` reverses the
//! outer pass and rebuilds the signal from the fields stored in the artifact.

use super::artifact::HybridArtifact;
use super::selector::FamilySelector;
use crate::config::HybridConfig;
use crate::error::HybridError;
use crate::kernels::zstd;
use crate::traits::WaveletTransform;
use crate::utils::F32_WIDTH;

//==================================================================================
// 1. Report
//==================================================================================

/// The outcome of compressing one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    /// The stored artifact bytes.
    pub artifact: Vec<u8>,
    pub basis_id: String,
    /// Position of the winning basis in the candidate list.
    pub candidate_index: usize,
    /// Whether RP² symmetric coding was applied to the approximation.
    pub approx_symmetric: bool,
    /// The RP² seam of the approximation, if symmetric coding was applied.
    pub seam: Option<usize>,
    /// Size of the input as raw `f32` bytes.
    pub raw_size: usize,
    /// Size of the plain backend compression of the raw bytes.
    pub baseline_size: usize,
}

impl CompressionReport {
    /// Raw size over stored size.
    pub fn ratio(&self) -> f64 {
        self.raw_size as f64 / self.artifact.len().max(1) as f64
    }

    /// Baseline size over stored size; above 1.0 means the hybrid path won.
    pub fn advantage(&self) -> f64 {
        self.baseline_size as f64 / self.artifact.len().max(1) as f64
    }

    pub fn beats_baseline(&self) -> bool {
        self.artifact.len() < self.baseline_size
    }
}

//==================================================================================
// 2. Public Orchestration API
//==================================================================================

/// Compresses `seq` with the best candidate basis named in `config`.
pub fn compress(
    seq: &[f32],
    transform: &dyn WaveletTransform,
    config: &HybridConfig,
) -> Result<CompressionReport, HybridError> {
    config.validate()?;

    let selector = FamilySelector::new(transform, config);
    let selection = selector.select_best(
        seq,
        &config.candidate_bases,
        config.levels,
        config.threshold_factor,
    )?;

    let baseline_size = zstd::baseline_size(seq, config.zstd_level())?;
    let report = CompressionReport {
        artifact: selection.bytes,
        basis_id: selection.basis_id,
        candidate_index: selection.candidate_index,
        approx_symmetric: selection.approx_symmetric,
        seam: selection.seam,
        raw_size: seq.len() * F32_WIDTH,
        baseline_size,
    };

    log::info!(
        "Hybrid: {} -> {} bytes (ratio {:.2}x, {:.2}x vs plain backend at {} bytes)",
        report.raw_size,
        report.artifact.len(),
        report.ratio(),
        report.advantage(),
        report.baseline_size
    );
    Ok(report)
}

/// Rebuilds the (lossy) signal stored in `bytes`.
pub fn decompress(bytes: &[u8], transform: &dyn WaveletTransform) -> Result<Vec<f32>, HybridError> {
    let artifact = HybridArtifact::deserialize(bytes)?;
    log::debug!(
        "Decoding artifact: basis={} levels={} orig_len={} approx_symmetric={}",
        artifact.basis_id,
        artifact.levels,
        artifact.orig_len,
        artifact.approx_is_symmetric
    );
    artifact.reconstruct(transform)
}
