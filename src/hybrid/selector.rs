//! The family selector: an empirical, trial-based search over wavelet bases.
//!
//! Every candidate basis is run through the full hybrid encode path
//! (decompose, RP² on the approximation, soft-threshold the details, pack,
//! outer pass) and the smallest stored artifact wins. Ties go to the earliest
//! candidate. Any error the transform reports for a basis skips that basis;
//! a failure while encoding or packing its coefficients aborts the search.

use std::time::Instant;

use rayon::prelude::*;

use super::artifact::HybridArtifact;
use crate::config::HybridConfig;
use crate::error::HybridError;
use crate::kernels::soft_threshold;
use crate::rp2::Rp2Codec;
use crate::traits::WaveletTransform;
use crate::utils::typed_slice_to_bytes;

//==================================================================================
// Public Structs
//==================================================================================

/// The winning candidate of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The stored (outer-compressed) artifact bytes.
    pub bytes: Vec<u8>,
    pub artifact: HybridArtifact,
    pub basis_id: String,
    /// Position of the winner in the candidate list.
    pub candidate_index: usize,
    /// Whether RP² symmetric coding was applied to the approximation.
    pub approx_symmetric: bool,
    /// The RP² seam of the approximation, when symmetric coding was applied.
    pub seam: Option<usize>,
}

/// A fully encoded candidate, before the minimum is taken.
#[derive(Debug)]
struct Trial {
    bytes: Vec<u8>,
    artifact: HybridArtifact,
    seam: Option<usize>,
}

/// Searches candidate bases for the smallest hybrid artifact.
pub struct FamilySelector<'a> {
    transform: &'a dyn WaveletTransform,
    codec: Rp2Codec,
    parallel: bool,
}

//==================================================================================
// Core Implementation
//==================================================================================

impl<'a> FamilySelector<'a> {
    pub fn new(transform: &'a dyn WaveletTransform, config: &HybridConfig) -> Self {
        Self {
            transform,
            codec: Rp2Codec::from_config(config),
            parallel: config.parallel_search,
        }
    }

    /// Runs every candidate and returns the one with the smallest stored size.
    ///
    /// # Errors
    /// * `InvalidConfig` for an empty candidate list or an unusable level count.
    /// * `NoViableBasis` when the transform failed for every candidate.
    /// * Any error raised while encoding or packing a candidate's coefficients.
    pub fn select_best(
        &self,
        seq: &[f32],
        candidate_bases: &[String],
        levels: usize,
        thresh_factor: f32,
    ) -> Result<Selection, HybridError> {
        if candidate_bases.is_empty() {
            return Err(HybridError::InvalidConfig(
                "candidate_bases must contain at least one basis".to_string(),
            ));
        }
        let levels_u16 = u16::try_from(levels)
            .ok()
            .filter(|&l| l > 0)
            .ok_or_else(|| {
                HybridError::InvalidConfig(format!("levels must be in 1..={}, got {}", u16::MAX, levels))
            })?;

        let start_overall = Instant::now();
        log::info!(
            "\n--- FAMILY SELECTION: n={} levels={} candidates={:?} parallel={} ---",
            seq.len(),
            levels,
            candidate_bases,
            self.parallel
        );

        let trials: Vec<Option<Trial>> = if self.parallel {
            candidate_bases
                .par_iter()
                .map(|basis| self.run_candidate(seq, basis, levels_u16, thresh_factor))
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<_, _>>()?
        } else {
            candidate_bases
                .iter()
                .map(|basis| self.run_candidate(seq, basis, levels_u16, thresh_factor))
                .collect::<Result<_, _>>()?
        };

        let (candidate_index, winner) =
            pick_smallest(trials).ok_or(HybridError::NoViableBasis {
                tried: candidate_bases.len(),
            })?;

        log::info!(
            "--- WINNER: {} (candidate {}) | Size: {} | RP² on approx: {} | Total: {:.2?} ---",
            winner.artifact.basis_id,
            candidate_index,
            winner.bytes.len(),
            winner.artifact.approx_is_symmetric,
            start_overall.elapsed()
        );

        Ok(Selection {
            basis_id: winner.artifact.basis_id.clone(),
            candidate_index,
            approx_symmetric: winner.artifact.approx_is_symmetric,
            seam: winner.seam,
            bytes: winner.bytes,
            artifact: winner.artifact,
        })
    }

    /// Encodes one candidate. `Ok(None)` means the basis was skipped.
    fn run_candidate(
        &self,
        seq: &[f32],
        basis: &str,
        levels: u16,
        thresh_factor: f32,
    ) -> Result<Option<Trial>, HybridError> {
        let start_candidate = Instant::now();
        match self.encode_candidate(seq, basis, levels, thresh_factor) {
            Ok(trial) => {
                log::info!(
                    "  - Candidate: {:<8} | Score (Size): {} | RP²: {} | Time: {:.2?}",
                    basis,
                    trial.bytes.len(),
                    trial.artifact.approx_is_symmetric,
                    start_candidate.elapsed(),
                );
                log_metric!(
                    "event" = "candidate_scored",
                    "basis" = basis,
                    "size" = trial.bytes.len(),
                    "approx_symmetric" = trial.artifact.approx_is_symmetric
                );
                Ok(Some(trial))
            }
            Err(e) if e.is_recoverable_for_candidate() => {
                log::warn!("  - Candidate: {:<8} | SKIPPED: {}", basis, e);
                log_metric!("event" = "candidate_skipped", "basis" = basis, "reason" = &e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn encode_candidate(
        &self,
        seq: &[f32],
        basis: &str,
        levels: u16,
        thresh_factor: f32,
    ) -> Result<Trial, HybridError> {
        // Whatever the collaborator reports for this basis only disqualifies the basis.
        let coeffs = self
            .transform
            .decompose(seq, basis, usize::from(levels))
            .map_err(|e| {
                if e.is_recoverable_for_candidate() {
                    e
                } else {
                    HybridError::TransformError {
                        basis: basis.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;
        if coeffs.levels() != usize::from(levels) {
            return Err(HybridError::TransformError {
                basis: basis.to_string(),
                reason: format!(
                    "expected {} detail bands, transform produced {}",
                    levels,
                    coeffs.levels()
                ),
            });
        }

        let (block, approx_is_symmetric) = self.codec.encode(&coeffs.approximation)?;

        let detail_buffers: Vec<Vec<u8>> = coeffs
            .details
            .iter()
            .map(|band| {
                let shrunk = soft_threshold::threshold(band, thresh_factor);
                log::debug!(
                    "{}: thresholded band of {} ({} zeroed)",
                    basis,
                    band.len(),
                    shrunk.iter().filter(|&&v| v == 0.0).count()
                );
                typed_slice_to_bytes(&shrunk)
            })
            .collect();

        let artifact = HybridArtifact {
            approx_payload: block.payload()?,
            approx_is_symmetric,
            detail_buffers,
            orig_len: seq.len() as u64,
            basis_id: basis.to_string(),
            levels,
        };
        let bytes = artifact.serialize(self.codec.level())?;

        Ok(Trial {
            bytes,
            artifact,
            seam: block.seam(),
        })
    }
}

/// Returns the smallest trial and its index. Strict `<` keeps the earliest on ties.
fn pick_smallest(trials: Vec<Option<Trial>>) -> Option<(usize, Trial)> {
    let mut best: Option<(usize, Trial)> = None;
    for (index, trial) in trials.into_iter().enumerate() {
        let Some(trial) = trial else { continue };
        let is_better = match &best {
            Some((_, current)) => trial.bytes.len() < current.bytes.len(),
            None => true,
        };
        if is_better {
            best = Some((index, trial));
        }
    }
    best
}
