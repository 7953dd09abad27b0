// In: src/bridge/stateless_api.rs

use crate::bridge::format::ArtifactStats;
use crate::config::HybridConfig;
use crate::error::HybridError;
use crate::hybrid;
use crate::hybrid::artifact::HybridArtifact;
use crate::hybrid::CompressionReport;
use crate::kernels::zstd;
use crate::traits::WaveletTransform;
use crate::transform::PeriodicDwt;

/// Compresses a signal with the built-in periodized wavelet transform.
pub fn compress_signal(
    seq: &[f32],
    config: &HybridConfig,
) -> Result<CompressionReport, HybridError> {
    compress_signal_with(seq, &PeriodicDwt::new(), config)
}

/// Compresses a signal using a caller-supplied transform collaborator.
pub fn compress_signal_with(
    seq: &[f32],
    transform: &dyn WaveletTransform,
    config: &HybridConfig,
) -> Result<CompressionReport, HybridError> {
    hybrid::compress(seq, transform, config)
}

/// Decompresses an artifact produced by [`compress_signal`].
pub fn decompress_signal(bytes: &[u8]) -> Result<Vec<f32>, HybridError> {
    decompress_signal_with(bytes, &PeriodicDwt::new())
}

/// Decompresses an artifact with the same transform collaborator that produced it.
pub fn decompress_signal_with(
    bytes: &[u8],
    transform: &dyn WaveletTransform,
) -> Result<Vec<f32>, HybridError> {
    hybrid::decompress(bytes, transform)
}

/// Analyzes a stored artifact without reconstructing the signal.
/// This undoes the outer pass, then delegates to the header-only `peek_info`.
pub fn analyze_artifact(bytes: &[u8]) -> Result<ArtifactStats, HybridError> {
    let inner = zstd::decompress(bytes)?;
    let info = HybridArtifact::peek_info(&inner)?;

    Ok(ArtifactStats {
        format_version: info.format_version,
        basis_id: info.basis_id,
        levels: info.levels,
        orig_len: info.orig_len,
        approx_is_symmetric: info.approx_is_symmetric,
        approx_size: info.approx_size,
        detail_sizes: info.detail_sizes,
        header_size: info.header_size,
        data_size: info.data_size,
        total_size: bytes.len(),
    })
}
