//! Pure, stateless kernels used by the RP² codec and the hybrid pipeline.
//!
//! - `zstd`: the byte compressor backend.
//! - `stats`: variance and median helpers.
//! - `soft_threshold`: MAD-scaled soft thresholding of detail coefficients.

pub mod soft_threshold;
pub mod stats;
pub mod zstd;
