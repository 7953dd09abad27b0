// In: src/error.rs

//! This module defines the single, unified error type for the entire tambak-rp2 library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HybridError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// A serialized artifact or RP² block is truncated or internally inconsistent.
    #[error("Artifact format error: {0}")]
    FormatError(String),

    /// The byte compressor backend failed to compress or decompress a block.
    #[error("Compressor backend failed: {0}")]
    BackendError(String),

    /// The wavelet transform could not process this input for the given basis.
    /// Recoverable during family selection: the candidate is skipped.
    #[error("Wavelet transform failed for basis '{basis}': {reason}")]
    TransformError { basis: String, reason: String },

    /// The wavelet transform does not know this basis identifier.
    #[error("Unsupported wavelet basis: {0}")]
    UnsupportedBasis(String),

    /// Every candidate basis failed during family selection.
    #[error("No viable wavelet basis: all {tried} candidate(s) failed")]
    NoViableBasis { tried: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during config parsing.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    // =========================================================================
    // === Low-Level Kernel Errors
    // =========================================================================
    #[error("Buffer length mismatch: expected a multiple of {0}, got {1}")]
    BufferMismatch(usize, usize),
}

impl HybridError {
    /// Returns `true` for failures that only disqualify a single candidate basis.
    pub fn is_recoverable_for_candidate(&self) -> bool {
        matches!(
            self,
            HybridError::TransformError { .. } | HybridError::UnsupportedBasis(_)
        )
    }
}
