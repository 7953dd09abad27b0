// In: src/bridge/format.rs

//! Defines the on-disk constants and the public analysis struct for the hybrid
//! artifact format. `hybrid::artifact` is the only reader and writer of the
//! binary layout; this module only fixes its identity.

//==================================================================================
// Hybrid Artifact Format
//==================================================================================

/// The magic number identifying a hybrid artifact (inside the outer compression pass).
pub const ARTIFACT_MAGIC: &[u8; 4] = b"RP2H";
/// The current version of the hybrid artifact format.
pub const FORMAT_VERSION: u16 = 1;

/// Bit 0 of the flags byte: the approximation payload is an RP² symmetric block.
pub const FLAG_APPROX_SYMMETRIC: u8 = 0b0000_0001;
/// Every flag bit this version understands.
pub const KNOWN_FLAGS: u8 = FLAG_APPROX_SYMMETRIC;

/// The public-facing result of `analyze_artifact`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStats {
    pub format_version: u16,
    pub basis_id: String,
    pub levels: u16,
    pub orig_len: u64,
    pub approx_is_symmetric: bool,
    pub approx_size: usize,
    pub detail_sizes: Vec<usize>,
    /// Size of the fixed and variable header, before the outer pass.
    pub header_size: usize,
    /// Size of all payloads, before the outer pass.
    pub data_size: usize,
    /// Size of the artifact as stored (after the outer pass).
    pub total_size: usize,
}
