// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the stable public-facing API of the library. It hides the
// pipeline's internal types (selector, coefficient sets, RP² blocks) behind a
// handful of stateless functions over plain `f32` slices and byte buffers.
//
// Data Flow (Compression):
//
//   1. [Stateless API (compress_signal)]     -> Receives `&[f32]` + `&HybridConfig`
//         |
//         `-> supplies the built-in `PeriodicDwt` (or a caller's transform)
//         |
//   2. [Hybrid Engine (hybrid::orchestrator)] -> FamilySelector trial search
//         |
//         `-> Returns `CompressionReport` (artifact bytes + selection summary)
//
// Data Flow (Decompression):
//
//   1. [Stateless API (decompress_signal)]   -> Receives `&[u8]`
//         |
//   2. [Hybrid Engine (hybrid::orchestrator)] -> outer pass, parse, inverse transform
//         |
//         `-> Returns `Vec<f32>` truncated to the original length
//
// ====================================================================================
pub mod format;
pub mod stateless_api;

// --- Stateless API ---
pub use stateless_api::{
    analyze_artifact, compress_signal, compress_signal_with, decompress_signal,
    decompress_signal_with,
};

// --- Format Constants and Structs ---
pub use format::{ArtifactStats, ARTIFACT_MAGIC, FORMAT_VERSION};
