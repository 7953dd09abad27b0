//! This file is the root of the `tambak_rp2` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`hybrid`, `rp2`,
//!     `kernels`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the small set of types most callers need, so that
//!     `tambak_rp2::compress_signal(&signal, &HybridConfig::default())` just works.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod hybrid;
pub mod kernels;
pub mod rp2;
pub mod traits;
pub mod transform;
pub mod utils;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use bridge::{
    analyze_artifact, compress_signal, compress_signal_with, decompress_signal,
    decompress_signal_with, ArtifactStats,
};
pub use config::{CompressionProfile, HybridConfig};
pub use error::HybridError;
pub use hybrid::{CompressionReport, FamilySelector, HybridArtifact, Selection};
pub use observability::enable_verbose_logging;
pub use rp2::{Rp2Block, Rp2Codec, SymmetryGain};
pub use traits::WaveletTransform;
pub use transform::{CoefficientSet, PeriodicDwt};
