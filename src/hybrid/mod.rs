//! The hybrid wavelet + RP² pipeline.
//!
//! `selector` searches candidate bases, `artifact` owns the container format,
//! and `orchestrator` ties them together for a single signal.

pub mod artifact;
pub mod orchestrator;
pub mod selector;

pub use artifact::{ArtifactHeaderInfo, HybridArtifact};
pub use orchestrator::{compress, decompress, CompressionReport};
pub use selector::{FamilySelector, Selection};
