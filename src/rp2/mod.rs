//! RP²: symmetry-exploiting delta coding of a single real sequence.
//!
//! The estimator decides whether the half-split is worth it; the codec
//! produces and parses the `Direct` and `Symmetric` block forms.

pub mod codec;
pub mod estimator;

pub use codec::{Rp2Block, Rp2Codec};
pub use estimator::{estimate, SymmetryGain};
