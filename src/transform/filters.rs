//! Orthogonal wavelet filter banks.
//!
//! Only the scaling (lowpass) filter is stored; the wavelet (highpass) filter
//! follows from the quadrature-mirror relation
//! `hi[m] = (-1)^m * lo[L-1-m]`, and synthesis reuses the analysis filters
//! because every bank here is orthonormal.

use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::HybridError;

const HAAR: [f64; 2] = [FRAC_1_SQRT_2, FRAC_1_SQRT_2];

const DB2: [f64; 4] = [
    0.48296291314469025,
    0.836516303737469,
    0.22414386804185735,
    -0.12940952255092145,
];

const DB3: [f64; 6] = [
    0.3326705529509569,
    0.8068915093133388,
    0.4598775021193313,
    -0.13501102001039084,
    -0.08544127388224149,
    0.035226291882100656,
];

const DB4: [f64; 8] = [
    0.23037781330885523,
    0.7148465705525415,
    0.6308807679295904,
    -0.02798376941698385,
    -0.18703481171888114,
    0.030841381835986965,
    0.032883011666982945,
    -0.010597401784997278,
];

const SYM4: [f64; 8] = [
    0.0322231006040427,
    -0.012603967262037833,
    -0.09921954357684722,
    0.29785779560527736,
    0.8037387518059161,
    0.49761866763201545,
    -0.02963552764599851,
    -0.07576571478927333,
];

const COIF1: [f64; 6] = [
    -0.0727326195128539,
    0.3378976624578092,
    0.8525720202122554,
    0.38486484686420286,
    -0.0727326195128539,
    -0.01565572813546454,
];

/// Basis identifiers understood by [`FilterBank::lookup`].
pub const SUPPORTED_BASES: &[&str] = &["haar", "db1", "db2", "db3", "db4", "sym4", "coif1"];

/// Analysis/synthesis filter pair of one orthogonal wavelet.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    pub lo: Vec<f64>,
    pub hi: Vec<f64>,
}

impl FilterBank {
    fn from_scaling(lo: &[f64]) -> Self {
        let n = lo.len();
        let hi = (0..n)
            .map(|m| {
                let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
                sign * lo[n - 1 - m]
            })
            .collect();
        Self { lo: lo.to_vec(), hi }
    }

    /// Resolves a basis identifier (case-insensitive) to its filter bank.
    pub fn lookup(basis_id: &str) -> Result<Self, HybridError> {
        let scaling: &[f64] = match basis_id.to_ascii_lowercase().as_str() {
            "haar" | "db1" => &HAAR,
            "db2" => &DB2,
            "db3" => &DB3,
            "db4" => &DB4,
            "sym4" => &SYM4,
            "coif1" => &COIF1,
            _ => return Err(HybridError::UnsupportedBasis(basis_id.to_string())),
        };
        Ok(Self::from_scaling(scaling))
    }

    pub fn len(&self) -> usize {
        self.lo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lo.is_empty()
    }
}
