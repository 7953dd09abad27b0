//! Periodized multi-level discrete wavelet transform.
//!
//! Each level correlates the signal with the lowpass and highpass filters on a
//! circular (periodic) extension and keeps every second output. With an
//! orthonormal bank this is an orthogonal change of basis, so synthesis is the
//! transpose and reconstruction is exact up to floating-point rounding.
//!
//! Odd-length levels are first extended by repeating their final sample, giving
//! `ceil(n / 2)` coefficients per band; on the way back an approximation that is
//! one sample longer than the next detail band is trimmed.

use super::filters::FilterBank;
use super::CoefficientSet;
use crate::error::HybridError;
use crate::traits::WaveletTransform;

/// The built-in wavelet transform collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodicDwt;

impl PeriodicDwt {
    pub fn new() -> Self {
        Self
    }

    /// Deepest useful decomposition: `floor(log2(n / (filter_len - 1)))`.
    pub fn max_level(signal_len: usize, filter_len: usize) -> usize {
        if filter_len < 2 || signal_len < filter_len - 1 {
            return 0;
        }
        (signal_len / (filter_len - 1)).ilog2() as usize
    }
}

/// One analysis level: returns `(approximation, detail)`, each `ceil(n / 2)` long.
fn analysis_step(input: &[f64], bank: &FilterBank) -> (Vec<f64>, Vec<f64>) {
    let mut extended = input.to_vec();
    if extended.len() % 2 == 1 {
        if let Some(&last) = extended.last() {
            extended.push(last);
        }
    }
    let n = extended.len();
    let half = n / 2;

    let mut approx = Vec::with_capacity(half);
    let mut detail = Vec::with_capacity(half);
    for k in 0..half {
        let mut lo_sum = 0.0;
        let mut hi_sum = 0.0;
        for (t, (&lo, &hi)) in bank.lo.iter().zip(&bank.hi).enumerate() {
            let sample = extended[(2 * k + t) % n];
            lo_sum += lo * sample;
            hi_sum += hi * sample;
        }
        approx.push(lo_sum);
        detail.push(hi_sum);
    }
    (approx, detail)
}

/// One synthesis level, the transpose of [`analysis_step`]. Output is `2 * len` long.
fn synthesis_step(approx: &[f64], detail: &[f64], bank: &FilterBank) -> Vec<f64> {
    let n = 2 * approx.len();
    let mut output = vec![0.0; n];
    for (k, (&a, &d)) in approx.iter().zip(detail).enumerate() {
        for (t, (&lo, &hi)) in bank.lo.iter().zip(&bank.hi).enumerate() {
            output[(2 * k + t) % n] += lo * a + hi * d;
        }
    }
    output
}

impl WaveletTransform for PeriodicDwt {
    fn decompose(
        &self,
        signal: &[f32],
        basis_id: &str,
        levels: usize,
    ) -> Result<CoefficientSet, HybridError> {
        let bank = FilterBank::lookup(basis_id)?;
        if signal.is_empty() {
            return Err(HybridError::TransformError {
                basis: basis_id.to_string(),
                reason: "cannot decompose an empty signal".to_string(),
            });
        }
        let max_level = Self::max_level(signal.len(), bank.len());
        if levels > max_level {
            return Err(HybridError::TransformError {
                basis: basis_id.to_string(),
                reason: format!(
                    "level {} exceeds maximum {} for {} samples",
                    levels,
                    max_level,
                    signal.len()
                ),
            });
        }

        let mut approx: Vec<f64> = signal.iter().map(|&v| v as f64).collect();
        let mut details = Vec::with_capacity(levels);
        for _ in 0..levels {
            let (a, d) = analysis_step(&approx, &bank);
            details.push(d.into_iter().map(|v| v as f32).collect());
            approx = a;
        }
        details.reverse();

        Ok(CoefficientSet {
            approximation: approx.into_iter().map(|v| v as f32).collect(),
            details,
        })
    }

    fn reconstruct(
        &self,
        coeffs: &CoefficientSet,
        basis_id: &str,
    ) -> Result<Vec<f32>, HybridError> {
        let bank = FilterBank::lookup(basis_id)?;
        let mut approx: Vec<f64> = coeffs.approximation.iter().map(|&v| v as f64).collect();

        for detail in &coeffs.details {
            if approx.len() == detail.len() + 1 {
                approx.pop();
            }
            if approx.len() != detail.len() {
                return Err(HybridError::TransformError {
                    basis: basis_id.to_string(),
                    reason: format!(
                        "approximation length {} does not match detail length {}",
                        approx.len(),
                        detail.len()
                    ),
                });
            }
            let detail: Vec<f64> = detail.iter().map(|&v| v as f64).collect();
            approx = synthesis_step(&approx, &detail, &bank);
        }

        Ok(approx.into_iter().map(|v| v as f32).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::filters::SUPPORTED_BASES;

    fn test_signal(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32 * 0.05;
                t.sin() + 0.3 * (3.1 * t).cos() + 0.01 * (i % 7) as f32
            })
            .collect()
    }

    fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
    }

    #[test]
    fn test_perfect_reconstruction_all_bases_even_length() {
        let dwt = PeriodicDwt::new();
        let signal = test_signal(1024);
        for basis in SUPPORTED_BASES {
            let coeffs = dwt.decompose(&signal, basis, 4).unwrap();
            let mut recon = dwt.reconstruct(&coeffs, basis).unwrap();
            recon.truncate(signal.len());
            let err = max_abs_diff(&recon, &signal);
            assert!(err < 1e-4, "{} reconstruction error {}", basis, err);
        }
    }

    #[test]
    fn test_perfect_reconstruction_odd_lengths() {
        let dwt = PeriodicDwt::new();
        for &n in &[625usize, 1001, 777] {
            let signal = test_signal(n);
            let coeffs = dwt.decompose(&signal, "db4", 3).unwrap();
            let recon = dwt.reconstruct(&coeffs, "db4").unwrap();
            assert!(recon.len() >= n && recon.len() <= n + 1);
            assert!(max_abs_diff(&recon[..n], &signal) < 1e-4, "n = {}", n);
        }
    }

    #[test]
    fn test_band_lengths_halve_per_level() {
        let dwt = PeriodicDwt::new();
        let coeffs = dwt.decompose(&test_signal(20_000), "db4", 5).unwrap();
        assert_eq!(coeffs.levels(), 5);
        assert_eq!(coeffs.approximation.len(), 625);
        // Coarsest detail first.
        let lens: Vec<usize> = coeffs.details.iter().map(|d| d.len()).collect();
        assert_eq!(lens, vec![625, 1250, 2500, 5000, 10_000]);
        assert_eq!(coeffs.total_coefficients(), 20_000);
    }

    #[test]
    fn test_constant_signal_has_zero_details() {
        let dwt = PeriodicDwt::new();
        let coeffs = dwt.decompose(&vec![3.0f32; 256], "sym4", 3).unwrap();
        for band in &coeffs.details {
            assert!(band.iter().all(|d| d.abs() < 1e-5));
        }
    }

    #[test]
    fn test_too_deep_and_empty_inputs_fail() {
        let dwt = PeriodicDwt::new();
        let short = test_signal(40);
        // db4 on 40 samples: floor(log2(40 / 7)) = 2
        assert_eq!(PeriodicDwt::max_level(40, 8), 2);
        assert!(dwt.decompose(&short, "db4", 2).is_ok());
        assert!(matches!(
            dwt.decompose(&short, "db4", 3),
            Err(HybridError::TransformError { .. })
        ));
        assert!(matches!(
            dwt.decompose(&[], "haar", 1),
            Err(HybridError::TransformError { .. })
        ));
        assert!(matches!(
            dwt.decompose(&short, "bior4.4", 1),
            Err(HybridError::UnsupportedBasis(_))
        ));
    }

    #[test]
    fn test_mismatched_coefficients_are_rejected() {
        let dwt = PeriodicDwt::new();
        let coeffs = CoefficientSet {
            approximation: vec![1.0; 10],
            details: vec![vec![0.0; 4]],
        };
        assert!(matches!(
            dwt.reconstruct(&coeffs, "haar"),
            Err(HybridError::TransformError { .. })
        ));
    }
}
