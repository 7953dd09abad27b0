// In: src/config.rs

//! The single source of truth for all RP² hybrid compression configuration.
//!
//! `HybridConfig` is created once at the application boundary (e.g., from a
//! user's JSON file) and passed by reference down to the selector and codecs.
//! Every field has a serde default, so a partial document such as
//! `{"levels": 4}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::HybridError;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// Defines the trade-off between compression speed and final artifact size.
///
/// The profile only selects the Zstandard level used for every block and for
/// the outer pass. The family search itself is always exhaustive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompressionProfile {
    /// Prioritizes speed over size.
    Fast,

    /// A balance between speed and size.
    Balanced,

    /// **Default:** Prioritizes the smallest possible artifact at the cost of CPU
    /// time (Zstandard level 19).
    #[default]
    HighCompression,
}

impl CompressionProfile {
    /// The Zstandard level associated with this profile.
    pub fn zstd_level(&self) -> i32 {
        match self {
            CompressionProfile::Fast => 1,
            CompressionProfile::Balanced => 3,
            CompressionProfile::HighCompression => 19,
        }
    }
}

//==================================================================================
// II. The Unified HybridConfig
//==================================================================================

/// The unified configuration for a hybrid compression call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct HybridConfig {
    /// The profile guiding the backend compression level.
    #[serde(default)]
    pub profile: CompressionProfile,

    /// Candidate wavelet bases, tried in order. Ties are won by the earlier entry.
    #[serde(default = "default_candidate_bases")]
    pub candidate_bases: Vec<String>,

    /// Number of wavelet decomposition levels.
    #[serde(default = "default_levels")]
    pub levels: usize,

    /// Multiplier applied to the MAD noise estimate when soft-thresholding details.
    #[serde(default = "default_threshold_factor")]
    pub threshold_factor: f32,

    /// If true, candidate bases are evaluated concurrently with rayon.
    /// The winner is identical to the sequential search.
    #[serde(default)]
    pub parallel_search: bool,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            profile: CompressionProfile::default(),
            candidate_bases: default_candidate_bases(),
            levels: default_levels(),
            threshold_factor: default_threshold_factor(),
            parallel_search: false,
        }
    }
}

impl HybridConfig {
    /// Parses a configuration from a JSON document, filling omitted fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self, HybridError> {
        let config: HybridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style override of the candidate list.
    pub fn with_candidates<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_bases = bases.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style override of the compression profile.
    pub fn with_profile(mut self, profile: CompressionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// The Zstandard level used for every block and for the outer pass.
    pub fn zstd_level(&self) -> i32 {
        self.profile.zstd_level()
    }

    /// Rejects configurations the selector cannot act on.
    pub fn validate(&self) -> Result<(), HybridError> {
        if self.candidate_bases.is_empty() {
            return Err(HybridError::InvalidConfig(
                "candidate_bases must contain at least one basis".to_string(),
            ));
        }
        if self.levels == 0 || self.levels > u16::MAX as usize {
            return Err(HybridError::InvalidConfig(format!(
                "levels must be in 1..={}, got {}",
                u16::MAX,
                self.levels
            )));
        }
        if !self.threshold_factor.is_finite() || self.threshold_factor < 0.0 {
            return Err(HybridError::InvalidConfig(format!(
                "threshold_factor must be a finite, non-negative number, got {}",
                self.threshold_factor
            )));
        }
        Ok(())
    }
}

/// Provides the default candidate list for serde.
fn default_candidate_bases() -> Vec<String> {
    ["db4", "sym4", "coif1", "db3"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Provides the default decomposition depth for serde.
fn default_levels() -> usize {
    5
}

/// Provides the default soft-threshold multiplier for serde.
fn default_threshold_factor() -> f32 {
    2.0
}
