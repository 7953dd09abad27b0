//! The RP² codec: symmetric two-stream delta coding of a single sequence.
//!
//! A sequence is coded either as a `Direct` block (the raw `f32` bytes run
//! through the backend) or, when the estimator sees enough anti-symmetry, as a
//! `Symmetric` block: the first half plus the residual against the negated,
//! reversed second half, each compressed independently.
//!
//! Symmetric payload layout:
//! ```text
//! [4 bytes LE u32: header_len]
//! [header_len bytes: JSON header {mid, orig_len, left_c_len}]
//! [left_c_len bytes: compressed(left_padded f32 bytes)]
//! [remaining bytes: compressed(delta f32 bytes)]
//! ```
//! Direct payloads carry no header at all, so the variant must travel out of
//! band (the hybrid artifact's flag) or via the one-byte tagged form.

use serde::{Deserialize, Serialize};

use super::estimator::{estimate, SymmetryGain};
use crate::config::HybridConfig;
use crate::error::HybridError;
use crate::kernels::zstd;
use crate::utils::{bytes_to_f32_vec, typed_slice_to_bytes};

//==================================================================================
// Format Constants
//==================================================================================
const LEN_PREFIX_SIZE: usize = 4;
/// Mode tag of a standalone `Direct` block.
pub const TAG_DIRECT: u8 = 0;
/// Mode tag of a standalone `Symmetric` block.
pub const TAG_SYMMETRIC: u8 = 1;

//==================================================================================
// Public Structs
//==================================================================================

/// The framing record at the head of a symmetric payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
struct BlockHeader {
    mid: usize,
    orig_len: usize,
    left_c_len: usize,
}

/// One RP²-coded sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rp2Block {
    /// `compressed(raw f32 bytes)`, not self-describing.
    Direct { bytes: Vec<u8> },
    /// Half-split delta coding. `left_bytes` and `delta_bytes` are independently
    /// compressed streams of equal decoded length.
    Symmetric {
        mid: usize,
        orig_len: usize,
        left_bytes: Vec<u8>,
        delta_bytes: Vec<u8>,
    },
}

impl Rp2Block {
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Rp2Block::Symmetric { .. })
    }

    /// The split point of a symmetric block.
    pub fn seam(&self) -> Option<usize> {
        match self {
            Rp2Block::Symmetric { mid, .. } => Some(*mid),
            Rp2Block::Direct { .. } => None,
        }
    }

    /// Serializes the block into its wire payload (no mode tag).
    pub fn payload(&self) -> Result<Vec<u8>, HybridError> {
        match self {
            Rp2Block::Direct { bytes } => Ok(bytes.clone()),
            Rp2Block::Symmetric {
                mid,
                orig_len,
                left_bytes,
                delta_bytes,
            } => {
                let header = BlockHeader {
                    mid: *mid,
                    orig_len: *orig_len,
                    left_c_len: left_bytes.len(),
                };
                let header_bytes = serde_json::to_vec(&header)?;
                let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
                    HybridError::InternalError("RP² header exceeds u32 length".to_string())
                })?;

                let mut out = Vec::with_capacity(
                    LEN_PREFIX_SIZE + header_bytes.len() + left_bytes.len() + delta_bytes.len(),
                );
                out.extend_from_slice(&header_len.to_le_bytes());
                out.extend_from_slice(&header_bytes);
                out.extend_from_slice(left_bytes);
                out.extend_from_slice(delta_bytes);
                Ok(out)
            }
        }
    }

    /// Parses a wire payload whose variant is known out of band.
    pub fn from_payload(bytes: &[u8], symmetric: bool) -> Result<Self, HybridError> {
        if !symmetric {
            return Ok(Rp2Block::Direct {
                bytes: bytes.to_vec(),
            });
        }

        if bytes.len() < LEN_PREFIX_SIZE {
            return Err(HybridError::FormatError(format!(
                "RP² block too short for its length prefix: {} bytes",
                bytes.len()
            )));
        }
        let mut prefix = [0u8; LEN_PREFIX_SIZE];
        prefix.copy_from_slice(&bytes[..LEN_PREFIX_SIZE]);
        let header_len = u32::from_le_bytes(prefix) as usize;

        let header_end = LEN_PREFIX_SIZE.saturating_add(header_len);
        if header_end > bytes.len() {
            return Err(HybridError::FormatError(format!(
                "RP² header length {} exceeds block size {}",
                header_len,
                bytes.len()
            )));
        }

        let header: BlockHeader = serde_json::from_slice(&bytes[LEN_PREFIX_SIZE..header_end])
            .map_err(|e| HybridError::FormatError(format!("Unreadable RP² header: {}", e)))?;

        let remaining = bytes.len() - header_end;
        if header.left_c_len > remaining {
            return Err(HybridError::FormatError(format!(
                "RP² left stream length {} exceeds remaining {} bytes",
                header.left_c_len, remaining
            )));
        }
        if header.mid > header.orig_len {
            return Err(HybridError::FormatError(format!(
                "RP² seam {} lies beyond the original length {}",
                header.mid, header.orig_len
            )));
        }

        let left_end = header_end + header.left_c_len;
        Ok(Rp2Block::Symmetric {
            mid: header.mid,
            orig_len: header.orig_len,
            left_bytes: bytes[header_end..left_end].to_vec(),
            delta_bytes: bytes[left_end..].to_vec(),
        })
    }

    /// Serializes the block with a leading one-byte mode tag, making it self-describing.
    pub fn to_tagged_bytes(&self) -> Result<Vec<u8>, HybridError> {
        let tag = if self.is_symmetric() {
            TAG_SYMMETRIC
        } else {
            TAG_DIRECT
        };
        let payload = self.payload()?;
        let mut out = Vec::with_capacity(1 + payload.len());
        out.push(tag);
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Inverse of [`Rp2Block::to_tagged_bytes`].
    pub fn from_tagged_bytes(bytes: &[u8]) -> Result<Self, HybridError> {
        match bytes.split_first() {
            Some((&TAG_DIRECT, payload)) => Self::from_payload(payload, false),
            Some((&TAG_SYMMETRIC, payload)) => Self::from_payload(payload, true),
            Some((tag, _)) => Err(HybridError::FormatError(format!(
                "Unknown RP² mode tag: {}",
                tag
            ))),
            None => Err(HybridError::FormatError(
                "Empty buffer cannot hold an RP² block".to_string(),
            )),
        }
    }
}

//==================================================================================
// Core Implementation
//==================================================================================

/// Encodes and decodes sequences as RP² blocks at a fixed backend level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rp2Codec {
    level: i32,
}

impl Default for Rp2Codec {
    fn default() -> Self {
        Self::from_config(&HybridConfig::default())
    }
}

impl Rp2Codec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn from_config(config: &HybridConfig) -> Self {
        Self::new(config.zstd_level())
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Encodes `seq`, returning the block and whether symmetric coding was applied.
    pub fn encode(&self, seq: &[f32]) -> Result<(Rp2Block, bool), HybridError> {
        let gain = estimate(seq);
        if !gain.is_worthwhile() {
            log::debug!(
                "RP² direct: n={} gain={:.1} (insufficient symmetry)",
                seq.len(),
                gain.value()
            );
            let bytes = zstd::compress(&typed_slice_to_bytes(seq), self.level)?;
            return Ok((Rp2Block::Direct { bytes }, false));
        }

        let block = self.encode_symmetric(seq, gain)?;
        Ok((block, true))
    }

    fn encode_symmetric(&self, seq: &[f32], gain: SymmetryGain) -> Result<Rp2Block, HybridError> {
        let n = seq.len();
        let mid = n / 2;
        let left = &seq[..mid];
        let flipped: Vec<f32> = seq[mid..].iter().rev().map(|&v| -v).collect();

        let max_len = left.len().max(flipped.len());
        let mut left_padded = left.to_vec();
        left_padded.resize(max_len, 0.0);
        let mut flipped_padded = flipped;
        flipped_padded.resize(max_len, 0.0);

        let delta: Vec<f32> = left_padded
            .iter()
            .zip(&flipped_padded)
            .map(|(&l, &f)| l - f)
            .collect();

        let left_bytes = zstd::compress(&typed_slice_to_bytes(&left_padded), self.level)?;
        let delta_bytes = zstd::compress(&typed_slice_to_bytes(&delta), self.level)?;

        log::debug!(
            "RP² symmetric: n={} mid={} gain={:.1} left={}B delta={}B",
            n,
            mid,
            gain.value(),
            left_bytes.len(),
            delta_bytes.len()
        );

        Ok(Rp2Block::Symmetric {
            mid,
            orig_len: n,
            left_bytes,
            delta_bytes,
        })
    }

    /// Decodes a block back into its sequence.
    pub fn decode(block: &Rp2Block) -> Result<Vec<f32>, HybridError> {
        match block {
            Rp2Block::Direct { bytes } => decompress_f32(bytes),
            Rp2Block::Symmetric {
                mid,
                orig_len,
                left_bytes,
                delta_bytes,
            } => {
                let left_padded = decompress_f32(left_bytes)?;
                let delta = decompress_f32(delta_bytes)?;
                if left_padded.len() != delta.len() {
                    return Err(HybridError::FormatError(format!(
                        "RP² stream lengths disagree: left={} delta={}",
                        left_padded.len(),
                        delta.len()
                    )));
                }

                let right_len = orig_len.checked_sub(*mid).ok_or_else(|| {
                    HybridError::FormatError(format!(
                        "RP² seam {} lies beyond the original length {}",
                        mid, orig_len
                    ))
                })?;
                if *mid > left_padded.len() || right_len > left_padded.len() {
                    return Err(HybridError::FormatError(format!(
                        "RP² header (mid={}, orig_len={}) does not fit {} decoded samples",
                        mid,
                        orig_len,
                        left_padded.len()
                    )));
                }

                let mut out = Vec::with_capacity(*orig_len);
                out.extend_from_slice(&left_padded[..*mid]);
                // flipped = left - delta; right = -reverse(flipped), cut to its true length.
                out.extend(
                    left_padded
                        .iter()
                        .zip(&delta)
                        .rev()
                        .take(right_len)
                        .map(|(&l, &d)| -(l - d)),
                );
                Ok(out)
            }
        }
    }

    /// Decodes a payload whose variant is carried out of band.
    pub fn decode_payload(bytes: &[u8], symmetric: bool) -> Result<Vec<f32>, HybridError> {
        Self::decode(&Rp2Block::from_payload(bytes, symmetric)?)
    }
}

fn decompress_f32(bytes: &[u8]) -> Result<Vec<f32>, HybridError> {
    let raw = zstd::decompress(bytes)?;
    bytes_to_f32_vec(&raw).map_err(|e| HybridError::FormatError(e.to_string()))
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn mirrored(half: &[f32]) -> Vec<f32> {
        let mut seq = half.to_vec();
        seq.extend(half.iter().rev().map(|&v| -v));
        seq
    }

    fn odd_sine(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let x = -std::f64::consts::PI + 2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64;
                (5.0 * x).sin() as f32
            })
            .collect()
    }

    fn assert_close(a: &[f32], b: &[f32], tol: f32) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() <= tol, "mismatch at {}: {} vs {}", i, x, y);
        }
    }

    #[test]
    fn test_direct_roundtrip_short_sequence() {
        let codec = Rp2Codec::new(3);
        let seq: Vec<f32> = (0..100).map(|i| (i as f32 * 0.37).cos()).collect();

        let (block, applied) = codec.encode(&seq).unwrap();
        assert!(!applied);
        assert!(!block.is_symmetric());
        assert_eq!(block.seam(), None);
        assert_eq!(Rp2Codec::decode(&block).unwrap(), seq);
    }

    #[test]
    fn test_direct_roundtrip_noise() {
        let codec = Rp2Codec::new(3);
        let mut rng = StdRng::seed_from_u64(5);
        let seq: Vec<f32> = (0..2048).map(|_| rng.random_range(-10.0f32..10.0)).collect();

        let (block, applied) = codec.encode(&seq).unwrap();
        assert!(!applied);
        assert_eq!(Rp2Codec::decode(&block).unwrap(), seq);
    }

    #[test]
    fn test_symmetric_roundtrip_exact_mirror() {
        let codec = Rp2Codec::new(3);
        let mut rng = StdRng::seed_from_u64(42);
        let half: Vec<f32> = (0..300).map(|_| rng.random_range(-1.0f32..1.0)).collect();
        let seq = mirrored(&half);

        let (block, applied) = codec.encode(&seq).unwrap();
        assert!(applied);
        assert_eq!(block.seam(), Some(300));
        // delta is identically zero, so reconstruction is bit-exact.
        assert_eq!(Rp2Codec::decode(&block).unwrap(), seq);
    }

    #[test]
    fn test_symmetric_roundtrip_odd_length() {
        let codec = Rp2Codec::new(3);
        let seq = odd_sine(20_001);

        let (block, applied) = codec.encode(&seq).unwrap();
        assert!(applied);
        assert_eq!(block.seam(), Some(10_000));
        let decoded = Rp2Codec::decode(&block).unwrap();
        assert_close(&decoded, &seq, 1e-6);
    }

    #[test]
    fn test_sine_scenario_selects_symmetric_and_shrinks() {
        let codec = Rp2Codec::new(19);
        let seq = odd_sine(20_000);

        let (block, applied) = codec.encode(&seq).unwrap();
        assert!(applied);

        let payload = block.payload().unwrap();
        let baseline = zstd::baseline_size(&seq, 19).unwrap();
        assert!(payload.len() < baseline);
        assert_close(&Rp2Codec::decode_payload(&payload, true).unwrap(), &seq, 1e-6);
    }

    #[test]
    fn test_payload_layout_is_length_prefixed() {
        let codec = Rp2Codec::new(3);
        let seq = mirrored(&vec![0.5f32; 256]);
        let (block, _) = codec.encode(&seq).unwrap();
        let payload = block.payload().unwrap();

        let header_len = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
        let header: serde_json::Value =
            serde_json::from_slice(&payload[4..4 + header_len]).unwrap();
        assert_eq!(header["mid"], 256);
        assert_eq!(header["orig_len"], 512);

        let reparsed = Rp2Block::from_payload(&payload, true).unwrap();
        assert_eq!(reparsed, block);
    }

    #[test]
    fn test_tagged_bytes_roundtrip_both_modes() {
        let codec = Rp2Codec::new(3);
        let direct_seq: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let symmetric_seq = odd_sine(4096);

        for seq in [direct_seq, symmetric_seq] {
            let (block, applied) = codec.encode(&seq).unwrap();
            let tagged = block.to_tagged_bytes().unwrap();
            assert_eq!(tagged[0], if applied { TAG_SYMMETRIC } else { TAG_DIRECT });
            let parsed = Rp2Block::from_tagged_bytes(&tagged).unwrap();
            assert_eq!(parsed, block);
        }

        assert!(matches!(
            Rp2Block::from_tagged_bytes(&[]),
            Err(HybridError::FormatError(_))
        ));
        assert!(matches!(
            Rp2Block::from_tagged_bytes(&[9, 1, 2]),
            Err(HybridError::FormatError(_))
        ));
    }

    #[test]
    fn test_malformed_symmetric_payloads_are_format_errors() {
        let codec = Rp2Codec::new(3);
        let (block, _) = codec.encode(&odd_sine(2048)).unwrap();
        let payload = block.payload().unwrap();

        // Too short for the prefix.
        assert!(matches!(
            Rp2Block::from_payload(&payload[..3], true),
            Err(HybridError::FormatError(_))
        ));

        // Prefix claims more header than the buffer holds.
        let mut huge_prefix = payload.clone();
        huge_prefix[..4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            Rp2Block::from_payload(&huge_prefix, true),
            Err(HybridError::FormatError(_))
        ));

        // Garbage header.
        let mut garbage = payload.clone();
        garbage[4] = b'#';
        assert!(matches!(
            Rp2Block::from_payload(&garbage, true),
            Err(HybridError::FormatError(_))
        ));

        // left_c_len larger than what follows the header.
        let header = BlockHeader {
            mid: 1024,
            orig_len: 2048,
            left_c_len: 1_000_000,
        };
        let header_bytes = serde_json::to_vec(&header).unwrap();
        let mut forged = (header_bytes.len() as u32).to_le_bytes().to_vec();
        forged.extend_from_slice(&header_bytes);
        forged.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            Rp2Block::from_payload(&forged, true),
            Err(HybridError::FormatError(_))
        ));
    }

    #[test]
    fn test_inconsistent_header_is_rejected_on_decode() {
        let codec = Rp2Codec::new(3);
        let (block, _) = codec.encode(&odd_sine(2048)).unwrap();
        let forged = match block {
            Rp2Block::Symmetric {
                left_bytes,
                delta_bytes,
                ..
            } => Rp2Block::Symmetric {
                mid: 1024,
                orig_len: 9999,
                left_bytes,
                delta_bytes,
            },
            Rp2Block::Direct { .. } => panic!("expected a symmetric block"),
        };
        assert!(matches!(
            Rp2Codec::decode(&forged),
            Err(HybridError::FormatError(_))
        ));
    }

    #[test]
    fn test_corrupt_backend_stream_is_backend_error() {
        let block = Rp2Block::Direct {
            bytes: vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00],
        };
        assert!(matches!(
            Rp2Codec::decode(&block),
            Err(HybridError::BackendError(_))
        ));
    }
}
