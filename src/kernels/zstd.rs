//! This module contains the pure, stateless kernels for performing
//! Zstandard compression and decompression.
//!
//! This is the byte compressor backend for every RP² stream and for the outer
//! artifact pass. Frames are plain Zstandard frames with no extra header, so a
//! `Direct` RP² block is exactly `compress(raw float32 bytes)`.
//! This module is a safe, panic-free wrapper around the `zstd` crate.

use std::io::Write;
use zstd::stream::{Decoder, Encoder};

use crate::error::HybridError;

//==================================================================================
// 1. Core Logic (The "Engine")
//==================================================================================

/// Compresses a byte slice using the Zstandard algorithm, writing to an output buffer.
fn compress_slice(
    input_bytes: &[u8],
    output_buf: &mut Vec<u8>,
    level: i32,
) -> Result<(), HybridError> {
    // We use the streaming Encoder, which writes directly to the output buffer.
    let mut encoder =
        Encoder::new(output_buf, level).map_err(|e| HybridError::BackendError(e.to_string()))?;
    encoder
        .write_all(input_bytes)
        .map_err(|e| HybridError::BackendError(e.to_string()))?;

    // `finish` is essential to finalize the Zstd frame.
    encoder
        .finish()
        .map_err(|e| HybridError::BackendError(e.to_string()))?;
    Ok(())
}

/// Decompresses a Zstandard-compressed byte slice, writing to an output buffer.
fn decompress_slice(input_bytes: &[u8], output_buf: &mut Vec<u8>) -> Result<(), HybridError> {
    let mut decoder =
        Decoder::new(input_bytes).map_err(|e| HybridError::BackendError(e.to_string()))?;

    // `std::io::copy` grows the output buffer as needed.
    std::io::copy(&mut decoder, output_buf)
        .map_err(|e| HybridError::BackendError(e.to_string()))?;
    Ok(())
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Compresses `input_bytes` into a single Zstandard frame.
///
/// Empty input still produces a valid (tiny) frame, so every stream written by
/// the codec can be decoded uniformly.
pub fn compress(input_bytes: &[u8], level: i32) -> Result<Vec<u8>, HybridError> {
    let mut output_buf = Vec::with_capacity(input_bytes.len() / 2 + 64);
    compress_slice(input_bytes, &mut output_buf, level)?;
    Ok(output_buf)
}

/// Decompresses one Zstandard frame produced by [`compress`].
pub fn decompress(input_bytes: &[u8]) -> Result<Vec<u8>, HybridError> {
    if input_bytes.is_empty() {
        return Err(HybridError::BackendError(
            "Cannot decompress an empty buffer: no Zstd frame present.".to_string(),
        ));
    }
    let mut output_buf = Vec::with_capacity(input_bytes.len() * 4);
    decompress_slice(input_bytes, &mut output_buf)?;
    Ok(output_buf)
}

/// Size of the plain backend compression of `values` as raw `f32` bytes.
/// This is the baseline every hybrid artifact is measured against.
pub fn baseline_size(values: &[f32], level: i32) -> Result<usize, HybridError> {
    Ok(compress(bytemuck::cast_slice(values), level)?.len())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zstd_roundtrip_simple_text() {
        let original_bytes =
            b"hello world, this is a test of zstd compression. hello world, this is a test."
                .to_vec();

        let compressed_bytes = compress(&original_bytes, 3).unwrap();
        assert!(compressed_bytes.len() < original_bytes.len());

        let decompressed_bytes = decompress(&compressed_bytes).unwrap();
        assert_eq!(original_bytes, decompressed_bytes);
    }

    #[test]
    fn test_zstd_roundtrip_highly_compressible_data() {
        let original_bytes = vec![42u8; 10_000];

        let compressed_bytes = compress(&original_bytes, 19).unwrap();
        assert!(compressed_bytes.len() < 50);

        let decompressed_bytes = decompress(&compressed_bytes).unwrap();
        assert_eq!(original_bytes, decompressed_bytes);
    }

    #[test]
    fn test_zstd_empty_input_roundtrips() {
        let compressed = compress(&[], 3).unwrap();
        assert!(!compressed.is_empty());
        assert!(decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_zstd_decompress_invalid_data() {
        let invalid_bytes = vec![1, 2, 3, 4, 5];
        let result = decompress(&invalid_bytes);
        assert!(matches!(result, Err(HybridError::BackendError(_))));

        assert!(matches!(
            decompress(&[]),
            Err(HybridError::BackendError(_))
        ));
    }

    #[test]
    fn test_baseline_size_matches_manual_compression() {
        let values: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.01).sin()).collect();
        let manual = compress(bytemuck::cast_slice(&values), 3).unwrap().len();
        assert_eq!(baseline_size(&values, 3).unwrap(), manual);
    }
}
