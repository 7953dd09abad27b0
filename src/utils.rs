//! This module provides a set of shared, low-level utility functions used
//! throughout the tambak-rp2 core.
//!
//! Its primary responsibility is safe, validated conversion between raw byte
//! buffers and `f32` sequences. All casting goes through `bytemuck`, so there
//! is no `unsafe` code in this crate.

use crate::error::HybridError;

/// Size of one serialized sample in bytes.
pub const F32_WIDTH: usize = std::mem::size_of::<f32>();

/// Converts a slice of `Pod` values into an owned `Vec<u8>` (native, little-endian layout).
pub fn typed_slice_to_bytes<T: bytemuck::Pod>(data: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(data).to_vec()
}

/// Copies a byte buffer into a freshly allocated `Vec<f32>`.
///
/// Unlike a zero-copy view this never fails on alignment, which matters for
/// payloads sliced out of the middle of an artifact.
///
/// # Errors
/// Returns `HybridError::BufferMismatch` if the length is not a multiple of 4.
pub fn bytes_to_f32_vec(bytes: &[u8]) -> Result<Vec<f32>, HybridError> {
    if bytes.len() % F32_WIDTH != 0 {
        return Err(HybridError::BufferMismatch(F32_WIDTH, bytes.len()));
    }
    let mut out = vec![0f32; bytes.len() / F32_WIDTH];
    bytemuck::cast_slice_mut::<f32, u8>(&mut out).copy_from_slice(bytes);
    Ok(out)
}
