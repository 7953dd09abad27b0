//! Defines the self-describing container for one hybrid-compressed signal.
//! This module is the single source of truth for serialization, deserialization,
//! and efficient metadata peeking of the artifact.
//!
//! Layout before the outer compression pass (little endian):
//! ```text
//! [4]  magic "RP2H"
//! [2]  format version (u16)
//! [8]  orig_len (u64)
//! [2]  levels (u16)
//! [1]  flags (bit 0 = approx_is_symmetric)
//! [4]  header_len (u32)
//! [header_len] basis_id (u16 len + UTF-8), approx len (u64),
//!              detail count (u16), detail lens (u64 each)
//! [..] approx payload, then detail payloads in order
//! ```

use std::io::{Cursor, Read, Write};

use crate::bridge::format::{ARTIFACT_MAGIC, FLAG_APPROX_SYMMETRIC, FORMAT_VERSION, KNOWN_FLAGS};
use crate::error::HybridError;
use crate::kernels::zstd;
use crate::rp2::Rp2Codec;
use crate::traits::WaveletTransform;
use crate::transform::CoefficientSet;
use crate::utils::{bytes_to_f32_vec, F32_WIDTH};

//==================================================================================
// Format Constants
//==================================================================================
/// The minimum possible size of a valid artifact in bytes.
const MIN_ARTIFACT_SIZE: usize = 21; // magic(4) + ver(2) + orig_len(8) + levels(2) + flags(1) + header_len(4)
/// A reasonable limit to prevent OOM attacks from malformed basis id lengths.
const MAX_BASIS_ID_LEN: usize = 256;

//==================================================================================
// Public Structs
//==================================================================================

/// Metadata extracted from an artifact's header without touching its payloads.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ArtifactHeaderInfo {
    pub format_version: u16,
    pub orig_len: u64,
    pub levels: u16,
    pub approx_is_symmetric: bool,
    pub basis_id: String,
    /// Byte length of the approximation payload.
    pub approx_size: usize,
    /// Byte length of each detail payload, coarsest first.
    pub detail_sizes: Vec<usize>,
    /// The calculated size of the entire header section in bytes.
    pub header_size: usize,
    pub data_size: usize,
}

/// A fully packed hybrid-compressed signal in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridArtifact {
    /// RP² payload of the approximation coefficients.
    pub approx_payload: Vec<u8>,
    /// Whether `approx_payload` is a symmetric block (otherwise a direct block).
    pub approx_is_symmetric: bool,
    /// Thresholded detail coefficients as raw `f32` bytes, coarsest first.
    pub detail_buffers: Vec<Vec<u8>>,
    pub orig_len: u64,
    pub basis_id: String,
    pub levels: u16,
}

//==================================================================================
// Core Implementation
//==================================================================================

impl HybridArtifact {
    /// Serializes the artifact into its canonical byte layout (no outer pass).
    pub fn to_bytes(&self) -> Result<Vec<u8>, HybridError> {
        if usize::from(self.levels) != self.detail_buffers.len() {
            return Err(HybridError::InternalError(format!(
                "levels ({}) does not match detail buffer count ({})",
                self.levels,
                self.detail_buffers.len()
            )));
        }
        let detail_count = u16::try_from(self.detail_buffers.len()).map_err(|_| {
            HybridError::FormatError("Too many detail buffers for one artifact".to_string())
        })?;

        let mut header_buf = Vec::new();
        write_prefixed_string(&mut header_buf, &self.basis_id)?;
        write_u64(&mut header_buf, self.approx_payload.len() as u64)?;
        header_buf.write_all(&detail_count.to_le_bytes())?;
        for buffer in &self.detail_buffers {
            write_u64(&mut header_buf, buffer.len() as u64)?;
        }
        let header_len = u32::try_from(header_buf.len()).map_err(|_| {
            HybridError::FormatError("Artifact header exceeds u32 length".to_string())
        })?;

        let flags = if self.approx_is_symmetric {
            FLAG_APPROX_SYMMETRIC
        } else {
            0
        };

        let data_size = self.approx_payload.len()
            + self.detail_buffers.iter().map(Vec::len).sum::<usize>();
        let mut final_buf = Vec::with_capacity(MIN_ARTIFACT_SIZE + header_buf.len() + data_size);

        // Fixed-size header.
        final_buf.extend_from_slice(ARTIFACT_MAGIC);
        final_buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        final_buf.extend_from_slice(&self.orig_len.to_le_bytes());
        final_buf.extend_from_slice(&self.levels.to_le_bytes());
        final_buf.push(flags);
        final_buf.extend_from_slice(&header_len.to_le_bytes());
        final_buf.extend_from_slice(&header_buf);

        // Payloads in header order.
        final_buf.extend_from_slice(&self.approx_payload);
        for buffer in &self.detail_buffers {
            final_buf.extend_from_slice(buffer);
        }

        Ok(final_buf)
    }

    /// Deserializes a full (outer-pass-free) byte slice into an artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HybridError> {
        let info = Self::peek_info(bytes)?;

        let expected_len = info.header_size + info.data_size;
        if expected_len != bytes.len() {
            return Err(HybridError::FormatError(format!(
                "Artifact has {} trailing bytes after its declared payloads",
                bytes.len() - expected_len
            )));
        }

        let mut offset = info.header_size;
        let approx_payload = bytes[offset..offset + info.approx_size].to_vec();
        offset += info.approx_size;

        let mut detail_buffers = Vec::with_capacity(info.detail_sizes.len());
        for len in &info.detail_sizes {
            detail_buffers.push(bytes[offset..offset + len].to_vec());
            offset += len;
        }

        Ok(Self {
            approx_payload,
            approx_is_symmetric: info.approx_is_symmetric,
            detail_buffers,
            orig_len: info.orig_len,
            basis_id: info.basis_id,
            levels: info.levels,
        })
    }

    /// Peeks into a serialized artifact's header to extract metadata without
    /// reading the payloads.
    pub fn peek_info(bytes: &[u8]) -> Result<ArtifactHeaderInfo, HybridError> {
        if bytes.len() < MIN_ARTIFACT_SIZE {
            return Err(HybridError::FormatError(format!(
                "Artifact is too small to be valid. Minimum size: {}, got: {}",
                MIN_ARTIFACT_SIZE,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);

        let mut magic_buf = [0u8; 4];
        cursor.read_exact(&mut magic_buf).map_err(map_io)?;
        if magic_buf != *ARTIFACT_MAGIC {
            return Err(HybridError::FormatError(
                "Invalid artifact magic number".into(),
            ));
        }

        let version = read_u16(&mut cursor)?;
        if version != FORMAT_VERSION {
            return Err(HybridError::FormatError(format!(
                "Unsupported artifact version: expected {}, got {}",
                FORMAT_VERSION, version
            )));
        }

        let orig_len = read_u64(&mut cursor)?;
        let levels = read_u16(&mut cursor)?;

        let mut flag_buf = [0u8; 1];
        cursor.read_exact(&mut flag_buf).map_err(map_io)?;
        let flags = flag_buf[0];
        if flags & !KNOWN_FLAGS != 0 {
            return Err(HybridError::FormatError(format!(
                "Unknown artifact flag bits: {:#010b}",
                flags
            )));
        }

        let header_metadata_len = read_u32(&mut cursor)? as usize;
        let header_start = cursor.position() as usize;
        let total_header_size = header_start.saturating_add(header_metadata_len);
        if bytes.len() < total_header_size {
            return Err(HybridError::FormatError(
                "Header length exceeds buffer size".into(),
            ));
        }

        let mut header_cursor = Cursor::new(&bytes[header_start..total_header_size]);
        let basis_id = read_prefixed_string(&mut header_cursor)?;
        let approx_size = read_len(&mut header_cursor)?;

        let detail_count = read_u16(&mut header_cursor)?;
        if detail_count != levels {
            return Err(HybridError::FormatError(format!(
                "Detail count {} does not match levels {}",
                detail_count, levels
            )));
        }

        let mut detail_sizes = Vec::with_capacity(detail_count as usize);
        let mut data_size = approx_size;
        for index in 0..detail_count {
            let len = read_len(&mut header_cursor)?;
            if len % F32_WIDTH != 0 {
                return Err(HybridError::FormatError(format!(
                    "Detail buffer {} has {} bytes, not a whole number of f32 values",
                    index, len
                )));
            }
            data_size = data_size.saturating_add(len);
            detail_sizes.push(len);
        }

        if header_cursor.position() as usize != header_metadata_len {
            return Err(HybridError::FormatError(
                "Declared header length does not match its contents".into(),
            ));
        }

        if total_header_size.saturating_add(data_size) > bytes.len() {
            return Err(HybridError::FormatError(
                "Sum of declared header and data sizes exceeds buffer length.".into(),
            ));
        }

        Ok(ArtifactHeaderInfo {
            format_version: version,
            orig_len,
            levels,
            approx_is_symmetric: flags & FLAG_APPROX_SYMMETRIC != 0,
            basis_id,
            approx_size,
            detail_sizes,
            header_size: total_header_size,
            data_size,
        })
    }

    /// Packs the artifact and applies the outer compression pass.
    pub fn serialize(&self, level: i32) -> Result<Vec<u8>, HybridError> {
        zstd::compress(&self.to_bytes()?, level)
    }

    /// Inverts the outer compression pass and parses the artifact.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, HybridError> {
        Self::from_bytes(&zstd::decompress(bytes)?)
    }

    /// Rebuilds the (lossy) signal: decodes the approximation, reinterprets the
    /// details and runs the inverse transform, truncating to `orig_len`.
    pub fn reconstruct(&self, transform: &dyn WaveletTransform) -> Result<Vec<f32>, HybridError> {
        let orig_len = usize::try_from(self.orig_len).map_err(|_| {
            HybridError::FormatError(format!(
                "Original length {} does not fit in memory",
                self.orig_len
            ))
        })?;

        let approximation = Rp2Codec::decode_payload(&self.approx_payload, self.approx_is_symmetric)?;
        let details = self
            .detail_buffers
            .iter()
            .map(|buffer| {
                bytes_to_f32_vec(buffer).map_err(|e| HybridError::FormatError(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let coeffs = CoefficientSet::new(approximation, details);
        let mut signal = transform.reconstruct(&coeffs, &self.basis_id)?;
        if signal.len() < orig_len {
            return Err(HybridError::FormatError(format!(
                "Inverse transform produced {} samples, artifact declares {}",
                signal.len(),
                orig_len
            )));
        }
        signal.truncate(orig_len);
        Ok(signal)
    }
}

//==================================================================================
// Private Helpers
//==================================================================================

fn map_io(e: std::io::Error) -> HybridError {
    HybridError::FormatError(e.to_string())
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, HybridError> {
    let mut buf = [0u8; 2];
    cursor.read_exact(&mut buf).map_err(map_io)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, HybridError> {
    let mut buf = [0u8; 4];
    cursor.read_exact(&mut buf).map_err(map_io)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(cursor: &mut Cursor<&[u8]>) -> Result<u64, HybridError> {
    let mut buf = [0u8; 8];
    cursor.read_exact(&mut buf).map_err(map_io)?;
    Ok(u64::from_le_bytes(buf))
}

/// Reads a u64 payload length and checks it is addressable.
fn read_len(cursor: &mut Cursor<&[u8]>) -> Result<usize, HybridError> {
    let len = read_u64(cursor)?;
    usize::try_from(len)
        .map_err(|_| HybridError::FormatError(format!("Payload length {} is not addressable", len)))
}

fn read_prefixed_string(cursor: &mut Cursor<&[u8]>) -> Result<String, HybridError> {
    let len = read_u16(cursor)? as usize;

    // SECURITY: Validate length against a sane maximum before allocating.
    if len > MAX_BASIS_ID_LEN {
        return Err(HybridError::FormatError(format!(
            "Basis id length ({}) exceeds maximum allowed size ({})",
            len, MAX_BASIS_ID_LEN
        )));
    }

    let mut str_buf = vec![0; len];
    cursor.read_exact(&mut str_buf).map_err(map_io)?;
    String::from_utf8(str_buf).map_err(|e| HybridError::FormatError(e.to_string()))
}

fn write_prefixed_string<W: Write>(writer: &mut W, s: &str) -> Result<(), HybridError> {
    let len = s.len();
    if len > MAX_BASIS_ID_LEN {
        return Err(HybridError::FormatError(format!(
            "Basis id length ({}) exceeds maximum allowed size ({})",
            len, MAX_BASIS_ID_LEN
        )));
    }
    writer.write_all(&(len as u16).to_le_bytes())?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<(), HybridError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::PeriodicDwt;
    use crate::utils::typed_slice_to_bytes;

    fn create_test_artifact() -> HybridArtifact {
        HybridArtifact {
            approx_payload: vec![7; 33],
            approx_is_symmetric: true,
            detail_buffers: vec![vec![1; 16], vec![2; 32]],
            orig_len: 64,
            basis_id: "db4".to_string(),
            levels: 2,
        }
    }

    #[test]
    fn test_artifact_roundtrip_is_successful() {
        let original = create_test_artifact();
        let bytes = original.to_bytes().unwrap();
        assert_eq!(HybridArtifact::from_bytes(&bytes).unwrap(), original);

        let stored = original.serialize(3).unwrap();
        assert_eq!(HybridArtifact::deserialize(&stored).unwrap(), original);
    }

    #[test]
    fn test_fixed_header_layout() {
        let bytes = create_test_artifact().to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"RP2H");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 1);
        assert_eq!(u64::from_le_bytes(bytes[6..14].try_into().unwrap()), 64);
        assert_eq!(u16::from_le_bytes([bytes[14], bytes[15]]), 2);
        assert_eq!(bytes[16], FLAG_APPROX_SYMMETRIC);
    }

    #[test]
    fn test_peek_info_is_correct() {
        let original = create_test_artifact();
        let bytes = original.to_bytes().unwrap();
        let info = HybridArtifact::peek_info(&bytes).unwrap();

        assert_eq!(info.format_version, FORMAT_VERSION);
        assert_eq!(info.orig_len, 64);
        assert_eq!(info.levels, 2);
        assert!(info.approx_is_symmetric);
        assert_eq!(info.basis_id, "db4");
        assert_eq!(info.approx_size, 33);
        assert_eq!(info.detail_sizes, vec![16, 32]);
        assert_eq!(info.data_size, 81);
        assert_eq!(info.header_size + info.data_size, bytes.len());
    }

    #[test]
    fn test_peek_ignores_missing_payloads_but_from_bytes_does_not() {
        let bytes = create_test_artifact().to_bytes().unwrap();
        let info = HybridArtifact::peek_info(&bytes).unwrap();
        let truncated = &bytes[..info.header_size + 10];
        assert!(matches!(
            HybridArtifact::peek_info(truncated),
            Err(HybridError::FormatError(_))
        ));
        assert!(matches!(
            HybridArtifact::from_bytes(truncated),
            Err(HybridError::FormatError(_))
        ));
    }

    #[test]
    fn test_malformed_inputs_are_rejected() {
        let good = create_test_artifact().to_bytes().unwrap();

        // Too short.
        assert!(matches!(
            HybridArtifact::from_bytes(&good[..10]),
            Err(HybridError::FormatError(_))
        ));

        // Bad magic.
        let mut bad_magic = good.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            HybridArtifact::from_bytes(&bad_magic),
            Err(HybridError::FormatError(_))
        ));

        // Unknown version.
        let mut bad_version = good.clone();
        bad_version[4] = 9;
        assert!(matches!(
            HybridArtifact::from_bytes(&bad_version),
            Err(HybridError::FormatError(_))
        ));

        // Unknown flag bits.
        let mut bad_flags = good.clone();
        bad_flags[16] = 0b1000_0001;
        assert!(matches!(
            HybridArtifact::from_bytes(&bad_flags),
            Err(HybridError::FormatError(_))
        ));

        // Header length pointing past the end.
        let mut bad_header = good.clone();
        bad_header[17..21].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            HybridArtifact::from_bytes(&bad_header),
            Err(HybridError::FormatError(_))
        ));

        // Trailing garbage.
        let mut trailing = good.clone();
        trailing.push(0);
        assert!(matches!(
            HybridArtifact::from_bytes(&trailing),
            Err(HybridError::FormatError(_))
        ));

        // Levels disagreeing with the detail count.
        let mut bad_levels = good;
        bad_levels[14] = 3;
        assert!(matches!(
            HybridArtifact::from_bytes(&bad_levels),
            Err(HybridError::FormatError(_))
        ));
    }

    #[test]
    fn test_detail_buffer_must_hold_whole_floats() {
        let mut artifact = create_test_artifact();
        artifact.detail_buffers[1] = vec![0; 30];
        let bytes = artifact.to_bytes().unwrap();
        assert!(matches!(
            HybridArtifact::from_bytes(&bytes),
            Err(HybridError::FormatError(_))
        ));
    }

    #[test]
    fn test_levels_must_match_buffers_when_writing() {
        let mut artifact = create_test_artifact();
        artifact.levels = 5;
        assert!(matches!(
            artifact.to_bytes(),
            Err(HybridError::InternalError(_))
        ));
    }

    #[test]
    fn test_outer_pass_rejects_garbage() {
        assert!(matches!(
            HybridArtifact::deserialize(b"definitely not zstd"),
            Err(HybridError::BackendError(_))
        ));
    }

    #[test]
    fn test_reconstruct_inverts_an_unthresholded_decomposition() {
        let dwt = PeriodicDwt::new();
        let signal: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.01).sin()).collect();
        let coeffs = dwt.decompose(&signal, "haar", 3).unwrap();

        let (block, symmetric) = Rp2Codec::new(3).encode(&coeffs.approximation).unwrap();
        let artifact = HybridArtifact {
            approx_payload: block.payload().unwrap(),
            approx_is_symmetric: symmetric,
            detail_buffers: coeffs.details.iter().map(|d| typed_slice_to_bytes(d)).collect(),
            orig_len: signal.len() as u64,
            basis_id: "haar".to_string(),
            levels: 3,
        };

        let restored = HybridArtifact::deserialize(&artifact.serialize(3).unwrap())
            .unwrap()
            .reconstruct(&dwt)
            .unwrap();
        assert_eq!(restored.len(), signal.len());
        for (a, b) in restored.iter().zip(&signal) {
            assert!((a - b).abs() < 1e-4);
        }
    }
}
