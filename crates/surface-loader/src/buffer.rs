//! Little-endian binary buffers of 32-bit elements.

use crate::error::{LoadError, LoadResult};
use surface_common::BufferElement;

/// Reinterpret `bytes` as a sequence of little-endian elements.
///
/// `url` is only used for the error message.
pub fn decode_le<T: BufferElement>(bytes: &[u8], url: &str) -> LoadResult<Vec<T>> {
    if bytes.len() % T::SIZE != 0 {
        return Err(LoadError::TruncatedBuffer {
            url: url.to_string(),
            len: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(T::SIZE)
        .map(|c| T::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_floats() {
        let bytes: Vec<u8> = [1.5f32, -2.0, f32::NAN]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let values: Vec<f32> = decode_le(&bytes, "mem").unwrap();
        assert_eq!(&values[..2], &[1.5, -2.0]);
        assert!(values[2].is_nan());
    }

    #[test]
    fn test_decode_indices() {
        let bytes = [1, 0, 0, 0, 0, 1, 0, 0];
        let values: Vec<u32> = decode_le(&bytes, "mem").unwrap();
        assert_eq!(values, vec![1, 256]);
    }

    #[test]
    fn test_decode_rejects_partial_element() {
        let err = decode_le::<f32>(&[0, 0, 0, 0, 0], "http://host/a.bin").unwrap_err();
        assert!(matches!(err, LoadError::TruncatedBuffer { len: 5, .. }));
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_le::<f32>(&[], "mem").unwrap().is_empty());
    }
}
