//! Common test fixtures for surface tests.
//!
//! This module provides pre-defined frames and helpers for writing
//! binary float buffers to temporary files.

use std::io::Write;
use tempfile::NamedTempFile;

/// Common frame definitions for testing.
pub mod frames {
    use surface_common::Frame;

    /// 3x3 nodes at unit spacing from the origin.
    pub fn unit_3x3() -> Frame {
        Frame::new([0.0, 0.0], [1.0, 1.0], [3, 3])
    }

    /// 4x3 nodes: 12 node-centered or 6 cell-centered property values.
    pub fn unit_4x3() -> Frame {
        Frame::new([0.0, 0.0], [1.0, 1.0], [4, 3])
    }

    /// A georeferenced frame with non-square cells.
    pub fn utm_field(nx: usize, ny: usize) -> Frame {
        Frame::new([456_000.0, 5_930_000.0], [25.0, 50.0], [nx, ny])
    }

    /// A frame rotated 30 degrees around its origin.
    pub fn rotated_field(nx: usize, ny: usize) -> Frame {
        Frame::new([100.0, 200.0], [10.0, 10.0], [nx, ny]).with_rotation(30.0, None)
    }

    /// A single node.
    pub fn single_node() -> Frame {
        Frame::new([0.0, 0.0], [1.0, 1.0], [1, 1])
    }
}

/// Encode values as a little-endian float32 byte stream.
pub fn float_le_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Encode values as a little-endian uint32 byte stream.
pub fn u32_le_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Write raw bytes to a temporary file with the given extension.
///
/// The file is removed when the returned handle is dropped.
pub fn write_temp_file(bytes: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("surface-")
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(bytes).expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Write values as a binary little-endian float32 buffer file.
pub fn write_float_buffer(values: &[f32]) -> NamedTempFile {
    write_temp_file(&float_le_bytes(values), ".bin")
}

/// `file://` URL for a temporary file.
pub fn file_url(file: &NamedTempFile) -> String {
    format!("file://{}", file.path().display())
}
