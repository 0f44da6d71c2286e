//! Where a numeric array comes from: inline values or a remote/local URL.

use serde::{Deserialize, Serialize};

/// A numeric type that can be read from a little-endian binary buffer.
pub trait BufferElement: Copy + Send + Sync + 'static {
    /// Element size in bytes.
    const SIZE: usize = 4;

    /// Decode one element from 4 little-endian bytes.
    fn from_le_bytes(bytes: [u8; 4]) -> Self;

    /// Raw bit pattern, used for identity comparison.
    fn to_bits(self) -> u32;
}

impl BufferElement for f32 {
    fn from_le_bytes(bytes: [u8; 4]) -> Self {
        f32::from_le_bytes(bytes)
    }

    fn to_bits(self) -> u32 {
        f32::to_bits(self)
    }
}

impl BufferElement for u32 {
    fn from_le_bytes(bytes: [u8; 4]) -> Self {
        u32::from_le_bytes(bytes)
    }

    fn to_bits(self) -> u32 {
        self
    }
}

/// Source of a numeric array.
///
/// Deserializes from either a JSON array of numbers or a URL string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource<T> {
    /// Values supplied directly.
    Inline(Vec<T>),
    /// URL (`http(s)://`, `file://`, or a plain path) to fetch.
    Remote(String),
}

/// Float array source (elevation, properties, vertex positions).
pub type FloatSource = DataSource<f32>;

/// Index array source (triangle indices).
pub type IndexSource = DataSource<u32>;

impl<T: BufferElement> DataSource<T> {
    /// Create a remote source.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Remote(url.into())
    }

    /// The URL if this source is remote.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Remote(url) => Some(url),
            Self::Inline(_) => None,
        }
    }

    /// Short description for log output.
    pub fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Inline(values) => format!("<inline {} values>", values.len()),
        }
    }

    /// True if both sources name the same data.
    ///
    /// Inline values compare bitwise so a NaN sample equals itself.
    pub fn same_source(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Remote(a), Self::Remote(b)) => a == b,
            (Self::Inline(a), Self::Inline(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b.iter())
                        .all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => false,
        }
    }
}

impl<T> From<Vec<T>> for DataSource<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Inline(values)
    }
}

impl<T> From<&str> for DataSource<T> {
    fn from(url: &str) -> Self {
        Self::Remote(url.to_string())
    }
}

/// Compare two optional sources with [`DataSource::same_source`].
pub fn same_optional_source<T: BufferElement>(
    a: Option<&DataSource<T>>,
    b: Option<&DataSource<T>>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_source(b),
        _ => false,
    }
}
