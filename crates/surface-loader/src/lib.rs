//! Raw data loading for surface meshes.
//!
//! Arrays arrive inline or behind a URL. Remote bodies are either raw
//! little-endian 32-bit buffers or PNG images whose decoded bytes are the
//! same buffer; the response content type picks the decode path.

pub mod buffer;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod png;

pub use buffer::decode_le;
pub use error::{LoadError, LoadResult, PngError};
pub use fetch::{
    classify_url, is_png_content_type, BlobFetcher, DefaultFetcher, FetchConfig, FetchedBlob,
    FileFetcher, HttpFetcher, UrlKind, BINARY_CONTENT_TYPE, PNG_CONTENT_TYPE,
};
pub use loader::{LoadedSurface, LoadedTriangles, SurfaceLoader};
pub use png::{
    decode_png, decode_png_with_limits, encode_float_png, encode_rgba_png, DecodeLimits,
    DecodedImage, MAX_DECODED_BYTES, MAX_IMAGE_DIMENSION,
};
