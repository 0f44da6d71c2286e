//! PNG used as a binary container for float32 arrays.
//!
//! The decoded sample bytes of the image are reinterpreted bit-for-bit as
//! little-endian float32 values. No color conversion takes place: 8-bit
//! samples are taken as they are and 16-bit samples keep the big-endian byte
//! order they have in the file. Palette images are expanded to RGB(A) by the
//! decoder. The encoder always writes 8-bit RGBA, one float per pixel.

use crate::error::PngError;
use image::error::ImageError;
use image::io::{Limits, Reader};
use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};

/// PNG file signature.
pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Largest accepted width or height.
pub const MAX_IMAGE_DIMENSION: u32 = 16_384;

/// Largest decoded buffer, in bytes.
pub const MAX_DECODED_BYTES: u64 = 512 * 1024 * 1024;

/// Bounds applied before any pixel buffer is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_dimension: u32,
    pub max_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_dimension: MAX_IMAGE_DIMENSION,
            max_bytes: MAX_DECODED_BYTES,
        }
    }
}

/// A decoded image: dimensions plus raw sample bytes, row-major.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub bytes_per_sample: u8,
    pub data: Vec<u8>,
}

/// Decode a PNG into its raw sample bytes using the default limits.
pub fn decode_png(bytes: &[u8]) -> Result<DecodedImage, PngError> {
    decode_png_with_limits(bytes, DecodeLimits::default())
}

/// Decode a PNG into its raw sample bytes.
pub fn decode_png_with_limits(
    bytes: &[u8],
    limits: DecodeLimits,
) -> Result<DecodedImage, PngError> {
    if !bytes.starts_with(&SIGNATURE) {
        return Err(PngError::InvalidSignature);
    }

    let mut image_limits = Limits::default();
    image_limits.max_image_width = Some(limits.max_dimension);
    image_limits.max_image_height = Some(limits.max_dimension);
    image_limits.max_alloc = Some(limits.max_bytes);

    let mut reader = Reader::with_format(Cursor::new(bytes), ImageFormat::Png);
    reader.limits(image_limits);
    let image = reader.decode().map_err(map_image_error)?;

    let color = image.color();
    let channels = color.channel_count();
    let bytes_per_sample = color.bytes_per_pixel() / channels;
    let (width, height) = (image.width(), image.height());

    Ok(DecodedImage {
        width,
        height,
        channels,
        bytes_per_sample,
        data: sample_bytes(image),
    })
}

/// Sample bytes in file order. The decoder stores 16-bit samples in native
/// order, so those are written back big-endian.
fn sample_bytes(image: DynamicImage) -> Vec<u8> {
    fn big_endian(samples: &[u16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_be_bytes()).collect()
    }

    match image {
        DynamicImage::ImageLuma16(img) => big_endian(img.as_raw()),
        DynamicImage::ImageLumaA16(img) => big_endian(img.as_raw()),
        DynamicImage::ImageRgb16(img) => big_endian(img.as_raw()),
        DynamicImage::ImageRgba16(img) => big_endian(img.as_raw()),
        other => other.into_bytes(),
    }
}

fn map_image_error(err: ImageError) -> PngError {
    match err {
        ImageError::Limits(e) => PngError::LimitsExceeded(e.to_string()),
        ImageError::Unsupported(e) => PngError::Unsupported(e.to_string()),
        other => PngError::Decode(other.to_string()),
    }
}

/// Encode float32 values as an 8-bit RGBA PNG, one value per pixel.
///
/// `values.len()` must be a non-zero multiple of `width`.
pub fn encode_float_png(values: &[f32], width: usize) -> Result<Vec<u8>, PngError> {
    if width == 0 || values.is_empty() || values.len() % width != 0 {
        return Err(PngError::Dimensions(format!(
            "{} values do not fill rows of width {}",
            values.len(),
            width
        )));
    }
    let height = values.len() / width;
    let pixels: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    encode_rgba_png(&pixels, width, height)
}

/// Encode RGBA pixels as a PNG.
pub fn encode_rgba_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    if width == 0 || height == 0 || pixels.len() != width * height * 4 {
        return Err(PngError::Dimensions(format!(
            "{} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);

    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(6); // color type (RGBA)
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    let idat_data = deflate_scanlines(pixels, width * 4, height)
        .map_err(|e| PngError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let crc_data = [chunk_type.as_slice(), data].concat();
    png.extend_from_slice(&crc32_checksum(&crc_data).to_be_bytes());
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(pixels: &[u8], stride: usize, height: usize) -> std::io::Result<Vec<u8>> {
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in pixels.chunks_exact(stride) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

/// CRC32 as used by PNG chunks.
fn crc32_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_header_fields() {
        let png = encode_float_png(&[1.0, 2.0], 2).unwrap();
        let image = decode_png(&png).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.channels, 4);
        assert_eq!(image.bytes_per_sample, 1);
        assert_eq!(image.data.len(), 8);
    }

    #[test]
    fn test_dimension_limit_applies() {
        let png = encode_float_png(&[0.0; 8], 4).unwrap();
        let limits = DecodeLimits {
            max_dimension: 2,
            ..DecodeLimits::default()
        };
        assert!(matches!(
            decode_png_with_limits(&png, limits),
            Err(PngError::LimitsExceeded(_))
        ));
    }

    #[test]
    fn test_chunk_crc_is_verified() {
        let mut png = encode_float_png(&[1.0, 2.0], 2).unwrap();
        // Corrupt one byte inside the IHDR data.
        png[SIGNATURE.len() + 8] ^= 0xff;
        assert!(matches!(decode_png(&png), Err(PngError::Decode(_))));
    }
}
