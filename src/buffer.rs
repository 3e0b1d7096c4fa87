//! Raster sources and working pixel buffers.
//!
//! A [`RasterImage`] is the pristine decoded source for one editing session.
//! Each pipeline run derives a fresh [`PixelBuffer`] working copy from it, so
//! repeated slider changes never accumulate on top of earlier output.
//!
//! Both types hold row-major RGBA8 samples with no padding. Every transform
//! in this crate clamps channel math back into `[0, 255]` before writing.

use std::path::Path;

use image::RgbaImage;

use crate::error::{Error, Result};

/// An immutable decoded source image.
///
/// Construct one per editing session and keep it for the session's lifetime;
/// settings are always re-applied against this pristine copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    image: RgbaImage,
}

impl RasterImage {
    /// Decode a source image from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the file cannot be read or decoded.
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(Error::Decode)?.to_rgba8();
        Ok(Self { image })
    }

    /// Decode a source image from in-memory encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes are not a decodable image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(Error::Decode)?
            .to_rgba8();
        Ok(Self { image })
    }

    /// Build a source from raw RGBA samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `data.len() != width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        let actual = data.len();
        let image = RgbaImage::from_raw(width, height, data)
            .ok_or(Error::BufferSize { expected, actual })?;
        Ok(Self { image })
    }

    /// Wrap an already-decoded RGBA image.
    #[must_use]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The underlying RGBA samples, row-major, no padding.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Borrow the decoded image.
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Derive a fresh mutable working copy for one pipeline run.
    #[must_use]
    pub fn to_buffer(&self) -> PixelBuffer {
        PixelBuffer {
            image: self.image.clone(),
        }
    }
}

/// A mutable working copy of a [`RasterImage`]'s channel data.
///
/// Owned exclusively by one pipeline run; transforms mutate it in place and
/// it is discarded (or replaced) on the next run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Wrap a decoded RGBA image as a working buffer.
    #[must_use]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Build a buffer from raw RGBA samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `data.len() != width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        let actual = data.len();
        let image = RgbaImage::from_raw(width, height, data)
            .ok_or(Error::BufferSize { expected, actual })?;
        Ok(Self { image })
    }

    /// Buffer width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Buffer height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The RGBA samples, row-major, no padding.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Borrow the buffer as an image for read access.
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Borrow the buffer as an image for in-place transforms.
    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Copy the current samples into an independent read snapshot.
    ///
    /// Convolution passes read from a snapshot so that already-written
    /// neighbors never feed back into the same pass.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.image.as_raw().clone()
    }

    /// Unwrap into the underlying image, e.g. for encoding.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_accepts_matching_length() {
        let buf = PixelBuffer::from_raw(2, 2, vec![0u8; 16]).unwrap();
        assert_eq!(buf.width(), 2);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.as_raw().len(), 16);
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = RasterImage::from_raw(3, 3, vec![0u8; 12]).unwrap_err();
        match err {
            Error::BufferSize { expected, actual } => {
                assert_eq!(expected, 36);
                assert_eq!(actual, 12);
            }
            other => panic!("expected BufferSize, got {other:?}"),
        }
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let err = RasterImage::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn to_buffer_is_an_independent_copy() {
        let src = RasterImage::from_raw(1, 1, vec![10, 20, 30, 255]).unwrap();
        let mut buf = src.to_buffer();
        buf.as_image_mut().get_pixel_mut(0, 0)[0] = 99;
        assert_eq!(src.as_raw()[0], 10);
        assert_eq!(buf.as_raw()[0], 99);
    }

    #[test]
    fn snapshot_is_detached_from_writes() {
        let mut buf = PixelBuffer::from_raw(1, 1, vec![1, 2, 3, 4]).unwrap();
        let snap = buf.snapshot();
        buf.as_image_mut().get_pixel_mut(0, 0)[0] = 200;
        assert_eq!(snap[0], 1);
    }
}
