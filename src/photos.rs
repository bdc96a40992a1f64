//! Storage for uploaded photo content.
//!
//! The choreography never looks at pixels. Photo particles only carry a
//! [`PhotoHandle`], and the renderer resolves handles to image data through
//! the [`PhotoStore`] when it uploads textures. Removing a photo particle
//! releases its pixels here.
//!
//! # Supported Formats
//!
//! - PNG
//! - JPEG

use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;

use crate::error::PhotoError;

/// Opaque reference to a stored photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotoHandle(u32);

impl PhotoHandle {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Decoded RGBA photos keyed by handle.
#[derive(Debug, Default)]
pub struct PhotoStore {
    images: HashMap<PhotoHandle, RgbaImage>,
    next: u32,
}

impl PhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an encoded image (PNG or JPEG bytes) and store it.
    pub fn upload(&mut self, bytes: &[u8]) -> Result<PhotoHandle, PhotoError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        self.insert(image)
    }

    /// Load an image file from disk and store it.
    pub fn upload_file<P: AsRef<Path>>(&mut self, path: P) -> Result<PhotoHandle, PhotoError> {
        let bytes = std::fs::read(path)?;
        self.upload(&bytes)
    }

    /// Store already decoded pixels.
    pub fn insert(&mut self, image: RgbaImage) -> Result<PhotoHandle, PhotoError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PhotoError::Empty { width, height });
        }

        let handle = PhotoHandle(self.next);
        self.next += 1;
        self.images.insert(handle, image);
        log::debug!("stored photo {:?} ({}x{})", handle, width, height);
        Ok(handle)
    }

    pub fn get(&self, handle: PhotoHandle) -> Option<&RgbaImage> {
        self.images.get(&handle)
    }

    /// Drop the pixels behind `handle`.
    pub fn release(&mut self, handle: PhotoHandle) -> Result<RgbaImage, PhotoError> {
        self.images.remove(&handle).ok_or(PhotoError::UnknownHandle(handle))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_upload_and_release() {
        let mut store = PhotoStore::new();
        let handle = store.upload(&png_bytes(4, 3)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(handle).unwrap().dimensions(), (4, 3));

        let image = store.release(handle).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 30, 30, 255]));
        assert!(store.is_empty());
        assert!(matches!(store.release(handle), Err(PhotoError::UnknownHandle(_))));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let mut store = PhotoStore::new();
        let err = store.upload(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PhotoError::Decode(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut store = PhotoStore::new();
        let err = store.insert(RgbaImage::new(0, 5)).unwrap_err();
        assert!(matches!(err, PhotoError::Empty { width: 0, height: 5 }));
    }

    #[test]
    fn test_missing_file() {
        let mut store = PhotoStore::new();
        let err = store.upload_file("/nonexistent/photo.png").unwrap_err();
        assert!(matches!(err, PhotoError::Io(_)));
    }
}
