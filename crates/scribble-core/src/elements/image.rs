//! Image element for placed raster images.

use super::{ElementId, ElementTrait, normalized_rect, rect_contains_inclusive};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Encoded format of a bitmap payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect format from a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            "image/gif" => Some(ImageFormat::Gif),
            "image/bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        if data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }
        None
    }

    /// Matching decoder format in the `image` crate.
    pub fn decoder_format(&self) -> ::image::ImageFormat {
        match self {
            ImageFormat::Png => ::image::ImageFormat::Png,
            ImageFormat::Jpeg => ::image::ImageFormat::Jpeg,
            ImageFormat::WebP => ::image::ImageFormat::WebP,
            ImageFormat::Gif => ::image::ImageFormat::Gif,
            ImageFormat::Bmp => ::image::ImageFormat::Bmp,
        }
    }
}

/// An immutable encoded bitmap with its natural pixel size.
///
/// Stored as base64 so the persisted record stays plain JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bitmap {
    pub format: ImageFormat,
    /// Natural width in pixels.
    pub pixel_width: u32,
    /// Natural height in pixels.
    pub pixel_height: u32,
    pub data_base64: String,
}

impl Bitmap {
    /// Wrap encoded bytes whose natural size is already known.
    pub fn from_encoded(data: &[u8], format: ImageFormat, pixel_width: u32, pixel_height: u32) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};

        Self {
            format,
            pixel_width,
            pixel_height,
            data_base64: STANDARD.encode(data),
        }
    }

    /// Get the raw encoded bytes (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.decode(&self.data_base64).ok()
    }
}

/// A placed image. The bitmap is shared between history snapshots; it is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub(crate) id: ElementId,
    /// Top-left corner position.
    pub origin: Point,
    /// Display width (signed, like a rectangle's).
    pub width: f64,
    /// Display height.
    pub height: f64,
    pub bitmap: Arc<Bitmap>,
}

impl Image {
    /// Place a bitmap at its natural size.
    pub fn new(origin: Point, bitmap: Arc<Bitmap>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            width: bitmap.pixel_width as f64,
            height: bitmap.pixel_height as f64,
            bitmap,
        }
    }

    /// Set the dragged corner; extents stay signed.
    pub fn set_corner(&mut self, corner: Point) {
        self.width = corner.x - self.origin.x;
        self.height = corner.y - self.origin.y;
    }

    /// Scale display width and height by `factor`, keeping the origin.
    pub fn scale(&mut self, factor: f64) {
        self.width *= factor;
        self.height *= factor;
    }

    /// Get the normalized bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        normalized_rect(self.origin, self.width, self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        rect_contains_inclusive(self.as_rect(), point)
    }
}

impl ElementTrait for Image {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn move_center_to(&mut self, point: Point) {
        self.origin = Point::new(point.x - self.width / 2.0, point.y - self.height / 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(w: u32, h: u32) -> Arc<Bitmap> {
        Arc::new(Bitmap::from_encoded(&[0u8; 10], ImageFormat::Png, w, h))
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("txt"), None);
        assert_eq!(ImageFormat::from_mime("image/webp"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_mime("text/plain"), None);
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"hello"), None);
    }

    #[test]
    fn test_natural_size() {
        let img = Image::new(Point::ZERO, bitmap(120, 80));
        assert!((img.width - 120.0).abs() < f64::EPSILON);
        assert!((img.height - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scale() {
        let mut img = Image::new(Point::new(10.0, 10.0), bitmap(100, 50));
        img.scale(1.1);
        assert!((img.width - 110.0).abs() < 1e-9);
        assert!((img.height - 55.0).abs() < 1e-9);
        assert_eq!(img.origin, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_bitmap_data_round_trip() {
        let raw = [1u8, 2, 3, 4, 5];
        let bmp = Bitmap::from_encoded(&raw, ImageFormat::Png, 1, 1);
        assert_eq!(bmp.data().as_deref(), Some(&raw[..]));
    }

    #[test]
    fn test_bounds() {
        let img = Image::new(Point::new(10.0, 20.0), bitmap(100, 50));
        let bounds = img.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }
}
