//! Image upload: type gate and asynchronous decode into a [`Bitmap`].

use crate::elements::{Bitmap, ImageFormat};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Upload errors. None of these reach the user; the engine logs and drops them.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Not an image: {0}")]
    NotAnImage(String),
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
}

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Boxed future for a pending decode. Owns its input, so it can move to a worker.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A file picked by the user, already read into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Declared MIME type, if the picker supplied one.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// Type gate checked before reading: an `image/*` MIME type or a known image extension.
    pub fn is_image(&self) -> bool {
        if let Some(mime) = &self.mime {
            return mime.trim().to_lowercase().starts_with("image/");
        }
        self.extension_format().is_some()
    }

    fn extension_format(&self) -> Option<ImageFormat> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
    }

    /// Best guess at the encoded format: content first, then declared type, then name.
    pub fn detect_format(&self) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(&self.bytes)
            .or_else(|| self.mime.as_deref().and_then(ImageFormat::from_mime))
            .or_else(|| self.extension_format())
    }
}

/// Decode `file` and wrap it as a shared bitmap at its natural size.
pub fn decode_bitmap(file: &UploadedFile) -> UploadResult<Arc<Bitmap>> {
    let format = file
        .detect_format()
        .ok_or_else(|| UploadError::NotAnImage(file.name.clone()))?;

    let decoded = image::load_from_memory_with_format(&file.bytes, format.decoder_format())
        .map_err(|e| UploadError::Decode {
            name: file.name.clone(),
            reason: e.to_string(),
        })?;

    Ok(Arc::new(Bitmap::from_encoded(
        &file.bytes,
        format,
        decoded.width(),
        decoded.height(),
    )))
}

/// Decode asynchronously. Nothing is touched until the future is driven.
pub fn decode_upload(file: UploadedFile) -> BoxFuture<'static, UploadResult<Arc<Bitmap>>> {
    Box::pin(async move { decode_bitmap(&file) })
}
