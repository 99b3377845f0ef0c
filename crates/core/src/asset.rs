//! Locally-created, revocable references to uploaded photos.
//!
//! A [`PhotoAsset`] owns the image bytes plus a `blob:` display URI that is
//! registered in an [`AssetRegistry`] for as long as any clone of the asset is
//! alive. Dropping the last clone revokes the URI, so replacing a wizard slot
//! or resetting a wizard releases the previous photo without explicit cleanup.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Prefix of every display URI handed out by the registry.
pub const DISPLAY_URI_PREFIX: &str = "blob:cosmicface/";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssetError {
    #[error("not an image: {name} ({detected})")]
    NotAnImage { name: String, detected: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Image container formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    /// Detect the format from the file's leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            "image/bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jfif" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// Set of display URIs that are currently live.
///
/// Cloning the registry shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    live: Arc<Mutex<HashSet<AssetId>>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new asset from in-memory bytes.
    ///
    /// `declared_mime` is what the picker reported for the file, if anything.
    /// A declared non-`image/*` type is rejected outright. The format comes
    /// from the magic bytes; when an image type was declared, the declared
    /// subtype and then the file extension may stand in for them. Without a
    /// declared type the bytes must be a recognizable image.
    pub fn create(
        &self,
        name: impl Into<String>,
        declared_mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<PhotoAsset, AssetError> {
        let name = name.into();

        if let Some(mime) = declared_mime {
            if !mime.trim().to_ascii_lowercase().starts_with("image/") {
                return Err(AssetError::NotAnImage {
                    name,
                    detected: mime.to_string(),
                });
            }
        }

        let sniffed = ImageFormat::sniff(&bytes);
        let format = match declared_mime {
            None => sniffed,
            Some(mime) => sniffed.or_else(|| ImageFormat::from_mime(mime)).or_else(|| {
                Path::new(&name)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(ImageFormat::from_extension)
            }),
        }
        .ok_or_else(|| AssetError::NotAnImage {
                name: name.clone(),
                detected: "unrecognized content".to_string(),
            })?;

        let id = AssetId::new();
        self.lock().insert(id);

        Ok(PhotoAsset {
            inner: Arc::new(AssetInner {
                id,
                display_uri: format!("{DISPLAY_URI_PREFIX}{id}"),
                name,
                format,
                bytes,
                _handle: SourceHandle {
                    id,
                    registry: self.clone(),
                },
            }),
        })
    }

    /// Read a photo from disk and register it.
    pub fn load(&self, path: &Path) -> Result<PhotoAsset, AssetError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.create(name, None, bytes)
    }

    pub fn is_live(&self, id: AssetId) -> bool {
        self.lock().contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<AssetId>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Registration guard; revokes the display URI when dropped.
struct SourceHandle {
    id: AssetId,
    registry: AssetRegistry,
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
    }
}

struct AssetInner {
    id: AssetId,
    name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
    display_uri: String,
    _handle: SourceHandle,
}

/// An uploaded photo. Clones share the same bytes and the same display URI.
#[derive(Clone)]
pub struct PhotoAsset {
    inner: Arc<AssetInner>,
}

impl PhotoAsset {
    pub fn id(&self) -> AssetId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn format(&self) -> ImageFormat {
        self.inner.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.inner.format.mime_type()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    pub fn display_uri(&self) -> &str {
        &self.inner.display_uri
    }
}

impl PartialEq for PhotoAsset {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for PhotoAsset {}

impl fmt::Debug for PhotoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoAsset")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("format", &self.inner.format)
            .field("len", &self.inner.bytes.len())
            .field("display_uri", &self.inner.display_uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(ImageFormat::sniff(&testing::png_bytes()), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&testing::jpeg_bytes()), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7"), None);
    }

    #[test]
    fn rejects_declared_non_image() {
        let registry = AssetRegistry::new();
        let err = registry
            .create("notes.txt", Some("text/plain"), b"hello".to_vec())
            .unwrap_err();
        assert!(matches!(err, AssetError::NotAnImage { .. }));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn rejects_unrecognized_content_without_hints() {
        let registry = AssetRegistry::new();
        let err = registry
            .create("blob", None, b"%PDF-1.7".to_vec())
            .unwrap_err();
        assert!(matches!(err, AssetError::NotAnImage { .. }));
    }

    #[test]
    fn declared_image_type_falls_back_to_extension() {
        let registry = AssetRegistry::new();
        let asset = registry
            .create("face.JPG", Some("image/*"), vec![1, 2, 3])
            .unwrap();
        assert_eq!(asset.format(), ImageFormat::Jpeg);
        assert_eq!(asset.mime_type(), "image/jpeg");
    }

    #[test]
    fn image_extension_alone_is_not_enough() {
        let registry = AssetRegistry::new();
        let err = registry
            .create("face.png", None, b"just some notes".to_vec())
            .unwrap_err();
        assert!(matches!(err, AssetError::NotAnImage { .. }));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn loading_a_renamed_text_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selfie.png");
        std::fs::write(&path, "not a picture").unwrap();

        let registry = AssetRegistry::new();
        let err = registry.load(&path).unwrap_err();
        assert!(matches!(err, AssetError::NotAnImage { .. }));
    }

    #[test]
    fn display_uri_is_revoked_when_last_clone_drops() {
        let registry = AssetRegistry::new();
        let asset = registry
            .create("me.png", Some("image/png"), testing::png_bytes())
            .unwrap();
        let id = asset.id();
        assert!(asset.display_uri().starts_with(DISPLAY_URI_PREFIX));
        assert!(registry.is_live(id));

        let clone = asset.clone();
        drop(asset);
        assert!(registry.is_live(id));

        drop(clone);
        assert!(!registry.is_live(id));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.png");
        std::fs::write(&path, testing::png_bytes()).unwrap();

        let registry = AssetRegistry::new();
        let asset = registry.load(&path).unwrap();
        assert_eq!(asset.name(), "portrait.png");
        assert_eq!(asset.format(), ImageFormat::Png);
        assert_eq!(asset.bytes(), testing::png_bytes().as_slice());
    }
}
