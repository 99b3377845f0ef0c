use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

use cosmicface_core::{AnalysisKind, PhotoAsset};

/// The photo could not be turned into request payload. Nothing was sent.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodingError {
    #[error("photo '{name}' is empty")]
    EmptyImage { name: String },
    #[error("{kind} needs {expected} photo(s), got {actual}")]
    AssetCountMismatch {
        kind: AnalysisKind,
        expected: usize,
        actual: usize,
    },
}

/// A photo as base64 (standard alphabet, no `data:` prefix) plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    pub data: String,
}

pub fn encode_asset(asset: &PhotoAsset) -> Result<EncodedImage, EncodingError> {
    if asset.bytes().is_empty() {
        return Err(EncodingError::EmptyImage {
            name: asset.name().to_string(),
        });
    }
    Ok(EncodedImage {
        mime_type: asset.mime_type(),
        data: STANDARD.encode(asset.bytes()),
    })
}

/// Encode every photo a request of `kind` carries, in slot order.
pub fn encode_assets(kind: AnalysisKind, assets: &[PhotoAsset]) -> Result<Vec<EncodedImage>, EncodingError> {
    let expected = kind.required_assets();
    if assets.len() != expected {
        return Err(EncodingError::AssetCountMismatch {
            kind,
            expected,
            actual: assets.len(),
        });
    }
    assets.iter().map(encode_asset).collect()
}
