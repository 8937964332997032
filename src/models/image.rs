use std::path::Path;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Media types the hosted model accepts as inline image data.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Media type assumed when a data URI or file name does not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// Inline request payloads above 20 MB are rejected by the service.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("The selected image is empty")]
    Empty,

    #[error("Unsupported image type '{0}' — use a PNG, JPEG, WebP or HEIC photo")]
    UnsupportedMediaType(String),

    #[error("Image too large ({0} bytes) — maximum is 20 MB")]
    TooLarge(usize),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Could not read image file: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw image bytes plus their declared media type.
///
/// Opaque to the analysis client apart from size and type checks.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into().trim().to_ascii_lowercase(),
        }
    }

    /// Decode a `data:<type>;base64,<data>` preview URI.
    ///
    /// A bare base64 string (no `data:` prefix) is accepted as PNG.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let uri = uri.trim();
        let (media_type, data) = match uri.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| ImageError::InvalidDataUri("missing ',' separator".into()))?;
                let (media_type, encoding) = header.split_once(';').unwrap_or((header, ""));
                if encoding != "base64" {
                    return Err(ImageError::InvalidDataUri(
                        "only base64 data URIs are supported".into(),
                    ));
                }
                let media_type = if media_type.is_empty() {
                    DEFAULT_MEDIA_TYPE
                } else {
                    media_type
                };
                (media_type, data)
            }
            None => (DEFAULT_MEDIA_TYPE, uri),
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| ImageError::InvalidDataUri(e.to_string()))?;
        Ok(Self::new(bytes, media_type))
    }

    /// Encode as a data URI for previews.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }

    /// Standard base64 of the raw bytes, as sent inline to the model.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Read an image from disk, guessing the media type from its extension.
    pub fn from_file(path: &Path) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        let media_type = mime_guess::from_path(path)
            .first()
            .filter(|m| m.type_() == mime_guess::mime::IMAGE)
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());
        Ok(Self::new(bytes, media_type))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check the payload is something the model can be sent.
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if !SUPPORTED_MEDIA_TYPES.contains(&self.media_type.as_str()) {
            return Err(ImageError::UnsupportedMediaType(self.media_type.clone()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge(self.bytes.len()));
        }
        Ok(())
    }
}

/// Default report title for an uploaded file: the name up to its first dot.
pub fn title_from_file_name(file_name: &str) -> String {
    let name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    name.split('.').next().unwrap_or_default().trim().to_string()
}
