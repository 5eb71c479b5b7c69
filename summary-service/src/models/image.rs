//! Validated image uploads.

use bytes::Bytes;
use service_core::error::AppError;
use thiserror::Error;

/// Extensions accepted on upload, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// MIME type used for an allowed extension that has no table entry.
const FALLBACK_MIME_TYPE: &str = "image/png";

const MIME_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Unsupported file type: allowed types are png, jpg, jpeg")]
    UnsupportedType,

    #[error("Empty file")]
    EmptyFile,
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

/// An uploaded image that passed validation.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: &'static str,
    pub data: Bytes,
}

impl ImageUpload {
    /// Validate the filename and content of a `file` form field.
    ///
    /// Only the extension decides whether the file is accepted; the bytes
    /// are not inspected beyond being non-empty.
    pub fn new(filename: &str, data: Bytes) -> Result<Self, UploadError> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(UploadError::EmptyFilename);
        }

        let extension = file_extension(filename).ok_or(UploadError::UnsupportedType)?;
        if !is_allowed_extension(&extension) {
            return Err(UploadError::UnsupportedType);
        }

        if data.is_empty() {
            return Err(UploadError::EmptyFile);
        }

        Ok(Self {
            filename: filename.to_string(),
            mime_type: mime_type_for(&extension),
            data,
        })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Lower-cased text after the last `.`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension)
}

pub fn mime_type_for(extension: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME_TYPE)
}
