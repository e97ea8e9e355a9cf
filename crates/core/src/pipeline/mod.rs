pub mod enroll_faces_use_case;
pub mod recognize_image_use_case;

use std::path::Path;

use thiserror::Error;

use crate::shared::constants::UPLOAD_EXTENSIONS;

/// Rejection reasons for user-supplied image files, checked before any
/// provider traffic.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UploadError {
    #[error("unsupported file type: {0} (allowed: png, jpg, jpeg, gif)")]
    UnsupportedExtension(String),
    #[error("file has no extension: {0}")]
    MissingExtension(String),
}

/// Accepts only the image types the recognition provider understands.
pub fn validate_upload(path: &Path) -> Result<(), UploadError> {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return Err(UploadError::MissingExtension(path.display().to_string()));
    };
    if UPLOAD_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    {
        Ok(())
    } else {
        Err(UploadError::UnsupportedExtension(
            path.display().to_string(),
        ))
    }
}
