pub const ACCEPTED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// 8 MiB, matching the proxy's multipart cap.
pub const MAX_UPLOAD_BYTES: u64 = 8 * 1024 * 1024;

/// Reasons an image is refused before any request is sent.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please upload a JPEG or PNG image")]
    UnsupportedType(String),
    #[error("Image size must be less than 8MB")]
    TooLarge(u64),
    #[error("Please upload an image or disable image mode")]
    Missing,
}

pub fn validate_upload(mime_type: &str, size: u64) -> Result<(), UploadError> {
    if !ACCEPTED_IMAGE_TYPES.contains(&mime_type) {
        return Err(UploadError::UnsupportedType(mime_type.to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge(size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_jpeg_and_png_up_to_the_cap() {
        assert_eq!(validate_upload("image/jpeg", 1024), Ok(()));
        assert_eq!(validate_upload("image/png", MAX_UPLOAD_BYTES), Ok(()));
    }

    #[test]
    fn rejects_other_types_and_oversized_files() {
        assert_eq!(
            validate_upload("image/webp", 10),
            Err(UploadError::UnsupportedType("image/webp".into()))
        );
        assert_eq!(
            validate_upload("image/png", 8_388_609),
            Err(UploadError::TooLarge(8_388_609))
        );
        assert_eq!(
            UploadError::TooLarge(0).to_string(),
            "Image size must be less than 8MB"
        );
    }
}
