use chrono::Utc;

use crate::{
    constants::{ALLOWED_IMAGE_TYPES, IMAGE_OBJECT_PREFIX},
    errors::AppError,
    utils::file_name::sanitize_file_name,
};

/// An image submitted along with a profile, before it reaches the blob store.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageUpload {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Checks size and type before anything is sent to the blob store.
    ///
    /// Both the declared content type and the type sniffed from the bytes
    /// must be on the allow-list.
    pub fn validate(&self, max_bytes: usize) -> Result<(), AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::BadRequest("Image file is empty".to_string()));
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::ImageTooLarge(max_bytes));
        }

        let declared = self.content_type.trim().to_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&declared.as_str()) {
            return Err(AppError::InvalidImageType(format!(
                "{} (allowed: {})",
                if declared.is_empty() { "unknown" } else { &declared },
                ALLOWED_IMAGE_TYPES.join(", ")
            )));
        }

        match infer::get(&self.bytes) {
            Some(kind) if ALLOWED_IMAGE_TYPES.contains(&kind.mime_type()) => Ok(()),
            Some(kind) => Err(AppError::InvalidImageType(format!(
                "content is {} but was declared as {}",
                kind.mime_type(),
                declared
            ))),
            None => Err(AppError::InvalidImageType(
                "content is not a recognizable image".to_string(),
            )),
        }
    }

    /// Content type to store the object under, taken from the bytes when possible.
    pub fn detected_content_type(&self) -> String {
        infer::get(&self.bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| self.content_type.trim().to_lowercase())
    }

    /// Blob object name: `profile_images/<unix millis>_<sanitized file name>`.
    pub fn object_name(&self) -> String {
        format!(
            "{}/{}_{}",
            IMAGE_OBJECT_PREFIX,
            Utc::now().timestamp_millis(),
            sanitize_file_name(&self.file_name)
        )
    }
}
