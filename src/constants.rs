use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Shown for profiles that never had an image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300x200?text=No+Image";

pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const IMAGE_OBJECT_PREFIX: &str = "profile_images";

/// Mount point of the local upload directory.
pub const UPLOADS_PATH: &str = "/uploads";

/// Smallest request body accepted for profile submissions.
pub const MIN_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

pub const STORAGE_UNAUTHORIZED: &str = "Unauthorized access to storage";
