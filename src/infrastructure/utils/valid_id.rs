use crate::errors::AppError;

/// Characters the document store refuses in keys; `/` would also escape the collection path.
const FORBIDDEN_ID_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// Validates that a string can be used as a profile id in a repository path.
pub fn valid_profile_id(id: &str) -> Result<&str, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("Profile ID is required".to_string()));
    }
    if id.chars().any(|c| FORBIDDEN_ID_CHARS.contains(&c) || c.is_control()) {
        return Err(AppError::BadRequest("Invalid profile ID format".to_string()));
    }
    Ok(id)
}
