use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use actix_multipart::MultipartError;
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

use crate::constants::STORAGE_UNAUTHORIZED;

#[derive(Debug, Display)]
pub enum AppError {
    #[display("Missing required field: {}", join_fields(_0))]
    MissingRequiredField(Vec<FieldError>),

    #[display("Invalid image type: {_0}")]
    InvalidImageType(String),

    #[display("Image exceeds the maximum size of {_0} bytes")]
    ImageTooLarge(usize),

    #[display("Upload failed: {_0}")]
    UploadFailure(String),

    #[display("Repository failure: {_0}")]
    RepositoryFailure(String),

    #[display("Not found: {_0}")]
    NotFound(String),

    #[display("Conflict: {_0}")]
    Conflict(String),

    #[display("Bad request: {_0}")]
    BadRequest(String),

    #[display("Internal server error: {_0}")]
    InternalError(String),
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

fn join_fields(errors: &[FieldError]) -> String {
    errors.iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    pub fn missing_field(field: &str, message: &str) -> Self {
        AppError::MissingRequiredField(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }

    /// Short machine-readable code used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingRequiredField(_) => "missing_required_field",
            AppError::InvalidImageType(_) => "invalid_image_type",
            AppError::ImageTooLarge(_) => "image_too_large",
            AppError::UploadFailure(_) => "upload_failure",
            AppError::RepositoryFailure(_) => "repository_failure",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::BadRequest(_) => "bad_request",
            AppError::InternalError(_) => "internal_server_error",
        }
    }

    /// Message safe to show to the user. Remote failure details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::UploadFailure(msg) if msg == STORAGE_UNAUTHORIZED => {
                "Unauthorized access to storage. Please check your permissions.".to_string()
            }
            AppError::UploadFailure(_) => "Failed to upload image. Please try again.".to_string(),
            AppError::RepositoryFailure(_) => {
                "The profile store is unavailable. Please try again later.".to_string()
            }
            AppError::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::MissingRequiredField(errors) => {
                serde_json::json!({
                    "error": self.code(),
                    "message": "Name and email are required fields",
                    "details": errors
                })
            }
            _ => {
                serde_json::json!({
                    "error": self.code(),
                    "message": self.user_message()
                })
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingRequiredField(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidImageType(_) => StatusCode::BAD_REQUEST,
            AppError::ImageTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UploadFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::RepositoryFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Field is required".to_string()),
                })
            })
            .collect();

        // HashMap order is not stable
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::MissingRequiredField(field_errors)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::ContentTypeIncompatible => {
                AppError::BadRequest("Content type incompatible".to_string())
            }
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}
