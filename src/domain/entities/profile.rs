use actix_multipart::form::{bytes::Bytes as MpBytes, json::Json as MpJson, MultipartForm};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::{constants::PLACEHOLDER_IMAGE_URL, errors::AppError};

// ───── Stored Models ────────────────────────────────────────────────

/// A profile as kept in the directory: the repository-assigned id plus its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(flatten)]
    pub document: ProfileDocument,
}

impl Profile {
    pub fn new(id: impl Into<String>, document: ProfileDocument) -> Self {
        Profile {
            id: id.into(),
            document,
        }
    }
}

/// The canonical stored shape of a profile, without its id.
///
/// Documents written by older clients may lack fields or carry `languages`
/// as something other than a list, so decoding is lenient: absent text
/// becomes empty, a non-list `languages` becomes an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default = "placeholder_image_url")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn placeholder_image_url() -> String {
    PLACEHOLDER_IMAGE_URL.to_string()
}

fn lenient_languages<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let languages = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(languages)
}

/// Current time in the format stored in `createdAt` / `updatedAt`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileListResponse {
    pub total: usize,
    pub matched: usize,
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub loaded: usize,
}

// ───── Input & Validation ───────────────────────────────────────────

/// Multipart submission: the profile fields as a JSON part plus an optional image file.
#[derive(Debug, MultipartForm)]
pub struct ProfileUpload {
    #[multipart(rename = "profile")]
    pub profile: MpJson<ProfileInput>,

    #[multipart(rename = "image")]
    pub image: Option<MpBytes>,
}

/// Languages as entered: either already a list or comma-separated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LanguagesInput {
    List(Vec<String>),
    Text(String),
}

impl LanguagesInput {
    pub fn into_list(self) -> Vec<String> {
        match self {
            LanguagesInput::List(items) => items
                .into_iter()
                .map(|lang| lang.trim().to_string())
                .filter(|lang| !lang.is_empty())
                .collect(),
            LanguagesInput::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|lang| !lang.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Raw profile fields as submitted on create or update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Email is required"))]
    pub email: String,

    pub description: Option<String>,
    pub languages: Option<LanguagesInput>,
    pub education: Option<String>,
    pub specialization: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub image_url: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn trimmed_or_empty(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

impl ProfileInput {
    /// Validates and converts the input into the canonical stored shape.
    ///
    /// `uploaded_image_url` wins over the submitted `imageUrl`; with neither,
    /// the placeholder image is used. Timestamps are left unset.
    pub fn normalize(self, uploaded_image_url: Option<String>) -> Result<ProfileDocument, AppError> {
        self.validate()?;

        let image_url = uploaded_image_url
            .or_else(|| self.image_url.filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(placeholder_image_url);

        Ok(ProfileDocument {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            description: trimmed_or_empty(self.description),
            languages: self.languages.map(LanguagesInput::into_list).unwrap_or_default(),
            education: trimmed_or_empty(self.education),
            specialization: trimmed_or_empty(self.specialization),
            twitter: trimmed_or_empty(self.twitter),
            instagram: trimmed_or_empty(self.instagram),
            image_url,
            created_at: None,
            updated_at: None,
        })
    }
}

impl From<&ProfileDocument> for ProfileInput {
    fn from(document: &ProfileDocument) -> Self {
        ProfileInput {
            name: document.name.clone(),
            email: document.email.clone(),
            description: Some(document.description.clone()),
            languages: Some(LanguagesInput::List(document.languages.clone())),
            education: Some(document.education.clone()),
            specialization: Some(document.specialization.clone()),
            twitter: Some(document.twitter.clone()),
            instagram: Some(document.instagram.clone()),
            image_url: Some(document.image_url.clone()),
        }
    }
}
