use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::Deserialize;
use tokio::fs;
use url::Url;
use zeroize::Zeroizing;

use crate::{
    constants::STORAGE_UNAUTHORIZED,
    entities::image::ImageUpload,
    errors::AppError,
    repositories::clients::{FirebaseBlobStore, LocalBlobStore, FIREBASE_STORAGE_API},
};

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the image and returns a URL it can be fetched from
    async fn upload_image(&self, image: &ImageUpload) -> Result<String, AppError>;
}

// ───── Firebase Storage ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageObject {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl FirebaseBlobStore {
    pub fn new(client: Client, bucket: impl Into<String>, auth_token: Option<String>) -> Self {
        FirebaseBlobStore {
            client,
            api_base: FIREBASE_STORAGE_API.to_string(),
            bucket: bucket.into(),
            auth_token: auth_token.filter(|t| !t.is_empty()).map(Zeroizing::new),
        }
    }

    /// Points the store at another Storage REST root, such as an emulator.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn download_url(&self, object_name: &str, token: &str) -> String {
        format!(
            "{}/{}/o/{}?alt=media&token={}",
            self.api_base,
            self.bucket,
            urlencoding::encode(object_name),
            token
        )
    }
}

#[async_trait]
impl BlobStore for FirebaseBlobStore {
    async fn upload_image(&self, image: &ImageUpload) -> Result<String, AppError> {
        let object_name = image.object_name();

        let mut url = Url::parse(&format!("{}/{}/o", self.api_base, self.bucket))
            .map_err(|e| AppError::UploadFailure(format!("Invalid storage bucket: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", &object_name);

        let mut request = self.client
            .post(url)
            .header(CONTENT_TYPE, image.detected_content_type())
            .body(image.bytes.clone());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::UploadFailure(format!("Failed to upload image: {}", e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::UploadFailure(STORAGE_UNAUTHORIZED.to_string()));
            }
            status if !status.is_success() => {
                return Err(AppError::UploadFailure(format!("Storage responded with {}", status)));
            }
            _ => {}
        }

        let uploaded: StorageObject = response
            .json()
            .await
            .map_err(|e| AppError::UploadFailure(format!("Failed to read upload result: {}", e)))?;

        let token = uploaded
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::UploadFailure("Failed to get image URL".to_string()))?;

        Ok(self.download_url(&uploaded.name, token))
    }
}

// ───── Local directory ──────────────────────────────────────────────

impl LocalBlobStore {
    pub fn new(upload_dir: impl Into<PathBuf>, mut public_base_url: Url) -> Self {
        if !public_base_url.path().ends_with('/') {
            let path = format!("{}/", public_base_url.path());
            public_base_url.set_path(&path);
        }

        LocalBlobStore {
            upload_dir: upload_dir.into(),
            public_base_url,
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload_image(&self, image: &ImageUpload) -> Result<String, AppError> {
        let object_name = image.object_name();
        let target = self.upload_dir.join(&object_name);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::UploadFailure(format!("Failed to create upload directory: {}", e)))?;
        }

        fs::write(&target, &image.bytes)
            .await
            .map_err(|e| AppError::UploadFailure(format!("Failed to write image: {}", e)))?;

        self.public_base_url
            .join(&object_name)
            .map(|url| url.to_string())
            .map_err(|e| AppError::UploadFailure(format!("Failed to build image URL: {}", e)))
    }
}
