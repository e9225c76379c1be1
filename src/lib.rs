use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, filter, store, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{http, utils};

use errors::AppError;
use http::client::create_http_client;
use repositories::{
    blob::BlobStore,
    clients::{FirebaseBlobStore, FirebaseProfileRepo, LocalBlobStore, LocalProfileRepo},
    profile::ProfileRepository,
};
use settings::{AppConfig, RepositoryBackend};
use store::SharedProfileStore;
use use_cases::profiles::ProfileHandler;

pub struct AppState {
    pub profile_handler: AppProfileHandler,
}

pub type AppProfileHandler = ProfileHandler<dyn ProfileRepository, dyn BlobStore>;

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let (profile_repo, blob_store): (Arc<dyn ProfileRepository>, Arc<dyn BlobStore>) =
            match config.backend {
                RepositoryBackend::Firebase => {
                    let client = create_http_client(&config.name, config.request_timeout_secs)?;
                    let database_url = url::Url::parse(&config.firebase_database_url)
                        .map_err(|e| AppError::InternalError(format!("Invalid database URL: {}", e)))?;

                    (
                        Arc::new(FirebaseProfileRepo::new(
                            client.clone(),
                            database_url,
                            config.firebase_collection.clone(),
                            config.firebase_auth_token.clone(),
                        )),
                        Arc::new(FirebaseBlobStore::new(
                            client,
                            config.firebase_storage_bucket.clone(),
                            config.firebase_auth_token.clone(),
                        )),
                    )
                }
                RepositoryBackend::Local => {
                    let public_base_url = url::Url::parse(&config.public_base_url)
                        .map_err(|e| AppError::InternalError(format!("Invalid public base URL: {}", e)))?;

                    // Must exist before the upload directory is mounted for serving
                    std::fs::create_dir_all(&config.local_upload_dir)?;

                    (
                        Arc::new(LocalProfileRepo::new(config.local_data_path.clone())),
                        Arc::new(LocalBlobStore::new(config.local_upload_dir.clone(), public_base_url)),
                    )
                }
            };

        Ok(Self::with_backends(profile_repo, blob_store, config.max_image_bytes))
    }

    pub fn with_backends(
        profile_repo: Arc<dyn ProfileRepository>,
        blob_store: Arc<dyn BlobStore>,
        max_image_bytes: usize,
    ) -> Self {
        let profile_handler = ProfileHandler::new(
            profile_repo,
            blob_store,
            SharedProfileStore::default(),
            max_image_bytes,
        );

        AppState { profile_handler }
    }
}
