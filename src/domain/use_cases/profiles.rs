use std::sync::Arc;

use validator::Validate;

use crate::{
    entities::{
        image::ImageUpload,
        profile::{timestamp_now, Profile, ProfileInput, ProfileListResponse},
    },
    errors::AppError,
    filter::{filter_profiles, FacetOptions, FilterCriteria},
    repositories::{blob::BlobStore, profile::ProfileRepository},
    store::{SharedProfileStore, StoreCommand},
    utils::valid_id::valid_profile_id,
};

/// Runs profile commands against the repository and keeps the store in step.
///
/// The store is only patched after the repository call succeeded; on any
/// failure it is left exactly as it was.
pub struct ProfileHandler<R, B>
where
    R: ProfileRepository + ?Sized,
    B: BlobStore + ?Sized,
{
    pub profile_repo: Arc<R>,
    pub blob_store: Arc<B>,
    pub store: SharedProfileStore,
    pub max_image_bytes: usize,
}

impl<R, B> ProfileHandler<R, B>
where
    R: ProfileRepository + ?Sized,
    B: BlobStore + ?Sized,
{
    pub fn new(
        profile_repo: Arc<R>,
        blob_store: Arc<B>,
        store: SharedProfileStore,
        max_image_bytes: usize,
    ) -> Self {
        ProfileHandler {
            profile_repo,
            blob_store,
            store,
            max_image_bytes,
        }
    }

    /// Fetches every profile from the repository and replaces the store contents
    pub async fn load_profiles(&self) -> Result<usize, AppError> {
        let profiles = self.profile_repo.list_profiles().await.map_err(|e| {
            tracing::error!("Error loading profiles: {}", e);
            e
        })?;

        let count = profiles.len();
        self.store.dispatch(StoreCommand::SetAll(profiles))?;

        tracing::info!("Loaded {} profiles", count);
        Ok(count)
    }

    /// Profiles matching the criteria, in store order
    pub fn list_profiles(&self, criteria: &FilterCriteria) -> ProfileListResponse {
        let snapshot = self.store.snapshot();
        let profiles = filter_profiles(snapshot.profiles(), criteria);

        ProfileListResponse {
            total: snapshot.len(),
            matched: profiles.len(),
            profiles,
        }
    }

    /// Option lists for the filter controls
    pub fn facets(&self) -> FacetOptions {
        FacetOptions::from_profiles(self.store.snapshot().profiles())
    }

    pub fn get_profile(&self, id: &str) -> Result<Profile, AppError> {
        let id = valid_profile_id(id)?;
        self.store
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", id)))
    }

    /// Creates a profile, uploading its image first when one is attached
    pub async fn create_profile(
        &self,
        input: ProfileInput,
        image: Option<ImageUpload>,
    ) -> Result<Profile, AppError> {
        input.validate()?;

        let image_url = self.upload_if_present(image).await?;

        let mut document = input.normalize(image_url)?;
        document.created_at = Some(timestamp_now());

        let id = self.profile_repo.create_profile(&document).await.map_err(|e| {
            tracing::error!("Error adding profile: {}", e);
            e
        })?;

        let profile = Profile::new(id, document);
        self.store.dispatch(StoreCommand::Add(profile.clone()))?;

        tracing::info!(profile_id = %profile.id, "Profile created");
        Ok(profile)
    }

    /// Replaces every field of an existing profile
    pub async fn update_profile(
        &self,
        id: &str,
        input: ProfileInput,
        image: Option<ImageUpload>,
    ) -> Result<Profile, AppError> {
        let id = valid_profile_id(id)?;
        input.validate()?;

        let existing = self.store
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", id)))?;

        let image_url = self.upload_if_present(image).await?;

        let mut document = input.normalize(image_url)?;
        document.created_at = existing.document.created_at;
        document.updated_at = Some(timestamp_now());

        self.profile_repo.replace_profile(id, &document).await.map_err(|e| {
            tracing::error!(profile_id = %id, "Error updating profile: {}", e);
            e
        })?;

        let profile = Profile::new(id, document);
        match self.store.dispatch(StoreCommand::Update(profile.clone())) {
            // Deleted while the write was in flight; the write recreated it remotely.
            Err(AppError::NotFound(_)) => {
                tracing::warn!(profile_id = %id, "Profile was removed during update, restoring it");
                self.store.dispatch(StoreCommand::Add(profile.clone()))?;
            }
            other => other?,
        }

        tracing::info!(profile_id = %id, "Profile updated");
        Ok(profile)
    }

    /// Deletes a profile from the repository, then from the store
    pub async fn delete_profile(&self, id: &str) -> Result<(), AppError> {
        let id = valid_profile_id(id)?;

        self.profile_repo.delete_profile(id).await.map_err(|e| {
            tracing::error!(profile_id = %id, "Error deleting profile: {}", e);
            e
        })?;

        self.store.dispatch(StoreCommand::Remove(id.to_string()))?;

        tracing::info!(profile_id = %id, "Profile deleted");
        Ok(())
    }

    async fn upload_if_present(&self, image: Option<ImageUpload>) -> Result<Option<String>, AppError> {
        let Some(image) = image else {
            return Ok(None);
        };

        image.validate(self.max_image_bytes)?;

        let url = self.blob_store.upload_image(&image).await.map_err(|e| {
            tracing::error!("Error uploading image {}: {}", image.file_name, e);
            match e {
                AppError::UploadFailure(_) => e,
                other => AppError::UploadFailure(other.to_string()),
            }
        })?;

        Ok(Some(url))
    }
}
