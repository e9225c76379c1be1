use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::{fs, sync::Mutex};
use url::Url;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::{
    entities::profile::{Profile, ProfileDocument},
    errors::AppError,
    repositories::clients::{FirebaseProfileRepo, LocalProfileRepo},
};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Cheap round trip used by the health check
    async fn check_connection(&self) -> Result<(), AppError>;

    /// Every stored profile, in the store's enumeration order
    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError>;

    /// Stores a new document and returns the id assigned to it
    async fn create_profile(&self, document: &ProfileDocument) -> Result<String, AppError>;

    /// Overwrites the full document stored under `id`
    async fn replace_profile(&self, id: &str, document: &ProfileDocument) -> Result<(), AppError>;

    async fn delete_profile(&self, id: &str) -> Result<(), AppError>;
}

fn repository_failure(action: &str, err: impl std::fmt::Display) -> AppError {
    AppError::RepositoryFailure(format!("Failed to {}: {}", action, err))
}

/// Decodes the collection value returned by the database into profiles.
///
/// The database answers `null` for an empty collection and may turn a map
/// with small integer keys into an array. Entries that are not objects are
/// skipped with a warning.
pub fn decode_collection(value: Value) -> Vec<Profile> {
    decode_counting_skips(value).0
}

/// Like [`decode_collection`], also returning how many non-null entries were skipped.
fn decode_counting_skips(value: Value) -> (Vec<Profile>, usize) {
    let entries: Vec<(String, Value)> = match value {
        Value::Null => Vec::new(),
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        other => {
            tracing::warn!("Unexpected profile collection shape: {}", other);
            return (Vec::new(), 1);
        }
    };

    let mut skipped = 0;
    let profiles = entries
        .into_iter()
        .filter_map(|(id, value)| {
            if value.is_null() {
                return None;
            }
            if !value.is_object() {
                tracing::warn!("Skipping profile {}: document is not an object", id);
                skipped += 1;
                return None;
            }
            match serde_json::from_value::<ProfileDocument>(value) {
                Ok(document) => Some(Profile::new(id, document)),
                Err(e) => {
                    tracing::warn!("Skipping profile {}: {}", id, e);
                    skipped += 1;
                    None
                }
            }
        })
        .collect();

    (profiles, skipped)
}

// ───── Firebase Realtime Database ───────────────────────────────────

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl FirebaseProfileRepo {
    pub fn new(
        client: Client,
        database_url: Url,
        collection: impl Into<String>,
        auth_token: Option<String>,
    ) -> Self {
        FirebaseProfileRepo {
            client,
            database_url,
            collection: collection.into(),
            auth_token: auth_token.filter(|t| !t.is_empty()).map(Zeroizing::new),
        }
    }

    /// `{db}/{collection}.json` or `{db}/{collection}/{id}.json`
    fn endpoint(&self, id: Option<&str>) -> Result<Url, AppError> {
        let mut url = self.database_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                AppError::InternalError("Firebase database URL cannot be a base URL".to_string())
            })?;
            segments.pop_if_empty();
            match id {
                None => {
                    segments.push(&format!("{}.json", self.collection));
                }
                Some(id) => {
                    segments.push(&self.collection);
                    segments.push(&format!("{}.json", id));
                }
            }
        }
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token.as_str());
        }
        Ok(url)
    }
}

#[async_trait]
impl ProfileRepository for FirebaseProfileRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        let mut url = self.endpoint(None)?;
        url.query_pairs_mut().append_pair("shallow", "true");

        self.client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map(|_| ())
            .map_err(|e| repository_failure("reach profile database", e))
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let url = self.endpoint(None)?;

        let body: Value = self.client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| repository_failure("fetch profiles", e))?
            .json()
            .await
            .map_err(|e| repository_failure("decode profiles", e))?;

        let profiles = decode_collection(body);
        tracing::debug!("Fetched {} profiles from Firebase", profiles.len());

        Ok(profiles)
    }

    async fn create_profile(&self, document: &ProfileDocument) -> Result<String, AppError> {
        let url = self.endpoint(None)?;

        let created: PushResponse = self.client
            .post(url)
            .json(document)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| repository_failure("create profile", e))?
            .json()
            .await
            .map_err(|e| repository_failure("read created profile id", e))?;

        if created.name.is_empty() {
            return Err(repository_failure("create profile", "no id was returned"));
        }

        Ok(created.name)
    }

    async fn replace_profile(&self, id: &str, document: &ProfileDocument) -> Result<(), AppError> {
        let url = self.endpoint(Some(id))?;

        let echoed: Value = self.client
            .put(url)
            .json(document)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| repository_failure("update profile", e))?
            .json()
            .await
            .map_err(|e| repository_failure("read updated profile", e))?;

        if echoed.is_null() {
            return Err(repository_failure("update profile", "empty response"));
        }

        Ok(())
    }

    async fn delete_profile(&self, id: &str) -> Result<(), AppError> {
        let url = self.endpoint(Some(id))?;

        self.client
            .delete(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map(|_| ())
            .map_err(|e| repository_failure("delete profile", e))
    }
}

// ───── Local JSON file ──────────────────────────────────────────────

impl LocalProfileRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalProfileRepo {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Reads the file leniently, counting entries that could not be decoded.
    async fn read_all(&self) -> Result<(Vec<Profile>, usize), AppError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((Vec::new(), 0)),
            Err(e) => return Err(repository_failure("read profile file", e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok((Vec::new(), 0));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| repository_failure("parse profile file", e))?;

        let Value::Array(items) = value else {
            return Ok(decode_counting_skips(value));
        };

        let mut skipped = 0;
        let profiles = items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .filter_map(|(index, item)| match serde_json::from_value::<Profile>(item) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping entry {} of {}: {}", index, self.path.display(), e);
                    skipped += 1;
                    None
                }
            })
            .collect();

        Ok((profiles, skipped))
    }

    /// Reads the file for a rewrite. Fails instead of dropping entries it cannot decode.
    async fn read_for_write(&self) -> Result<Vec<Profile>, AppError> {
        let (profiles, skipped) = self.read_all().await?;
        if skipped > 0 {
            return Err(repository_failure(
                "update profile file",
                format!(
                    "{} holds {} unreadable entries; fix them before writing",
                    self.path.display(),
                    skipped
                ),
            ));
        }
        Ok(profiles)
    }

    async fn write_all(&self, profiles: &[Profile]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| repository_failure("create data directory", e))?;
        }

        let json = serde_json::to_vec_pretty(profiles)?;
        let tmp_path = self.path.with_extension("json.tmp");

        fs::write(&tmp_path, json)
            .await
            .map_err(|e| repository_failure("write profile file", e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| repository_failure("replace profile file", e))
    }
}

#[async_trait]
impl ProfileRepository for LocalProfileRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        self.read_all().await.map(|_| ())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.read_all().await.map(|(profiles, _)| profiles)
    }

    async fn create_profile(&self, document: &ProfileDocument) -> Result<String, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut profiles = self.read_for_write().await?;
        let id = Uuid::new_v4().to_string();
        profiles.push(Profile::new(id.clone(), document.clone()));
        self.write_all(&profiles).await?;

        Ok(id)
    }

    async fn replace_profile(&self, id: &str, document: &ProfileDocument) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let mut profiles = self.read_for_write().await?;
        match profiles.iter_mut().find(|p| p.id == id) {
            Some(existing) => existing.document = document.clone(),
            None => profiles.push(Profile::new(id, document.clone())),
        }
        self.write_all(&profiles).await
    }

    async fn delete_profile(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let mut profiles = self.read_for_write().await?;
        profiles.retain(|p| p.id != id);
        self.write_all(&profiles).await
    }
}
