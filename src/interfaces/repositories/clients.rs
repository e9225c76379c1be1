use std::path::PathBuf;

use reqwest::Client;
use tokio::sync::Mutex;
use url::Url;
use zeroize::Zeroizing;

/// Profiles in a Firebase Realtime Database collection.
#[derive(Clone)]
pub struct FirebaseProfileRepo {
    pub client: Client,
    pub database_url: Url,
    pub collection: String,
    pub auth_token: Option<Zeroizing<String>>,
}

/// Images in a Firebase Storage bucket.
#[derive(Clone)]
pub struct FirebaseBlobStore {
    pub client: Client,
    /// Storage REST root, `FIREBASE_STORAGE_API` unless overridden.
    pub api_base: String,
    pub bucket: String,
    pub auth_token: Option<Zeroizing<String>>,
}

/// Profiles in a JSON file on local disk.
pub struct LocalProfileRepo {
    pub path: PathBuf,
    pub write_lock: Mutex<()>,
}

/// Images in a local directory, served from `public_base_url`.
#[derive(Clone)]
pub struct LocalBlobStore {
    pub upload_dir: PathBuf,
    pub public_base_url: Url,
}

pub const FIREBASE_STORAGE_API: &str = "https://firebasestorage.googleapis.com/v0/b";
