use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, path::PathBuf, str::FromStr};

use crate::constants::{DEFAULT_MAX_IMAGE_BYTES, MIN_REQUEST_BODY_BYTES};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

/// Where profiles and images are kept.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryBackend {
    /// Firebase Realtime Database + Firebase Storage over REST.
    Firebase,
    /// JSON file and upload directory on local disk.
    Local,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_backend")]
    pub backend: RepositoryBackend,

    #[serde(default)]
    pub firebase_database_url: String,

    #[serde(default = "default_collection")]
    pub firebase_collection: String,

    #[serde(default)]
    pub firebase_storage_bucket: String,

    #[serde(default)]
    pub firebase_auth_token: Option<String>,

    #[serde(default = "default_local_data_path")]
    pub local_data_path: PathBuf,

    #[serde(default = "default_local_upload_dir")]
    pub local_upload_dir: PathBuf,

    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Profile-Directory".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_backend() -> RepositoryBackend {
    RepositoryBackend::Local
}
fn default_collection() -> String {
    "users".to_string()
}
fn default_local_data_path() -> PathBuf {
    PathBuf::from("data/profiles.json")
}
fn default_local_upload_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:8080/uploads/".to_string()
}
fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}
fn default_request_timeout() -> u64 {
    30
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true)
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.backend == RepositoryBackend::Firebase {
            if self.firebase_database_url.trim().is_empty() {
                errors.push("FIREBASE_DATABASE_URL cannot be empty");
            } else if url::Url::parse(&self.firebase_database_url).is_err() {
                errors.push("FIREBASE_DATABASE_URL must be a valid URL");
            }
            if self.firebase_storage_bucket.trim().is_empty() {
                errors.push("FIREBASE_STORAGE_BUCKET cannot be empty");
            }
            if self.firebase_collection.trim().is_empty() {
                errors.push("FIREBASE_COLLECTION cannot be empty");
            }
        } else if url::Url::parse(&self.public_base_url).is_err() {
            errors.push("PUBLIC_BASE_URL must be a valid URL");
        }
        if self.max_image_bytes == 0 {
            errors.push("MAX_IMAGE_BYTES must be greater than zero");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    /// Request body limit for profile submissions.
    ///
    /// Leaves room for an image up to twice the allowed size, so an oversized
    /// image is still parsed and rejected as too large rather than as a broken form.
    pub fn request_body_limit(&self) -> usize {
        self.max_image_bytes
            .saturating_mul(2)
            .max(MIN_REQUEST_BODY_BYTES)
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self.as_deref() {
            None | Some("") => "[NOT SET]",
            Some(_) => "[REDACTED]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("backend", &self.backend)
            .field("firebase_database_url", &self.firebase_database_url)
            .field("firebase_collection", &self.firebase_collection)
            .field("firebase_storage_bucket", &self.firebase_storage_bucket)
            .field("firebase_auth_token", &self.firebase_auth_token.redact())
            .field("local_data_path", &self.local_data_path)
            .field("local_upload_dir", &self.local_upload_dir)
            .field("public_base_url", &self.public_base_url)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
