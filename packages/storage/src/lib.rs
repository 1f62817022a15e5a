#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fetches the casualty CSV from Supabase Storage.
//!
//! The dashboard only needs "the text of one object", so the collaborator is
//! the small [`BlobStore`] trait; [`SupabaseStorage`] is the production
//! implementation and tests substitute an in-memory store.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `SUPABASE_URL` | Yes | Project base URL |
//! | `SUPABASE_ANON_KEY` | Yes | API key sent as `apikey` and bearer token |
//! | `SUPABASE_BUCKET_NAME` | No | Bucket name, default `casualties-data` |
//! | `SUPABASE_FILE_PATH` | No | Object path, default `merged.csv` |

use async_trait::async_trait;

/// Bucket used when `SUPABASE_BUCKET_NAME` is unset.
pub const DEFAULT_BUCKET: &str = "casualties-data";

/// Object path used when `SUPABASE_FILE_PATH` is unset.
pub const DEFAULT_FILE_PATH: &str = "merged.csv";

/// Errors that can occur while fetching the dataset.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Missing required environment variable.
    #[error("Missing environment variable: {name}")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: String,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storage API answered with a non-success status.
    #[error("Failed to download {bucket}/{path}: HTTP {status}")]
    Status {
        /// Bucket name.
        bucket: String,
        /// Object path.
        path: String,
        /// HTTP status code.
        status: u16,
    },

    /// The object exists but has no content.
    #[error("Downloaded {bucket}/{path} is empty")]
    Empty {
        /// Bucket name.
        bucket: String,
        /// Object path.
        path: String,
    },
}

/// Where the dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Project base URL, without a trailing slash.
    pub url: String,
    /// Anonymous API key.
    pub anon_key: String,
    /// Bucket name.
    pub bucket: String,
    /// Object path inside the bucket.
    pub path: String,
}

impl StorageConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingEnv`] if `SUPABASE_URL` or
    /// `SUPABASE_ANON_KEY` is unset.
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingEnv`] if a required variable is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StorageError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let url = require_env(&read, "SUPABASE_URL")?;
        let anon_key = require_env(&read, "SUPABASE_ANON_KEY")?;
        let bucket = read("SUPABASE_BUCKET_NAME").unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let path = read("SUPABASE_FILE_PATH").unwrap_or_else(|| DEFAULT_FILE_PATH.to_string());

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            bucket,
            path: path.trim_start_matches('/').to_string(),
        })
    }

    /// Authenticated download URL of the configured object.
    #[must_use]
    pub fn object_url(&self) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.url, self.bucket, self.path
        )
    }
}

fn require_env(
    read: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, StorageError> {
    read(name).ok_or_else(|| StorageError::MissingEnv {
        name: name.to_string(),
    })
}

/// Source of the raw dataset bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Downloads the whole object. Bytes are returned undecoded so the CSV
    /// reader can skip individual records that are not valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the object cannot be fetched or is empty.
    async fn fetch_bytes(&self) -> Result<Vec<u8>, StorageError>;
}

/// [`BlobStore`] backed by the Supabase Storage REST API.
pub struct SupabaseStorage {
    config: StorageConfig,
    client: reqwest::Client,
}

impl SupabaseStorage {
    /// Creates a client for the configured object.
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingEnv`] if a required variable is unset.
    pub fn from_env() -> Result<Self, StorageError> {
        Ok(Self::new(StorageConfig::from_env()?))
    }

    /// The configuration this client downloads from.
    #[must_use]
    pub const fn config(&self) -> &StorageConfig {
        &self.config
    }
}

#[async_trait]
impl BlobStore for SupabaseStorage {
    async fn fetch_bytes(&self) -> Result<Vec<u8>, StorageError> {
        let url = self.config.object_url();
        log::info!(
            "Downloading {}/{} from storage",
            self.config.bucket,
            self.config.path
        );

        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.config.anon_key))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                bucket: self.config.bucket.clone(),
                path: self.config.path.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?.to_vec();
        log::info!("Downloaded {} bytes", body.len());

        non_empty_body(&self.config, body)
    }
}

fn non_empty_body(config: &StorageConfig, body: Vec<u8>) -> Result<Vec<u8>, StorageError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(StorageError::Empty {
            bucket: config.bucket.clone(),
            path: config.path.clone(),
        });
    }
    Ok(body)
}
