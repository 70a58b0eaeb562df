//! Object storage backends for the raw dataset

use crate::config::{IngestionConfig, StorageBackend};
use crate::error::{ErrorContext, PipelineError, Result};
use reqwest::Url;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const GCS_BASE_URL: &str = "https://storage.googleapis.com/storage/v1/";
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Copies one object out of a bucket into a local file
pub trait ObjectFetcher: Send + Sync {
    fn fetch_object(&self, bucket: &str, object: &str, destination: &Path) -> Result<()>;
}

/// Google Cloud Storage over its JSON API
#[derive(Debug, Clone)]
pub struct GcsFetcher {
    base_url: String,
    credentials_path: Option<PathBuf>,
}

impl GcsFetcher {
    pub fn new(credentials_path: Option<PathBuf>) -> Self {
        Self {
            base_url: GCS_BASE_URL.to_string(),
            credentials_path,
        }
    }

    /// Point the fetcher at another endpoint with the same API
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Media download URL; bucket and object are percent-encoded as single segments
    pub fn object_url(&self, bucket: &str, object: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PipelineError::ConfigError(format!("invalid storage url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PipelineError::ConfigError("storage url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["b", bucket, "o", object]);
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }

    /// Bearer token from the credentials file, if one is configured and present
    fn bearer_token(&self) -> Result<Option<String>> {
        match &self.credentials_path {
            Some(path) if path.exists() => {
                let token = std::fs::read_to_string(path)
                    .with_context(|| format!("reading credentials {}", path.display()))?;
                Ok(Some(token.trim().to_string()))
            }
            Some(path) => {
                debug!(path = %path.display(), "Credentials file not found, using anonymous access");
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

impl ObjectFetcher for GcsFetcher {
    fn fetch_object(&self, bucket: &str, object: &str, destination: &Path) -> Result<()> {
        let url = self.object_url(bucket, object)?;
        info!(bucket, object, "Downloading object from GCS");

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()?;

        let mut request = client.get(url);
        if let Some(token) = self.bearer_token()? {
            request = request.bearer_auth(token);
        }

        let mut response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::FetchError(format!(
                "GET gs://{}/{} returned {}",
                bucket, object, status
            )));
        }

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Partial downloads never land at the destination
        let partial = partial_path(destination);
        let written = File::create(&partial)
            .map_err(PipelineError::from)
            .and_then(|mut file| response.copy_to(&mut file).map_err(PipelineError::from));
        let bytes = match written {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = std::fs::remove_file(&partial);
                return Err(e.context(format!("downloading gs://{}/{}", bucket, object)));
            }
        };
        std::fs::rename(&partial, destination)
            .with_context(|| format!("moving download to {}", destination.display()))?;

        info!(bytes, path = %destination.display(), "Object downloaded");
        Ok(())
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// A directory laid out as `{root}/{bucket}/{object}`
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectFetcher for LocalFetcher {
    fn fetch_object(&self, bucket: &str, object: &str, destination: &Path) -> Result<()> {
        let source = self.root.join(bucket).join(object);
        info!(source = %source.display(), "Copying object from local storage");

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = std::fs::copy(&source, destination)
            .with_context(|| format!("copying {}", source.display()))?;

        debug!(bytes, path = %destination.display(), "Object copied");
        Ok(())
    }
}

/// Fetcher for the configured storage backend
pub fn fetcher_for(config: &IngestionConfig) -> Result<Box<dyn ObjectFetcher>> {
    match config.storage_backend {
        StorageBackend::Gcs => Ok(Box::new(GcsFetcher::new(config.credentials_path.clone()))),
        StorageBackend::Local => {
            let root = config.local_storage_root.clone().ok_or_else(|| {
                PipelineError::ConfigError(
                    "local_storage_root is required when storage_backend is local".to_string(),
                )
            })?;
            Ok(Box::new(LocalFetcher::new(root)))
        }
    }
}
