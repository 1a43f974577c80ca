//! Result Delivery
//!
//! Fetches a merged artifact and saves it locally. Delivery failures are
//! reported on their own: the merge that produced the URL already succeeded.

use crate::config::DeliveryConfig;
use crate::error::{ApiError, MergeError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Saves the artifact behind a result URL and returns its local path.
#[async_trait]
pub trait ResultDelivery: Send + Sync {
    async fn deliver(&self, result_url: &str) -> Result<PathBuf, MergeError>;
}

/// Where artifact bytes come from.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Stream the artifact at `url` into `sink`; returns the number of bytes written.
    async fn fetch_into(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, MergeError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpArtifactSource {
    http: Client,
}

impl HttpArtifactSource {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

fn transport_failure(err: reqwest::Error) -> MergeError {
    MergeError::DownloadFailed(err.to_string())
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    async fn fetch_into(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, MergeError> {
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(transport_failure)?
            .error_for_status()
            .map_err(transport_failure)?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(transport_failure)? {
            sink.write_all(&chunk).await.map_err(|e| {
                MergeError::DownloadFailed(format!("Failed to write artifact: {}", e))
            })?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }
}

/// Writes fetched artifacts into a directory under timestamped names.
#[derive(Debug, Clone)]
pub struct FileDelivery<S> {
    source: S,
    output_dir: PathBuf,
    file_prefix: String,
    extension: String,
}

impl FileDelivery<HttpArtifactSource> {
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(HttpArtifactSource::new(http), config.output_dir.clone())
            .with_naming(config.file_prefix.clone(), config.extension.clone()))
    }
}

impl<S: ArtifactSource> FileDelivery<S> {
    pub fn new(source: S, output_dir: PathBuf) -> Self {
        Self {
            source,
            output_dir,
            file_prefix: "merged-video".to_string(),
            extension: "mp4".to_string(),
        }
    }

    pub fn with_naming(mut self, file_prefix: String, extension: String) -> Self {
        self.file_prefix = file_prefix;
        self.extension = extension;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `{prefix}-{unix_millis}.{extension}`
    pub fn file_name_at(&self, unix_millis: i64) -> String {
        format!("{}-{}.{}", self.file_prefix, unix_millis, self.extension)
    }

    /// Fetch `url` and save it as `file_name` in the output directory.
    pub async fn deliver_as(&self, url: &str, file_name: &str) -> Result<PathBuf, MergeError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                MergeError::DownloadFailed(format!(
                    "Failed to create output directory {}: {}",
                    self.output_dir.display(),
                    e
                ))
            })?;

        let staged = StagedFile::new(&self.output_dir, file_name);
        let mut file = staged.create().await?;
        let bytes = self.source.fetch_into(url, &mut file).await?;
        debug!(url, bytes, "Fetched merged artifact");
        staged.commit(file).await
    }
}

#[async_trait]
impl<S: ArtifactSource> ResultDelivery for FileDelivery<S> {
    async fn deliver(&self, result_url: &str) -> Result<PathBuf, MergeError> {
        let file_name = self.file_name_at(Utc::now().timestamp_millis());
        let path = self.deliver_as(result_url, &file_name).await?;
        info!(path = %path.display(), "Saved merged video");
        Ok(path)
    }
}

/// Hidden `.part` file renamed into place on success.
///
/// Dropping it removes the staging file whatever happened before.
struct StagedFile {
    temp: PathBuf,
    dest: PathBuf,
}

impl StagedFile {
    fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            temp: dir.join(format!(".{}.part", file_name)),
            dest: dir.join(file_name),
        }
    }

    async fn create(&self) -> Result<File, MergeError> {
        File::create(&self.temp).await.map_err(|e| {
            MergeError::DownloadFailed(format!("Failed to create {}: {}", self.temp.display(), e))
        })
    }

    async fn commit(&self, mut file: File) -> Result<PathBuf, MergeError> {
        let synced = match file.flush().await {
            Ok(()) => file.sync_all().await,
            Err(e) => Err(e),
        };
        synced.map_err(|e| {
            MergeError::DownloadFailed(format!("Failed to write {}: {}", self.temp.display(), e))
        })?;
        drop(file);

        tokio::fs::rename(&self.temp, &self.dest).await.map_err(|e| {
            MergeError::DownloadFailed(format!("Failed to save {}: {}", self.dest.display(), e))
        })?;
        Ok(self.dest.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.temp) {
            Ok(()) => debug!(path = %self.temp.display(), "Removed staging file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.temp.display(), error = %e, "Failed to remove staging file"),
        }
    }
}
