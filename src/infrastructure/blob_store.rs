// src/infrastructure/blob_store.rs
use crate::application::BlobStore;
use crate::domain::DomainError;
use crate::infrastructure::config::StorageConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use opendal::{services, Operator};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Opens the object store named by `uri`.
///
/// `file:///dir` maps to the local filesystem, `s3://bucket/prefix` to S3
/// with credentials from the usual AWS environment, and `memory://` to a
/// throwaway in-process store.
pub fn create_operator_from_uri(uri: &str, region: Option<&str>) -> Result<Operator> {
    if uri == "memory://" {
        return Ok(Operator::new(services::Memory::default())?.finish());
    }

    let url = Url::parse(uri).map_err(|e| anyhow!("Invalid storage URI: {}", e))?;
    let op = match url.scheme() {
        "file" => {
            let root = local_root(&url)
                .ok_or_else(|| anyhow!("Storage URI {} is not a local path", uri))?;
            Operator::new(services::Fs::default().root(&root.to_string_lossy()))?.finish()
        }
        "s3" => {
            let bucket = url
                .host_str()
                .ok_or_else(|| anyhow!("S3 URI missing bucket"))?;
            let mut builder = services::S3::default()
                .bucket(bucket)
                .region(region.unwrap_or("auto"));
            if url.path() != "/" && !url.path().is_empty() {
                builder = builder.root(url.path());
            }
            Operator::new(builder)?.finish()
        }
        other => return Err(anyhow!("Unsupported storage scheme: {}", other)),
    };
    Ok(op)
}

/// Decoded directory of a `file://` URI.
fn local_root(url: &Url) -> Option<PathBuf> {
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

/// [`BlobStore`] over an OpenDAL operator.
///
/// Image URLs are presigned when the service supports it. Otherwise they are
/// built from `public_base_url`, or from the local root for `file://` stores.
#[derive(Debug)]
pub struct OpendalBlobStore {
    op: Operator,
    public_base_url: Option<Url>,
    local_root: Option<PathBuf>,
    url_ttl: Duration,
}

impl OpendalBlobStore {
    pub fn new(op: Operator, public_base_url: Option<Url>, url_ttl: Duration) -> Self {
        Self {
            op,
            public_base_url,
            local_root: None,
            url_ttl,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let region = Some(config.region.as_str()).filter(|r| !r.is_empty());
        let op = create_operator_from_uri(&config.uri, region)
            .with_context(|| format!("Failed to open object store at {}", config.uri))?;

        let public_base_url = if config.public_base_url.is_empty() {
            None
        } else {
            Some(Url::parse(&config.public_base_url).context("Invalid storage.public_base_url")?)
        };

        let local_root = Url::parse(&config.uri).ok().as_ref().and_then(local_root);

        Ok(Self {
            op,
            public_base_url,
            local_root,
            url_ttl: Duration::from_secs(config.url_ttl_secs),
        })
    }

    fn public_url(&self, key: &str) -> Option<Result<Url, DomainError>> {
        if let Some(base) = &self.public_base_url {
            let mut url = base.clone();
            let pushed = url
                .path_segments_mut()
                .map(|mut segments| {
                    segments.pop_if_empty().push(key);
                })
                .map_err(|_| DomainError::blob(key, "public base URL cannot hold a path"));
            return Some(pushed.map(|_| url));
        }
        self.local_root.as_ref().map(|root| {
            Url::from_file_path(root.join(key))
                .map_err(|_| DomainError::blob(key, "cannot build file URL"))
        })
    }
}

#[async_trait]
impl BlobStore for OpendalBlobStore {
    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), DomainError> {
        self.op
            .write(key, bytes)
            .await
            .map_err(|e| DomainError::blob(key, e))?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn url(&self, key: &str) -> Result<Url, DomainError> {
        if self.op.info().full_capability().presign_read {
            let presigned = self
                .op
                .presign_read(key, self.url_ttl)
                .await
                .map_err(|e| DomainError::blob(key, e))?;
            debug!(key, "Presigned image URL");
            return Url::parse(&presigned.uri().to_string()).map_err(|e| DomainError::blob(key, e));
        }

        self.public_url(key).unwrap_or_else(|| {
            Err(DomainError::blob(
                key,
                "store cannot presign and no public_base_url is configured",
            ))
        })
    }

    #[instrument(level = "debug", skip(self))]
    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.op
            .delete(key)
            .await
            .map_err(|e| DomainError::blob(key, e))
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        self.op
            .exists(key)
            .await
            .map_err(|e| DomainError::blob(key, e))
    }
}
