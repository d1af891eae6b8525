//! src/services/object_service.rs
//!
//! ObjectService: stores uploaded files in an S3-compatible bucket and hands
//! back opaque keys, and turns those keys into short-lived signed URLs on
//! demand. Documents persist the key only; signed URLs are never cached or
//! stored.

use crate::{
    config::StorageConfig,
    models::{purpose::Purpose, reference::ObjectKey},
};
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Lifetime of every signed URL.
pub const SIGNED_URL_TTL_SECS: i64 = 3600;

/// Failures reported by a storage backend (transport or store side).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("object store request failed: {0}")]
    Request(String),
    #[error("object store responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object storage is not configured: missing {}", .0.join(", "))]
    Configuration(Vec<&'static str>),
    #[error("{0}")]
    InvalidInput(String),
    #[error("failed to upload `{key}`")]
    UploadFailed {
        key: String,
        #[source]
        source: BackendError,
    },
    #[error("failed to sign URL for `{key}`")]
    ResolveFailed {
        key: String,
        #[source]
        source: BackendError,
    },
    #[error("failed to delete `{key}`")]
    DeleteFailed {
        key: String,
        #[source]
        source: BackendError,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Fully specified bucket coordinates and credentials.
///
/// Only ever produced by [`StorageConfig::target`], so holding one means the
/// configuration was complete at the time of the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketTarget {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
    /// Path-style endpoint for S3-compatible stores; AWS virtual-hosted URLs when absent.
    pub endpoint: Option<String>,
}

/// The two primitives the service needs from an object store, plus delete for cleanup.
pub trait ObjectBackend: Send + Sync {
    fn put_object<'a>(
        &'a self,
        target: &'a BucketTarget,
        key: &'a ObjectKey,
        body: Bytes,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<(), BackendError>>;

    fn delete_object<'a>(
        &'a self,
        target: &'a BucketTarget,
        key: &'a ObjectKey,
    ) -> BoxFuture<'a, Result<(), BackendError>>;

    /// Presign a time-limited `GET` issued at `now`, with `nonce` included
    /// in the signed query. Local computation, no network I/O.
    fn presign_get<'a>(
        &'a self,
        target: &'a BucketTarget,
        key: &'a ObjectKey,
        expires_in_secs: u64,
        now: DateTime<Utc>,
        nonce: &'a str,
    ) -> BoxFuture<'a, Result<String, BackendError>>;
}

/// Source of the current time for key stamps and signatures.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A file received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: String,
}

/// A signed read URL and the instant it stops working.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ObjectService {
    config: Arc<StorageConfig>,
    backend: Arc<dyn ObjectBackend>,
    clock: Arc<dyn Clock>,
}

impl ObjectService {
    pub fn new(config: StorageConfig, backend: Arc<dyn ObjectBackend>) -> Self {
        Self::with_clock(config, backend, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: StorageConfig,
        backend: Arc<dyn ObjectBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            clock,
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn target(&self) -> StorageResult<BucketTarget> {
        self.config.target().inspect_err(|err| {
            error!("{}", err);
        })
    }

    /// Store `upload` under a fresh key derived from `purpose`.
    ///
    /// Single attempt: a failed write is returned to the caller as
    /// `UploadFailed` and never retried here.
    pub async fn store(&self, upload: Upload, purpose: Purpose) -> StorageResult<ObjectKey> {
        let target = self.target()?;

        if upload.bytes.is_empty() {
            return Err(StorageError::InvalidInput("no file provided".into()));
        }
        let file_name = base_name(&upload.file_name);
        if file_name.is_empty() {
            return Err(StorageError::InvalidInput("file has no name".into()));
        }

        let key = derive_key(purpose, self.clock.now(), file_name);
        let size = upload.bytes.len();

        self.backend
            .put_object(&target, &key, upload.bytes, &upload.content_type)
            .await
            .map_err(|source| StorageError::UploadFailed {
                key: key.to_string(),
                source,
            })?;

        info!(%key, %purpose, size, "stored object");
        Ok(key)
    }

    /// Store several files of one logical update as independent concurrent
    /// uploads. Keys come back in input order.
    ///
    /// If any upload fails, the ones that succeeded are discarded (best
    /// effort) and the first failure is returned.
    pub async fn store_batch(&self, uploads: Vec<(Upload, Purpose)>) -> StorageResult<Vec<ObjectKey>> {
        let results = futures::future::join_all(
            uploads
                .into_iter()
                .map(|(upload, purpose)| self.store(upload, purpose)),
        )
        .await;

        let mut stored = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(key) => stored.push(key),
                Err(err) if failure.is_none() => failure = Some(err),
                Err(err) => warn!("additional upload failure in batch: {}", err),
            }
        }

        match failure {
            None => Ok(stored),
            Some(err) => {
                self.discard_all(&stored).await;
                Err(err)
            }
        }
    }

    /// Produce a signed `GET` URL for `key`, valid for [`SIGNED_URL_TTL_SECS`].
    ///
    /// Every call signs a fresh random nonce, so two resolutions of the same
    /// key never return the same URL, even within one second. The key is not
    /// checked against the bucket; a URL for a missing object is still
    /// returned and fails when fetched.
    pub async fn resolve(&self, key: &ObjectKey) -> StorageResult<SignedUrl> {
        if key.as_str().is_empty() {
            return Err(StorageError::InvalidInput("empty object key".into()));
        }
        let target = self.target()?;
        let now = self.clock.now();
        let nonce = Uuid::new_v4().simple().to_string();

        let url = self
            .backend
            .presign_get(&target, key, SIGNED_URL_TTL_SECS as u64, now, &nonce)
            .await
            .map_err(|source| StorageError::ResolveFailed {
                key: key.to_string(),
                source,
            })?;

        debug!(%key, "signed object URL");
        Ok(SignedUrl {
            url,
            expires_at: now + Duration::seconds(SIGNED_URL_TTL_SECS),
        })
    }

    /// Display URL for an optional reference field.
    ///
    /// Unbound fields and failed resolutions both come out as `None`; failures
    /// are logged and do not fail the surrounding read.
    pub async fn display_url(&self, key: Option<&ObjectKey>) -> Option<String> {
        let key = key?;
        degrade(key, self.resolve(key).await)
    }

    /// Delete an object. Only used to clean up uploads whose owning document
    /// write failed; replaced objects are kept.
    pub async fn discard(&self, key: &ObjectKey) -> StorageResult<()> {
        let target = self.target()?;
        self.backend
            .delete_object(&target, key)
            .await
            .map_err(|source| StorageError::DeleteFailed {
                key: key.to_string(),
                source,
            })?;
        info!(%key, "discarded orphaned object");
        Ok(())
    }

    /// Best-effort cleanup of objects uploaded by a request that then failed.
    pub async fn discard_all(&self, keys: &[ObjectKey]) {
        let results = futures::future::join_all(keys.iter().map(|key| self.discard(key))).await;
        for err in results.into_iter().filter_map(Result::err) {
            warn!("cleanup of orphaned upload failed: {}", err);
        }
    }
}

/// Map a per-item resolution result down to the optional URL shown to readers.
pub fn degrade(key: &ObjectKey, result: StorageResult<SignedUrl>) -> Option<String> {
    match result {
        Ok(signed) => Some(signed.url),
        Err(err) => {
            warn!(%key, "could not resolve object reference: {}", err);
            None
        }
    }
}

/// `<prefix>/<unix_ms>-<file name>`.
pub fn derive_key(purpose: Purpose, now: DateTime<Utc>, file_name: &str) -> ObjectKey {
    ObjectKey::new(format!(
        "{}/{}-{}",
        purpose.prefix(),
        now.timestamp_millis(),
        file_name
    ))
}

/// Strip any client-supplied directory components from a file name.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}
