//! Shared fixtures for router-level tests.

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::future::BoxFuture;
use portfolio_store::{
    AppState, app,
    config::StorageConfig,
    db,
    handlers::auth::AdminAuth,
    models::reference::ObjectKey,
    services::{
        content_service::ContentService,
        object_service::{BackendError, BucketTarget, Clock, ObjectBackend, ObjectService},
    },
};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const BOUNDARY: &str = "X-PORTFOLIO-BOUNDARY";

/// Object backend that records every call and never touches the network.
#[derive(Default)]
pub struct FakeBackend {
    pub puts: Mutex<Vec<(String, String, usize)>>,
    pub deletes: Mutex<Vec<String>>,
    pub presigns: Mutex<Vec<String>>,
    /// Uploads whose key contains one of these fail.
    pub fail_put_containing: Mutex<Vec<String>>,
    /// Presigning keys containing one of these fails.
    pub fail_presign_containing: Mutex<Vec<String>>,
    /// SQL run against the app database after each successful upload.
    pub after_put_sql: Mutex<Option<(Arc<SqlitePool>, String)>>,
}

impl FakeBackend {
    pub fn network_calls(&self) -> usize {
        self.puts.lock().unwrap().len() + self.deletes.lock().unwrap().len()
    }
}

impl ObjectBackend for FakeBackend {
    fn put_object<'a>(
        &'a self,
        _target: &'a BucketTarget,
        key: &'a ObjectKey,
        body: Bytes,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        Box::pin(async move {
            self.puts
                .lock()
                .unwrap()
                .push((key.to_string(), content_type.to_string(), body.len()));
            let fail = self
                .fail_put_containing
                .lock()
                .unwrap()
                .iter()
                .any(|needle| key.as_str().contains(needle.as_str()));
            if fail {
                return Err(BackendError::Status {
                    status: 500,
                    body: "InternalError".into(),
                });
            }
            let hook = self.after_put_sql.lock().unwrap().clone();
            if let Some((db, sql)) = hook {
                sqlx::query(&sql).execute(&*db).await.unwrap();
            }
            Ok(())
        })
    }

    fn delete_object<'a>(
        &'a self,
        _target: &'a BucketTarget,
        key: &'a ObjectKey,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        Box::pin(async move {
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(())
        })
    }

    fn presign_get<'a>(
        &'a self,
        target: &'a BucketTarget,
        key: &'a ObjectKey,
        expires_in_secs: u64,
        now: DateTime<Utc>,
        nonce: &'a str,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        Box::pin(async move {
            self.presigns.lock().unwrap().push(key.to_string());
            let fail = self
                .fail_presign_containing
                .lock()
                .unwrap()
                .iter()
                .any(|needle| key.as_str().contains(needle.as_str()));
            if fail {
                return Err(BackendError::Other("signing failed".into()));
            }
            Ok(format!(
                "https://{}.s3.test/{}?X-Amz-Date={}&X-Amz-Expires={}&x-portfolio-nonce={}",
                target.bucket,
                key,
                now.timestamp(),
                expires_in_secs,
                nonce
            ))
        })
    }
}

/// Clock that moves forward one second per reading.
pub struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    pub fn new() -> Self {
        Self(Mutex::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()))
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.0.lock().unwrap();
        let current = *now;
        *now = current + Duration::seconds(1);
        current
    }
}

pub fn storage_config() -> StorageConfig {
    StorageConfig {
        access_key_id: Some("AKIDEXAMPLE".into()),
        secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into()),
        region: Some("us-east-1".into()),
        bucket_name: Some("portfolio-assets".into()),
        endpoint: None,
        upload_timeout_secs: 5,
    }
}

pub struct TestApp {
    pub router: Router,
    pub backend: Arc<FakeBackend>,
    pub db: Arc<SqlitePool>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_storage(storage_config()).await
    }

    pub async fn with_storage(storage: StorageConfig) -> Self {
        let backend = Arc::new(FakeBackend::default());
        Self::with_backend(storage, backend.clone(), backend).await
    }

    /// Build the app around any backend; `fake` is what the test inspects.
    pub async fn with_backend(
        storage: StorageConfig,
        backend: Arc<dyn ObjectBackend>,
        fake: Arc<FakeBackend>,
    ) -> Self {
        let pool = Arc::new(db::connect_in_memory().await.unwrap());
        let state = AppState {
            content: ContentService::new(pool.clone()),
            objects: ObjectService::with_clock(storage, backend, Arc::new(SteppingClock::new())),
            admin: AdminAuth::new(Some(ADMIN_TOKEN)),
        };
        Self {
            router: app(state),
            backend: fake,
            db: pool,
        }
    }

    /// Run `sql` on the app database right after every successful upload, so
    /// the document write that follows sees the changed state.
    pub fn after_upload(&self, sql: &str) {
        *self.backend.after_put_sql.lock().unwrap() = Some((self.db.clone(), sql.to_string()));
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

pub fn admin(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
}

pub fn json_body(builder: axum::http::request::Builder, body: Value) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One part of a multipart body: `(field, Some((file name, content type)), bytes)`.
pub type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

pub fn multipart(builder: axum::http::request::Builder, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    builder
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A small JPEG-looking payload of `len` bytes.
pub fn jpeg(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(len, 0x42);
    bytes
}

pub fn introduction_json() -> Value {
    serde_json::json!({
        "introduction": "Hi, I'm a developer",
        "description": "I build web services",
        "descriptionTitle": "About me",
        "numberOfProjects": 10,
        "numberOfClients": 4,
        "clientSatisfaction": 99,
        "yearsOfExperience": 6,
        "personalValues": [
            { "icon": "code", "title": "Craft", "description": "Readable code" }
        ],
        "email": "dev@example.com",
        "phone": "+44 20 7946 0000",
        "location": "London"
    })
}

pub fn project_json(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "description": "Short",
        "longDescription": "Longer description",
        "category": "web",
        "tags": [
            { "id": "5b0e1a0e-3c57-4f1c-9d6a-2f6f0f7b7c11", "name": "rust", "color": "blue" }
        ],
        "status": "completed",
        "featured": false,
        "year": 2023,
        "client": "Acme",
        "duration": "3 months",
        "link": "https://example.com/project"
    })
}
