//! The real S3 backend against a mock HTTP server.

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use mockito::{Matcher, Server};
use portfolio_store::{
    config::StorageConfig,
    models::{purpose::Purpose, reference::ObjectKey},
    services::{
        object_service::{BackendError, ObjectService, StorageError, Upload},
        s3_backend::S3Backend,
    },
};
use std::{sync::Arc, time::Duration};

fn storage_for(endpoint: String) -> StorageConfig {
    StorageConfig {
        access_key_id: Some("AKIDEXAMPLE".into()),
        secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into()),
        region: Some("eu-west-2".into()),
        bucket_name: Some("portfolio-assets".into()),
        endpoint: Some(endpoint),
        upload_timeout_secs: 5,
    }
}

fn service_for(endpoint: String) -> ObjectService {
    let backend = S3Backend::new(Duration::from_secs(5));
    ObjectService::new(storage_for(endpoint), Arc::new(backend))
}

fn photo() -> Upload {
    Upload {
        bytes: Bytes::from_static(b"\xff\xd8\xff\xe0not-really-a-jpeg"),
        content_type: "image/jpeg".into(),
        file_name: "me.jpg".into(),
    }
}

#[tokio::test]
async fn put_is_signed_and_path_style() {
    let mut server = Server::new_async().await;
    let expected_md5 = general_purpose::STANDARD.encode(md5::compute(b"\xff\xd8\xff\xe0not-really-a-jpeg").0);

    let mock = server
        .mock(
            "PUT",
            Matcher::Regex(r"^/portfolio-assets/avatars/\d+-me\.jpg".into()),
        )
        .match_header(
            "authorization",
            Matcher::Regex(
                r"^AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/\d{8}/eu-west-2/s3/aws4_request, SignedHeaders=[a-z0-9;-]*host[a-z0-9;-]*, Signature=[0-9a-f]{64}$"
                    .into(),
            ),
        )
        .match_header("content-md5", expected_md5.as_str())
        .match_header("content-type", "image/jpeg")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let key = service_for(server.url())
        .store(photo(), Purpose::Avatar)
        .await
        .unwrap();

    assert!(key.as_str().starts_with("avatars/"));
    mock.assert_async().await;
}

#[tokio::test]
async fn rejected_put_is_reported_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", Matcher::Any)
        .with_status(500)
        .with_header("content-type", "application/xml")
        .with_body(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Error><Code>InternalError</Code><Message>We encountered an internal error.</Message></Error>",
        )
        .expect(1)
        .create_async()
        .await;

    let err = service_for(server.url())
        .store(photo(), Purpose::Resume)
        .await
        .unwrap_err();

    match err {
        StorageError::UploadFailed { key, source } => {
            assert!(key.starts_with("resumes/"));
            match source {
                BackendError::Status { status, .. } => assert_eq!(status, 500),
                other => panic!("unexpected backend error: {other:?}"),
            }
        }
        other => panic!("unexpected error: {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn discard_sends_a_signed_delete() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock(
            "DELETE",
            Matcher::Regex(r"^/portfolio-assets/projectImages/1-shot\.png".into()),
        )
        .match_header("authorization", Matcher::Regex("^AWS4-HMAC-SHA256 ".into()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    service_for(server.url())
        .discard(&ObjectKey::new("projectImages/1-shot.png"))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn signed_urls_point_at_the_endpoint_without_network() {
    let server = Server::new_async().await;
    let service = service_for(server.url());

    let signed = service
        .resolve(&ObjectKey::new("avatars/1-me.jpg"))
        .await
        .unwrap();

    let prefix = format!("{}/portfolio-assets/avatars/1-me.jpg?", server.url());
    assert!(signed.url.starts_with(&prefix));
    assert!(signed.url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
    assert!(signed.url.contains("X-Amz-Expires=3600"));
    assert!(signed.url.contains("X-Amz-Signature="));
}

#[tokio::test]
async fn back_to_back_resolutions_are_distinct() {
    let server = Server::new_async().await;
    let service = service_for(server.url());
    let key = ObjectKey::new("avatars/1-me.jpg");

    let first = service.resolve(&key).await.unwrap();
    let second = service.resolve(&key).await.unwrap();

    assert_ne!(first.url, second.url);
    assert!(first.url.contains("x-portfolio-nonce="));
}
