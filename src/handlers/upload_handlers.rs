//! Multipart upload plumbing and the raw upload/resolve endpoints.
//!
//! Request bodies are read into memory field by field (uploads are small:
//! avatars, resumes, screenshots) and handed to `ObjectService`.

use crate::{
    AppState,
    errors::{AppError, UPLOAD_FAILED},
    handlers::auth::AdminSession,
    models::{purpose::Purpose, reference::ObjectKey},
    services::object_service::{SignedUrl, Upload},
};
use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upper bound for a whole multipart request body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Files and text fields of one multipart request, keyed by field name.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: HashMap<String, Upload>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drain every field. A part with a file name is a file, anything else
    /// text. A file field name may appear only once.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    // One store call per incoming file field.
                    if form.files.contains_key(&name) {
                        return Err(AppError::bad_request(format!(
                            "{}: duplicate file field `{}`",
                            UPLOAD_FAILED, name
                        )));
                    }
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;
                    form.files.insert(
                        name,
                        Upload {
                            bytes,
                            content_type,
                            file_name,
                        },
                    );
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    /// Take a file field, treating an empty part (no file chosen) as absent.
    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files
            .remove(name)
            .filter(|upload| !upload.bytes.is_empty() || !upload.file_name.is_empty())
    }
}

#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub key: ObjectKey,
}

#[derive(Deserialize, Debug)]
pub struct ResolveQuery {
    pub key: String,
}

/// `POST /api/upload`: multipart `file` + `purpose`, returns the stored key.
pub async fn upload_file(
    _admin: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = UploadForm::read(multipart).await?;

    // Reject an unknown purpose before anything reaches the object store.
    let purpose: Purpose = form
        .fields
        .get("purpose")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()?;
    let upload = form
        .take_file("file")
        .ok_or_else(|| AppError::bad_request(format!("{}: no file provided", UPLOAD_FAILED)))?;

    let key = state.objects.store(upload, purpose).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { key })))
}

/// `GET /api/resolve?key=...`: a fresh signed URL for a stored key.
pub async fn resolve_key(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<SignedUrl>, AppError> {
    let signed = state.objects.resolve(&ObjectKey::new(query.key)).await?;
    Ok(Json(signed))
}
