//! Handlers for the singleton introduction document.

use crate::{
    AppState,
    errors::{AppError, UPLOAD_FAILED},
    handlers::{auth::AdminSession, upload_handlers::UploadForm},
    models::{
        introduction::{Introduction, IntroductionPatch, IntroductionView, NewIntroduction},
        purpose::Purpose,
        reference::Reference,
    },
    services::object_service::ObjectService,
};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

/// `GET /api/introduction`: the stored document, keys included.
pub async fn get_introduction(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Introduction>, AppError> {
    state
        .content
        .get_introduction()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Introduction not found"))
}

/// `POST /api/introduction`
pub async fn create_introduction(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(payload): Json<NewIntroduction>,
) -> Result<impl IntoResponse, AppError> {
    let intro = state.content.create_introduction(payload).await?;
    Ok((StatusCode::CREATED, Json(intro)))
}

/// `PATCH /api/introduction`
pub async fn update_introduction(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(patch): Json<IntroductionPatch>,
) -> Result<Json<Introduction>, AppError> {
    Ok(Json(state.content.update_introduction(patch).await?))
}

/// File fields accepted by `POST /api/introduction/files`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IntroductionFile {
    Avatar,
    Resume,
}

impl IntroductionFile {
    const ALL: [IntroductionFile; 2] = [IntroductionFile::Avatar, IntroductionFile::Resume];

    fn field(self) -> &'static str {
        match self {
            IntroductionFile::Avatar => "avatar",
            IntroductionFile::Resume => "resume",
        }
    }

    fn purpose(self) -> Purpose {
        match self {
            IntroductionFile::Avatar => Purpose::Avatar,
            IntroductionFile::Resume => Purpose::Resume,
        }
    }
}

/// `POST /api/introduction/files`: multipart `avatar` and/or `resume`.
///
/// Each present file is uploaded once; the new keys replace the old ones on
/// the document. Replaced objects stay in the bucket. When the document write
/// fails, the objects uploaded by this request are discarded.
pub async fn upload_introduction_files(
    _admin: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<IntroductionView>, AppError> {
    let current = state
        .content
        .get_introduction()
        .await?
        .ok_or_else(|| AppError::not_found("Introduction not found"))?;

    let mut form = UploadForm::read(multipart).await?;
    let mut files = Vec::new();
    let mut uploads = Vec::new();
    for file in IntroductionFile::ALL {
        if let Some(upload) = form.take_file(file.field()) {
            files.push(file);
            uploads.push((upload, file.purpose()));
        }
    }
    if uploads.is_empty() {
        return Err(AppError::bad_request(format!(
            "{}: no file provided",
            UPLOAD_FAILED
        )));
    }

    let keys = state.objects.store_batch(uploads).await?;

    let mut avatar = Reference::from(current.avatar);
    let mut resume = Reference::from(current.resume);
    let (mut new_avatar, mut new_resume) = (None, None);
    for (file, key) in files.iter().zip(keys.iter()) {
        let (field, slot) = match file {
            IntroductionFile::Avatar => (&mut avatar, &mut new_avatar),
            IntroductionFile::Resume => (&mut resume, &mut new_resume),
        };
        if let Some(previous) = field.rebind(key.clone()) {
            info!(field = file.field(), %previous, replacement = %key, "replacing introduction file");
        }
        *slot = Some(key);
    }

    let written = state
        .content
        .bind_introduction_files(new_avatar, new_resume)
        .await;
    match written {
        Ok(intro) => Ok(Json(introduction_view(&state.objects, intro).await)),
        Err(err) => {
            state.objects.discard_all(&keys).await;
            Err(err.into())
        }
    }
}

/// `GET /api/public/introduction`: with display URLs signed for this request.
pub async fn public_introduction(
    State(state): State<AppState>,
) -> Result<Json<IntroductionView>, AppError> {
    let intro = state
        .content
        .get_introduction()
        .await?
        .ok_or_else(|| AppError::not_found("Introduction not found"))?;
    Ok(Json(introduction_view(&state.objects, intro).await))
}

async fn introduction_view(objects: &ObjectService, introduction: Introduction) -> IntroductionView {
    let (avatar_url, resume_url) = futures::join!(
        objects.display_url(introduction.avatar.as_ref()),
        objects.display_url(introduction.resume.as_ref()),
    );
    IntroductionView {
        avatar_url,
        resume_url,
        introduction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn introduction_files_map_to_their_own_purpose() {
        let mapped: Vec<_> = IntroductionFile::ALL
            .iter()
            .map(|file| (file.field(), file.purpose()))
            .collect();
        assert_eq!(
            mapped,
            vec![("avatar", Purpose::Avatar), ("resume", Purpose::Resume)]
        );
    }
}
