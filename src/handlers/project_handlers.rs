//! Handlers for portfolio projects.

use crate::{
    AppState,
    errors::{AppError, UPLOAD_FAILED},
    handlers::{auth::AdminSession, upload_handlers::UploadForm},
    models::{
        project::{NewProject, Project, ProjectPatch, ProjectView},
        purpose::Purpose,
    },
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

#[derive(Deserialize, Debug, Default)]
pub struct PublicProjectsQuery {
    #[serde(default)]
    pub featured: bool,
}

/// `GET /api/project`: all projects, 404 when there are none.
pub async fn list_projects(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = state.content.list_projects(false).await?;
    if projects.is_empty() {
        return Err(AppError::not_found("No projects found"));
    }
    Ok(Json(projects))
}

/// `GET /api/project/{id}`
pub async fn get_project(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(state.content.get_project(id).await?))
}

/// `POST /api/project`
pub async fn create_project(
    _admin: AdminSession,
    State(state): State<AppState>,
    Json(payload): Json<NewProject>,
) -> Result<impl IntoResponse, AppError> {
    let project = state.content.create_project(payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// `PATCH /api/project/{id}`
pub async fn update_project(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(state.content.update_project(id, patch).await?))
}

/// `DELETE /api/project/{id}`: the image object is left in the bucket.
pub async fn delete_project(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let project = state.content.delete_project(id).await?;
    if let Some(image) = &project.image {
        info!(%id, %image, "deleted project; image object retained");
    }
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

/// `POST /api/project/{id}/image`: multipart `image`.
pub async fn upload_project_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ProjectView>, AppError> {
    let current = state.content.get_project(id).await?;

    let mut form = UploadForm::read(multipart).await?;
    let upload = form
        .take_file("image")
        .ok_or_else(|| AppError::bad_request(format!("{}: no file provided", UPLOAD_FAILED)))?;

    let key = state.objects.store(upload, Purpose::Project).await?;
    if let Some(previous) = &current.image {
        info!(%id, %previous, replacement = %key, "replacing project image");
    }

    match state.content.bind_project_image(id, &key).await {
        Ok(project) => {
            let image_url = state.objects.display_url(project.image.as_ref()).await;
            Ok(Json(ProjectView { project, image_url }))
        }
        Err(err) => {
            state.objects.discard_all(std::slice::from_ref(&key)).await;
            Err(err.into())
        }
    }
}

/// `GET /api/public/projects[?featured=true]`
///
/// Each image is resolved on its own; one that cannot be signed renders as
/// `imageUrl: null` while the rest of the list is returned normally.
pub async fn public_projects(
    State(state): State<AppState>,
    Query(query): Query<PublicProjectsQuery>,
) -> Result<Json<Vec<ProjectView>>, AppError> {
    let projects = state.content.list_projects(query.featured).await?;
    let objects = &state.objects;
    let views = join_all(projects.into_iter().map(|project| async move {
        let image_url = objects.display_url(project.image.as_ref()).await;
        ProjectView { project, image_url }
    }))
    .await;
    Ok(Json(views))
}
