//! Defines routes for the portfolio API.
//!
//! ## Structure
//! - **Public endpoints**
//!   - `GET    /api/public/introduction` - introduction with signed avatar/resume URLs
//!   - `GET    /api/public/projects`     - projects with signed image URLs (`?featured=true`)
//!   - `POST   /api/contact`             - submit a contact message
//!
//! - **Admin endpoints** (bearer token)
//!   - `GET|POST|PATCH /api/introduction`
//!   - `POST   /api/introduction/files`  - multipart `avatar` / `resume`
//!   - `GET|POST       /api/project`
//!   - `GET|PATCH|DELETE /api/project/{id}`
//!   - `POST   /api/project/{id}/image`  - multipart `image`
//!   - `GET    /api/contact`
//!   - `GET    /api/overview`
//!   - `POST   /api/upload`              - multipart `file` + `purpose`, returns a key
//!   - `GET    /api/resolve?key=`        - signed URL for a key

use crate::{
    AppState,
    handlers::{
        contact_handlers::{create_contact, list_contacts, overview},
        health_handlers::{healthz, readyz},
        introduction_handlers::{
            create_introduction, get_introduction, public_introduction, update_introduction,
            upload_introduction_files,
        },
        project_handlers::{
            create_project, delete_project, get_project, list_projects, public_projects,
            update_project, upload_project_image,
        },
        upload_handlers::{MAX_UPLOAD_BYTES, resolve_key, upload_file},
    },
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build and return the router for every API route.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    let uploads = Router::new()
        .route("/api/upload", post(upload_file))
        .route("/api/introduction/files", post(upload_introduction_files))
        .route("/api/project/{id}/image", post(upload_project_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // public reads
        .route("/api/public/introduction", get(public_introduction))
        .route("/api/public/projects", get(public_projects))
        // admin content
        .route(
            "/api/introduction",
            get(get_introduction)
                .post(create_introduction)
                .patch(update_introduction),
        )
        .route("/api/project", get(list_projects).post(create_project))
        .route(
            "/api/project/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/api/contact", get(list_contacts).post(create_contact))
        .route("/api/overview", get(overview))
        .route("/api/resolve", get(resolve_key))
        .merge(uploads)
}
