//! Contact form submissions and the admin overview.

use crate::{
    AppState,
    errors::AppError,
    handlers::auth::AdminSession,
    models::contact::{Contact, NewContact},
    services::content_service::ContentStats,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

const RECENT_CONTACTS: i64 = 5;

/// `POST /api/contact`. Public.
pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<NewContact>,
) -> Result<impl IntoResponse, AppError> {
    let contact = state.content.create_contact(payload).await?;
    tracing::info!(id = %contact.id, "received contact message");
    Ok((StatusCode::CREATED, Json(contact)))
}

/// `GET /api/contact`: every message, newest first.
pub async fn list_contacts(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Contact>>, AppError> {
    Ok(Json(state.content.list_contacts(None).await?))
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[serde(flatten)]
    pub stats: ContentStats,
    pub recent_contacts: Vec<Contact>,
}

/// `GET /api/overview`: dashboard counters and the latest messages.
pub async fn overview(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Overview>, AppError> {
    let stats = state.content.stats().await?;
    let recent_contacts = state.content.list_contacts(Some(RECENT_CONTACTS)).await?;
    Ok(Json(Overview {
        stats,
        recent_contacts,
    }))
}
