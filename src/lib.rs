//! Portfolio content API.
//!
//! Serves the public sections of a personal portfolio (introduction,
//! projects, contact form) and the admin CRUD behind them. Uploaded files go
//! to an S3-compatible bucket; documents keep only the returned object keys,
//! and readers get short-lived signed URLs derived on every request.

use axum::Router;

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use handlers::auth::AdminAuth;
use services::{content_service::ContentService, object_service::ObjectService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub content: ContentService,
    pub objects: ObjectService,
    pub admin: AdminAuth,
}

/// Build the application router with its state attached.
pub fn app(state: AppState) -> Router {
    routes::routes::routes().with_state(state)
}
