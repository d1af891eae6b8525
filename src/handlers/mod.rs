pub mod auth;
pub mod contact_handlers;
pub mod health_handlers;
pub mod introduction_handlers;
pub mod project_handlers;
pub mod upload_handlers;
