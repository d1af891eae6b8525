//! Messages submitted through the public contact form.

use super::{ensure_email, ensure_present};
use crate::services::content_service::ContentResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/contact`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub full_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl NewContact {
    pub fn validate(&self) -> ContentResult<()> {
        ensure_present("fullName", &self.full_name)?;
        ensure_email(&self.email)?;
        ensure_present("subject", &self.subject)?;
        ensure_present("message", &self.message)
    }
}
