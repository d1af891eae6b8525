//! Portfolio projects.

use super::{ensure_present, reference::ObjectKey};
use crate::services::content_service::{ContentError, ContentResult};
use chrono::{DateTime, Datelike, Utc};
use axum::http::Uri;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

const EARLIEST_YEAR: i64 = 1900;
const YEARS_AHEAD: i64 = 10;

/// A project shown in the portfolio section.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub long_description: String,
    /// Key of the cover image, if one was uploaded.
    pub image: Option<ObjectKey>,
    pub category: String,
    pub tags: Json<Vec<Tag>>,
    pub status: String,
    pub featured: bool,
    pub year: i64,
    pub client: String,
    pub duration: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: TagColor,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Blue,
    Purple,
}

/// Body of `POST /api/project`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub long_description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub status: String,
    #[serde(default)]
    pub featured: bool,
    pub year: i64,
    pub client: String,
    pub duration: String,
    pub link: String,
}

/// Body of `PATCH /api/project/{id}`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<Tag>>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub year: Option<i64>,
    pub client: Option<String>,
    pub duration: Option<String>,
    pub link: Option<String>,
}

/// A project as rendered publicly, with its image URL signed for this request.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub image_url: Option<String>,
}

impl NewProject {
    pub fn validate(&self) -> ContentResult<()> {
        validate_fields(ProjectFields {
            title: &self.title,
            description: &self.description,
            long_description: &self.long_description,
            category: &self.category,
            tags: &self.tags,
            status: &self.status,
            year: self.year,
            client: &self.client,
            duration: &self.duration,
            link: &self.link,
        })
    }
}

impl ProjectPatch {
    pub fn apply(self, current: &mut Project) -> ContentResult<()> {
        if let Some(v) = self.title {
            current.title = v;
        }
        if let Some(v) = self.description {
            current.description = v;
        }
        if let Some(v) = self.long_description {
            current.long_description = v;
        }
        if let Some(v) = self.category {
            current.category = v;
        }
        if let Some(v) = self.tags {
            current.tags = Json(v);
        }
        if let Some(v) = self.status {
            current.status = v;
        }
        if let Some(v) = self.featured {
            current.featured = v;
        }
        if let Some(v) = self.year {
            current.year = v;
        }
        if let Some(v) = self.client {
            current.client = v;
        }
        if let Some(v) = self.duration {
            current.duration = v;
        }
        if let Some(v) = self.link {
            current.link = v;
        }

        validate_fields(ProjectFields {
            title: &current.title,
            description: &current.description,
            long_description: &current.long_description,
            category: &current.category,
            tags: &current.tags,
            status: &current.status,
            year: current.year,
            client: &current.client,
            duration: &current.duration,
            link: &current.link,
        })
    }
}

struct ProjectFields<'a> {
    title: &'a str,
    description: &'a str,
    long_description: &'a str,
    category: &'a str,
    tags: &'a [Tag],
    status: &'a str,
    year: i64,
    client: &'a str,
    duration: &'a str,
    link: &'a str,
}

fn validate_fields(fields: ProjectFields<'_>) -> ContentResult<()> {
    ensure_present("title", fields.title)?;
    ensure_present("description", fields.description)?;
    ensure_present("longDescription", fields.long_description)?;
    ensure_present("category", fields.category)?;
    for tag in fields.tags {
        ensure_present("tags.name", &tag.name)?;
    }
    ensure_present("status", fields.status)?;

    let latest = i64::from(Utc::now().year()) + YEARS_AHEAD;
    if fields.year < EARLIEST_YEAR || fields.year > latest {
        return Err(ContentError::Validation(format!(
            "year must be between {} and {}",
            EARLIEST_YEAR, latest
        )));
    }

    ensure_present("client", fields.client)?;
    ensure_present("duration", fields.duration)?;

    match fields.link.parse::<Uri>() {
        Ok(uri)
            if matches!(uri.scheme_str(), Some("http" | "https"))
                && uri.host().is_some_and(|host| !host.is_empty()) =>
        {
            Ok(())
        }
        _ => Err(ContentError::Validation("Invalid link URL".into())),
    }
}
