//! src/services/content_service.rs
//!
//! ContentService: persistence for the portfolio documents (introduction,
//! projects, contact messages) in SQLite. Reference fields are plain key
//! strings here; uploading and signing live in `ObjectService`.

use crate::models::{
    contact::{Contact, NewContact},
    introduction::{Introduction, IntroductionPatch, NewIntroduction},
    project::{NewProject, Project, ProjectPatch},
    reference::ObjectKey,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::{SqlitePool, types::Json};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ContentResult<T> = Result<T, ContentError>;

const INTRODUCTION_COLUMNS: &str = "introduction, description, description_title, \
     number_of_projects, number_of_clients, client_satisfaction, years_of_experience, \
     personal_values, email, phone, location, avatar, resume, created_at, updated_at";

const PROJECT_COLUMNS: &str = "id, title, description, long_description, image, category, \
     tags, status, featured, year, client, duration, link, created_at, updated_at";

const CONTACT_COLUMNS: &str = "id, full_name, email, subject, message, created_at";

/// Counters for the admin overview.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub projects: i64,
    pub featured_projects: i64,
    pub contacts: i64,
}

#[derive(Clone)]
pub struct ContentService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl ContentService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    // --- Introduction ---

    pub async fn get_introduction(&self) -> ContentResult<Option<Introduction>> {
        let intro = sqlx::query_as::<_, Introduction>(&format!(
            "SELECT {} FROM introduction WHERE id = 1",
            INTRODUCTION_COLUMNS
        ))
        .fetch_optional(&*self.db)
        .await?;
        Ok(intro)
    }

    async fn require_introduction(&self) -> ContentResult<Introduction> {
        self.get_introduction()
            .await?
            .ok_or_else(|| ContentError::NotFound("Introduction".into()))
    }

    pub async fn create_introduction(&self, new: NewIntroduction) -> ContentResult<Introduction> {
        new.validate()?;
        let now = Utc::now();

        let result = sqlx::query_as::<_, Introduction>(&format!(
            "INSERT INTO introduction (id, introduction, description, description_title,
                 number_of_projects, number_of_clients, client_satisfaction, years_of_experience,
                 personal_values, email, phone, location, avatar, resume, created_at, updated_at)
             VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, NULL, ?, ?)
             RETURNING {}",
            INTRODUCTION_COLUMNS
        ))
        .bind(&new.introduction)
        .bind(&new.description)
        .bind(&new.description_title)
        .bind(new.number_of_projects)
        .bind(new.number_of_clients)
        .bind(new.client_satisfaction)
        .bind(new.years_of_experience)
        .bind(Json(&new.personal_values))
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.location)
        .bind(now)
        .bind(now)
        .fetch_one(&*self.db)
        .await;

        match result {
            Ok(intro) => Ok(intro),
            Err(err) if is_unique_violation(&err) => {
                Err(ContentError::AlreadyExists("Introduction".into()))
            }
            Err(err) => Err(ContentError::Sqlx(err)),
        }
    }

    pub async fn update_introduction(&self, patch: IntroductionPatch) -> ContentResult<Introduction> {
        let mut intro = self.require_introduction().await?;
        patch.apply(&mut intro)?;

        let updated = sqlx::query_as::<_, Introduction>(&format!(
            "UPDATE introduction SET
                 introduction = ?, description = ?, description_title = ?,
                 number_of_projects = ?, number_of_clients = ?, client_satisfaction = ?,
                 years_of_experience = ?, personal_values = ?, email = ?, phone = ?,
                 location = ?, updated_at = ?
             WHERE id = 1
             RETURNING {}",
            INTRODUCTION_COLUMNS
        ))
        .bind(&intro.introduction)
        .bind(&intro.description)
        .bind(&intro.description_title)
        .bind(intro.number_of_projects)
        .bind(intro.number_of_clients)
        .bind(intro.client_satisfaction)
        .bind(intro.years_of_experience)
        .bind(&intro.personal_values)
        .bind(&intro.email)
        .bind(&intro.phone)
        .bind(&intro.location)
        .bind(Utc::now())
        .fetch_optional(&*self.db)
        .await?;

        updated.ok_or_else(|| ContentError::NotFound("Introduction".into()))
    }

    /// Bind freshly uploaded keys. `None` leaves the field untouched; there is
    /// no way to unbind a reference.
    pub async fn bind_introduction_files(
        &self,
        avatar: Option<&ObjectKey>,
        resume: Option<&ObjectKey>,
    ) -> ContentResult<Introduction> {
        let updated = sqlx::query_as::<_, Introduction>(&format!(
            "UPDATE introduction SET
                 avatar = COALESCE(?, avatar),
                 resume = COALESCE(?, resume),
                 updated_at = ?
             WHERE id = 1
             RETURNING {}",
            INTRODUCTION_COLUMNS
        ))
        .bind(avatar)
        .bind(resume)
        .bind(Utc::now())
        .fetch_optional(&*self.db)
        .await?;

        updated.ok_or_else(|| ContentError::NotFound("Introduction".into()))
    }

    // --- Projects ---

    /// All projects, newest first.
    pub async fn list_projects(&self, featured_only: bool) -> ContentResult<Vec<Project>> {
        let sql = if featured_only {
            format!(
                "SELECT {} FROM projects WHERE featured = 1 ORDER BY created_at DESC, rowid DESC",
                PROJECT_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM projects ORDER BY created_at DESC, rowid DESC",
                PROJECT_COLUMNS
            )
        };
        let projects = sqlx::query_as::<_, Project>(&sql)
            .fetch_all(&*self.db)
            .await?;
        Ok(projects)
    }

    pub async fn get_project(&self, id: Uuid) -> ContentResult<Project> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ContentError::NotFound(format!("Project `{}`", id)))
    }

    pub async fn create_project(&self, new: NewProject) -> ContentResult<Project> {
        new.validate()?;
        let now = Utc::now();

        let project = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (id, title, description, long_description, image, category,
                 tags, status, featured, year, client, duration, link, created_at, updated_at)
             VALUES (?, ?, ?, ?, NULL, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.long_description)
        .bind(&new.category)
        .bind(Json(&new.tags))
        .bind(&new.status)
        .bind(new.featured)
        .bind(new.year)
        .bind(&new.client)
        .bind(&new.duration)
        .bind(&new.link)
        .bind(now)
        .bind(now)
        .fetch_one(&*self.db)
        .await?;

        debug!(id = %project.id, "created project");
        Ok(project)
    }

    pub async fn update_project(&self, id: Uuid, patch: ProjectPatch) -> ContentResult<Project> {
        let mut project = self.get_project(id).await?;
        patch.apply(&mut project)?;

        sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET
                 title = ?, description = ?, long_description = ?, category = ?, tags = ?,
                 status = ?, featured = ?, year = ?, client = ?, duration = ?, link = ?,
                 updated_at = ?
             WHERE id = ?
             RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.long_description)
        .bind(&project.category)
        .bind(&project.tags)
        .bind(&project.status)
        .bind(project.featured)
        .bind(project.year)
        .bind(&project.client)
        .bind(&project.duration)
        .bind(&project.link)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ContentError::NotFound(format!("Project `{}`", id)))
    }

    /// Rebind the project's image to a freshly uploaded key.
    pub async fn bind_project_image(&self, id: Uuid, key: &ObjectKey) -> ContentResult<Project> {
        sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET image = ?, updated_at = ? WHERE id = ? RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(key)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ContentError::NotFound(format!("Project `{}`", id)))
    }

    /// Delete the project row. Its image object, if any, stays in the bucket.
    pub async fn delete_project(&self, id: Uuid) -> ContentResult<Project> {
        sqlx::query_as::<_, Project>(&format!(
            "DELETE FROM projects WHERE id = ? RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ContentError::NotFound(format!("Project `{}`", id)))
    }

    // --- Contacts ---

    pub async fn create_contact(&self, new: NewContact) -> ContentResult<Contact> {
        new.validate()?;
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "INSERT INTO contacts (id, full_name, email, subject, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {}",
            CONTACT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.full_name.trim())
        .bind(new.email.trim())
        .bind(new.subject.trim())
        .bind(&new.message)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;
        Ok(contact)
    }

    /// Contact messages, newest first, optionally capped at `limit`.
    pub async fn list_contacts(&self, limit: Option<i64>) -> ContentResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {} FROM contacts ORDER BY created_at DESC, rowid DESC LIMIT ?",
            CONTACT_COLUMNS
        ))
        .bind(limit.unwrap_or(-1))
        .fetch_all(&*self.db)
        .await?;
        Ok(contacts)
    }

    pub async fn stats(&self) -> ContentResult<ContentStats> {
        let projects = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(&*self.db)
            .await?;
        let featured_projects =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE featured = 1")
                .fetch_one(&*self.db)
                .await?;
        let contacts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contacts")
            .fetch_one(&*self.db)
            .await?;
        Ok(ContentStats {
            projects,
            featured_projects,
            contacts,
        })
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
