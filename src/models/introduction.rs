//! The singleton introduction/about document.

use super::{ensure_email, ensure_present, reference::ObjectKey};
use crate::services::content_service::{ContentError, ContentResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// The owner's introduction, about-section copy and contact details.
///
/// `avatar` and `resume` hold object keys only; display URLs are derived on
/// every read.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Introduction {
    pub introduction: String,
    pub description: String,
    pub description_title: String,
    pub number_of_projects: i64,
    pub number_of_clients: i64,
    pub client_satisfaction: f64,
    pub years_of_experience: f64,
    pub personal_values: Json<Vec<PersonalValue>>,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub avatar: Option<ObjectKey>,
    pub resume: Option<ObjectKey>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersonalValue {
    pub icon: String,
    pub title: String,
    pub description: String,
}

/// Body of `POST /api/introduction`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewIntroduction {
    pub introduction: String,
    pub description: String,
    pub description_title: String,
    pub number_of_projects: i64,
    pub number_of_clients: i64,
    pub client_satisfaction: f64,
    pub years_of_experience: f64,
    #[serde(default)]
    pub personal_values: Vec<PersonalValue>,
    pub email: String,
    pub phone: String,
    pub location: String,
}

/// Body of `PATCH /api/introduction`. Absent fields keep their value.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntroductionPatch {
    pub introduction: Option<String>,
    pub description: Option<String>,
    pub description_title: Option<String>,
    pub number_of_projects: Option<i64>,
    pub number_of_clients: Option<i64>,
    pub client_satisfaction: Option<f64>,
    pub years_of_experience: Option<f64>,
    pub personal_values: Option<Vec<PersonalValue>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

/// Public rendering of the introduction with freshly signed URLs.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IntroductionView {
    #[serde(flatten)]
    pub introduction: Introduction,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
}

impl NewIntroduction {
    pub fn validate(&self) -> ContentResult<()> {
        ensure_present("introduction", &self.introduction)?;
        ensure_present("description", &self.description)?;
        ensure_present("descriptionTitle", &self.description_title)?;
        ensure_counts(
            self.number_of_projects,
            self.number_of_clients,
            self.client_satisfaction,
            self.years_of_experience,
        )?;
        ensure_values(&self.personal_values)?;
        ensure_email(&self.email)?;
        ensure_present("phone", &self.phone)?;
        ensure_present("location", &self.location)
    }
}

impl IntroductionPatch {
    /// Merge onto the stored document and validate the result as a whole.
    pub fn apply(self, current: &mut Introduction) -> ContentResult<()> {
        if let Some(v) = self.introduction {
            current.introduction = v;
        }
        if let Some(v) = self.description {
            current.description = v;
        }
        if let Some(v) = self.description_title {
            current.description_title = v;
        }
        if let Some(v) = self.number_of_projects {
            current.number_of_projects = v;
        }
        if let Some(v) = self.number_of_clients {
            current.number_of_clients = v;
        }
        if let Some(v) = self.client_satisfaction {
            current.client_satisfaction = v;
        }
        if let Some(v) = self.years_of_experience {
            current.years_of_experience = v;
        }
        if let Some(v) = self.personal_values {
            current.personal_values = Json(v);
        }
        if let Some(v) = self.email {
            current.email = v;
        }
        if let Some(v) = self.phone {
            current.phone = v;
        }
        if let Some(v) = self.location {
            current.location = v;
        }

        ensure_present("introduction", &current.introduction)?;
        ensure_present("description", &current.description)?;
        ensure_present("descriptionTitle", &current.description_title)?;
        ensure_counts(
            current.number_of_projects,
            current.number_of_clients,
            current.client_satisfaction,
            current.years_of_experience,
        )?;
        ensure_values(&current.personal_values)?;
        ensure_email(&current.email)?;
        ensure_present("phone", &current.phone)?;
        ensure_present("location", &current.location)
    }
}

fn ensure_counts(projects: i64, clients: i64, satisfaction: f64, years: f64) -> ContentResult<()> {
    if projects < 0 {
        return Err(ContentError::Validation(
            "numberOfProjects must not be negative".into(),
        ));
    }
    if clients < 0 {
        return Err(ContentError::Validation(
            "numberOfClients must not be negative".into(),
        ));
    }
    if !(0.0..=100.0).contains(&satisfaction) {
        return Err(ContentError::Validation(
            "clientSatisfaction must be between 0 and 100".into(),
        ));
    }
    if years.is_nan() || years < 0.0 {
        return Err(ContentError::Validation(
            "yearsOfExperience must not be negative".into(),
        ));
    }
    Ok(())
}

fn ensure_values(values: &[PersonalValue]) -> ContentResult<()> {
    for value in values {
        ensure_present("personalValues.icon", &value.icon)?;
        ensure_present("personalValues.title", &value.title)?;
        ensure_present("personalValues.description", &value.description)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewIntroduction {
        NewIntroduction {
            introduction: "Hi, I build things".into(),
            description: "Backend developer".into(),
            description_title: "About me".into(),
            number_of_projects: 12,
            number_of_clients: 5,
            client_satisfaction: 98.0,
            years_of_experience: 4.5,
            personal_values: vec![PersonalValue {
                icon: "heart".into(),
                title: "Care".into(),
                description: "Ship carefully".into(),
            }],
            email: "me@example.com".into(),
            phone: "+1 555 0100".into(),
            location: "Lisbon".into(),
        }
    }

    #[test]
    fn accepts_complete_introduction() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_satisfaction() {
        let mut intro = sample();
        intro.client_satisfaction = 101.0;
        assert!(matches!(intro.validate(), Err(ContentError::Validation(_))));
    }

    #[test]
    fn rejects_blank_value_title() {
        let mut intro = sample();
        intro.personal_values[0].title = "  ".into();
        assert!(intro.validate().is_err());
    }
}
