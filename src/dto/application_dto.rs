use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{normalize_email, ApplicantProfile, ApplicationRecord};
use crate::models::status::{ActorRole, ApplicationStatus};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApplicationPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "University is required"))]
    pub university: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Major is required"))]
    pub major: String,
    pub graduation_date: Option<NaiveDate>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,
    pub metadata: Option<JsonValue>,
}

impl CreateApplicationPayload {
    /// Trims text fields so blank input fails validation.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            phone: self.phone.trim().to_string(),
            university: self.university.trim().to_string(),
            major: self.major.trim().to_string(),
            graduation_date: self.graduation_date,
            skills: self
                .skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            position: self.position.trim().to_string(),
            metadata: self.metadata,
        }
    }

    pub fn into_parts(self) -> (ApplicantProfile, Option<JsonValue>) {
        let profile = ApplicantProfile {
            name: self.name,
            email: self.email,
            phone: self.phone,
            university: self.university,
            major: self.major,
            graduation_date: self.graduation_date,
            skills: self.skills,
            position: self.position,
        };
        (profile, self.metadata)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub metadata: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
pub struct ListApplicationsQuery {
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Serialize)]
pub struct PendingApplicationsResponse {
    pub role: ActorRole,
    pub pending: Vec<ApplicationRecord>,
    pub all: Vec<ApplicationRecord>,
    pub totals: BTreeMap<ApplicationStatus, usize>,
}

#[derive(Debug, Serialize)]
pub struct AllowedTransitionsResponse {
    pub id: Uuid,
    pub current_status: ApplicationStatus,
    pub role: ActorRole,
    pub allowed: Vec<ApplicationStatus>,
}
