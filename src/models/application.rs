use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::status::{ApplicationStatus, StepRole};

/// Metadata key holding the password chosen at submission time. Removed from
/// the record when the applicant is hired and never returned by the API.
pub const ORIGINAL_PASSWORD_KEY: &str = "originalPassword";

pub const SYSTEM_ACTOR: &str = "System";
pub const SUBMITTED_NOTES: &str = "Application submitted successfully";
pub const AUTO_HIRE_NOTES: &str = "Automatically hired after admin approval";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub status: ApplicationStatus,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub actor_role: StepRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub university: String,
    pub major: String,
    pub graduation_date: Option<NaiveDate>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub position: String,
    pub current_status: ApplicationStatus,
    pub workflow: Vec<WorkflowStep>,
    pub interview_date: Option<DateTime<Utc>>,
    pub interview_type: Option<String>,
    pub interview_feedback: Option<String>,
    pub interview_rating: Option<i32>,
    pub hr_reviewer: Option<String>,
    pub admin_reviewer: Option<String>,
    pub rejection_reason: Option<String>,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields copied from a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub university: String,
    pub major: String,
    pub graduation_date: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub position: String,
}

impl ApplicationRecord {
    /// Builds a fresh application carrying the single `submitted` seed step.
    pub fn submitted(profile: ApplicantProfile, metadata: Option<JsonValue>, now: DateTime<Utc>) -> Self {
        let seed = WorkflowStep {
            status: ApplicationStatus::Submitted,
            timestamp: now,
            actor: SYSTEM_ACTOR.to_string(),
            actor_role: StepRole::System,
            notes: Some(SUBMITTED_NOTES.to_string()),
            metadata: None,
        };

        Self {
            id: Uuid::new_v4(),
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            university: profile.university,
            major: profile.major,
            graduation_date: profile.graduation_date,
            skills: profile.skills,
            position: profile.position,
            current_status: ApplicationStatus::Submitted,
            workflow: vec![seed],
            interview_date: None,
            interview_type: None,
            interview_feedback: None,
            interview_rating: None,
            hr_reviewer: None,
            admin_reviewer: None,
            rejection_reason: None,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> ApplicantProfile {
        ApplicantProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            university: self.university.clone(),
            major: self.major.clone(),
            graduation_date: self.graduation_date,
            skills: self.skills.clone(),
            position: self.position.clone(),
        }
    }

    /// Rejected applications stay on record but no longer block a new
    /// submission for the same email.
    pub fn is_active(&self) -> bool {
        !self.current_status.is_rejected()
    }

    /// Removes the submission password from `metadata` and returns it.
    pub fn take_original_password(&mut self) -> Option<String> {
        let Some(JsonValue::Object(map)) = self.metadata.as_mut() else {
            return None;
        };
        match map.remove(ORIGINAL_PASSWORD_KEY) {
            Some(JsonValue::String(password)) if !password.is_empty() => Some(password),
            _ => None,
        }
    }

    /// Appends a step and keeps `current_status` in sync with it.
    pub(crate) fn push_step(&mut self, step: WorkflowStep) {
        self.current_status = step.status;
        self.updated_at = step.timestamp;
        self.workflow.push(step);
    }

    /// Copy safe to hand out over the API.
    pub fn redacted(mut self) -> Self {
        if let Some(JsonValue::Object(map)) = self.metadata.as_mut() {
            map.remove(ORIGINAL_PASSWORD_KEY);
        }
        self
    }
}

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
