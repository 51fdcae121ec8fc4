use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternAccountStatus {
    Active,
    Inactive,
}

impl InternAccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InternAccountStatus::Active => "active",
            InternAccountStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub university: String,
    pub major: String,
    pub graduation_date: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub position: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: InternAccountStatus,
    pub application_history: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to open an account for a hired applicant.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInternAccount {
    pub application_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub university: String,
    pub major: String,
    pub graduation_date: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub position: String,
    pub password_hash: String,
}
