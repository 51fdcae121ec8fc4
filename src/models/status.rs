use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    InterviewScheduled,
    InterviewCompleted,
    HrApproved,
    HrRejected,
    AdminApproved,
    AdminRejected,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 9] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderReview,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::InterviewCompleted,
        ApplicationStatus::HrApproved,
        ApplicationStatus::HrRejected,
        ApplicationStatus::AdminApproved,
        ApplicationStatus::AdminRejected,
        ApplicationStatus::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::InterviewCompleted => "interview_completed",
            ApplicationStatus::HrApproved => "hr_approved",
            ApplicationStatus::HrRejected => "hr_rejected",
            ApplicationStatus::AdminApproved => "admin_approved",
            ApplicationStatus::AdminRejected => "admin_rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// No role may move an application out of a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::HrRejected | ApplicationStatus::AdminRejected | ApplicationStatus::Hired
        )
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ApplicationStatus::HrRejected | ApplicationStatus::AdminRejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown application status: {}", s))
    }
}

/// Role of a human actor requesting a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Hr,
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Hr => "hr",
            ActorRole::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("hr") {
            Ok(ActorRole::Hr)
        } else if s.eq_ignore_ascii_case("admin") {
            Ok(ActorRole::Admin)
        } else {
            Err(format!("Unknown actor role: {}", s))
        }
    }
}

/// Role recorded on a workflow step. `System` is reserved for steps the
/// service appends on its own (submission seed, auto-hire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRole {
    System,
    Hr,
    Admin,
}

impl From<ActorRole> for StepRole {
    fn from(role: ActorRole) -> Self {
        match role {
            ActorRole::Hr => StepRole::Hr,
            ActorRole::Admin => StepRole::Admin,
        }
    }
}
