use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tokio::sync::oneshot;
use uuid::Uuid;
use validator::Validate;

use crate::dto::application_dto::{CreateApplicationPayload, PendingApplicationsResponse};
use crate::error::{Error, Result};
use crate::models::application::{ApplicationRecord, WorkflowStep, AUTO_HIRE_NOTES, SYSTEM_ACTOR};
use crate::models::status::{ActorRole, ApplicationStatus, StepRole};
use crate::services::application_store::{mutation, ApplicationStore};
use crate::services::notification_service::StatusNotifier;
use crate::services::provisioning_service::ProvisioningService;
use crate::services::transitions::{allowed_next_statuses, is_transition_allowed, pending_statuses};

const INTERVIEW_DATE_KEY: &str = "interviewDate";
const INTERVIEW_TYPE_KEY: &str = "interviewType";
const FEEDBACK_KEY: &str = "feedback";
const RATING_KEY: &str = "rating";
const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Application hiring workflow: creation, role-gated transitions, side
/// effects and the read-side queries dashboards need.
#[derive(Clone)]
pub struct WorkflowService {
    store: Arc<dyn ApplicationStore>,
    provisioning: ProvisioningService,
    notifier: Arc<dyn StatusNotifier>,
}

impl WorkflowService {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        provisioning: ProvisioningService,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        Self {
            store,
            provisioning,
            notifier,
        }
    }

    pub async fn create_application(&self, payload: CreateApplicationPayload) -> Result<ApplicationRecord> {
        let payload = payload.normalized();
        payload.validate()?;

        let (profile, metadata) = payload.into_parts();
        let record = ApplicationRecord::submitted(profile, metadata, Utc::now());
        let record = self.store.insert(record).await?;

        tracing::info!(
            application_id = %record.id,
            position = %record.position,
            "Application submitted"
        );
        self.notify(&record, ApplicationStatus::Submitted).await;
        Ok(record)
    }

    pub async fn get_application(&self, id: Uuid) -> Result<ApplicationRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| Error::application_not_found(id))
    }

    pub async fn list_applications(&self) -> Result<Vec<ApplicationRecord>> {
        self.store.list_all().await
    }

    pub async fn get_by_status(&self, status: ApplicationStatus) -> Result<Vec<ApplicationRecord>> {
        self.store.list_by_statuses(&[status]).await
    }

    pub async fn get_pending_for_role(&self, role: ActorRole) -> Result<PendingApplicationsResponse> {
        let all = self.store.list_all().await?;
        let queue = pending_statuses(role);
        let pending = all
            .iter()
            .filter(|app| queue.contains(&app.current_status))
            .cloned()
            .collect();

        Ok(PendingApplicationsResponse {
            role,
            pending,
            totals: status_totals(&all),
            all,
        })
    }

    pub async fn allowed_transitions(
        &self,
        id: Uuid,
        role: ActorRole,
    ) -> Result<(ApplicationStatus, BTreeSet<ApplicationStatus>)> {
        let application = self.get_application(id).await?;
        let current = application.current_status;
        Ok((current, allowed_next_statuses(current, role)))
    }

    /// Validates and applies one transition, including the automatic hire
    /// that follows an admin approval, in a single atomic write. Provisioning
    /// and notifications run afterwards and never fail the call.
    pub async fn apply_transition(
        &self,
        id: Uuid,
        requested: ApplicationStatus,
        actor: &str,
        role: ActorRole,
        notes: Option<String>,
        metadata: Option<JsonValue>,
    ) -> Result<ApplicationRecord> {
        let actor_name = actor.to_string();
        let (password_tx, mut password_rx) = oneshot::channel();
        let updated = self
            .store
            .update_with(
                id,
                mutation(move |record| {
                    let released =
                        advance(record, requested, &actor_name, role, notes, metadata, Utc::now())?;
                    if let Some(password) = released {
                        let _ = password_tx.send(password);
                    }
                    Ok(())
                }),
            )
            .await
            .map_err(|err| {
                if let Error::InvalidTransition { current, .. } = &err {
                    tracing::warn!(
                        application_id = %id,
                        current = %current,
                        requested = %requested,
                        role = %role,
                        "Rejected workflow transition"
                    );
                }
                err
            })?;

        tracing::info!(
            application_id = %id,
            status = %updated.current_status,
            actor = %actor,
            role = %role,
            "Application status updated"
        );

        self.notify(&updated, requested).await;

        if requested == ApplicationStatus::AdminApproved {
            self.notify(&updated, ApplicationStatus::Hired).await;
            // The hire is already committed; a provisioning failure is only logged.
            let password = password_rx.try_recv().ok();
            if let Err(e) = self.provisioning.provision(&updated, password).await {
                tracing::warn!(
                    application_id = %id,
                    error = %e,
                    "Intern account provisioning failed"
                );
            }
        }

        Ok(updated)
    }

    async fn notify(&self, application: &ApplicationRecord, status: ApplicationStatus) {
        if let Err(e) = self.notifier.notify(application, status).await {
            tracing::warn!(
                application_id = %application.id,
                status = %status,
                error = %e,
                "Status notification failed"
            );
        }
    }
}

pub fn status_totals(applications: &[ApplicationRecord]) -> BTreeMap<ApplicationStatus, usize> {
    let mut totals: BTreeMap<ApplicationStatus, usize> =
        ApplicationStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for app in applications {
        *totals.entry(app.current_status).or_default() += 1;
    }
    totals
}

/// Applies a requested transition to `record` in place. On error nothing
/// has been modified. An admin approval hires the applicant and hands back
/// the submission password, which no longer stays on the record.
pub fn advance(
    record: &mut ApplicationRecord,
    requested: ApplicationStatus,
    actor: &str,
    role: ActorRole,
    notes: Option<String>,
    metadata: Option<JsonValue>,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let current = record.current_status;
    if !is_transition_allowed(current, requested, role) {
        return Err(Error::InvalidTransition {
            current,
            requested,
            role,
        });
    }

    let interview =
        InterviewDetails::from_metadata(record.id, requested, notes.as_deref(), metadata.as_ref());

    let timestamp = record
        .workflow
        .last()
        .map(|last| last.timestamp.max(now))
        .unwrap_or(now);

    match role {
        ActorRole::Hr if record.hr_reviewer.is_none() => record.hr_reviewer = Some(actor.to_string()),
        ActorRole::Admin if record.admin_reviewer.is_none() => {
            record.admin_reviewer = Some(actor.to_string())
        }
        _ => {}
    }

    if requested.is_rejected() {
        record.rejection_reason = notes.clone();
    }
    interview.apply(record);

    record.push_step(WorkflowStep {
        status: requested,
        timestamp,
        actor: actor.to_string(),
        actor_role: StepRole::from(role),
        notes,
        metadata,
    });

    if requested != ApplicationStatus::AdminApproved {
        return Ok(None);
    }

    record.push_step(WorkflowStep {
        status: ApplicationStatus::Hired,
        timestamp,
        actor: SYSTEM_ACTOR.to_string(),
        actor_role: StepRole::System,
        notes: Some(AUTO_HIRE_NOTES.to_string()),
        metadata: None,
    });
    Ok(record.take_original_password())
}

#[derive(Debug, Default)]
struct InterviewDetails {
    date: Option<DateTime<Utc>>,
    kind: Option<String>,
    feedback: Option<String>,
    rating: Option<i32>,
}

impl InterviewDetails {
    /// Values that do not parse are skipped; the raw metadata still lands on
    /// the workflow step.
    fn from_metadata(
        application_id: Uuid,
        requested: ApplicationStatus,
        notes: Option<&str>,
        metadata: Option<&JsonValue>,
    ) -> Self {
        let field = |key: &str| metadata.and_then(|m| m.get(key)).filter(|v| !v.is_null());
        let skipped = |key: &str, value: &JsonValue| {
            tracing::warn!(
                application_id = %application_id,
                field = key,
                value = %value,
                "Ignoring malformed interview metadata"
            );
        };

        match requested {
            ApplicationStatus::InterviewScheduled => {
                let date = field(INTERVIEW_DATE_KEY).and_then(|raw| {
                    let parsed = raw
                        .as_str()
                        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                        .map(|d| d.with_timezone(&Utc));
                    if parsed.is_none() {
                        skipped(INTERVIEW_DATE_KEY, raw);
                    }
                    parsed
                });
                let kind = field(INTERVIEW_TYPE_KEY)
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                Self {
                    date,
                    kind,
                    ..Self::default()
                }
            }
            ApplicationStatus::InterviewCompleted => {
                let rating = field(RATING_KEY).and_then(|raw| {
                    let parsed = raw
                        .as_i64()
                        .filter(|r| RATING_RANGE.contains(r))
                        .map(|r| r as i32);
                    if parsed.is_none() {
                        skipped(RATING_KEY, raw);
                    }
                    parsed
                });
                let feedback = field(FEEDBACK_KEY)
                    .and_then(|v| v.as_str())
                    .or(notes)
                    .map(str::to_string);
                Self {
                    rating,
                    feedback,
                    ..Self::default()
                }
            }
            _ => Self::default(),
        }
    }

    fn apply(self, record: &mut ApplicationRecord) {
        if self.date.is_some() {
            record.interview_date = self.date;
        }
        if self.kind.is_some() {
            record.interview_type = self.kind;
        }
        if self.feedback.is_some() {
            record.interview_feedback = self.feedback;
        }
        if self.rating.is_some() {
            record.interview_rating = self.rating;
        }
    }
}
