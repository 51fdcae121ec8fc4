use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::dto::application_dto::{
    AllowedTransitionsResponse, CreateApplicationPayload, ListApplicationsQuery, UpdateStatusPayload,
};
use crate::error::Result;
use crate::middleware::auth::StaffIdentity;
use crate::models::application::ApplicationRecord;
use crate::AppState;

fn redact_all(records: Vec<ApplicationRecord>) -> Vec<ApplicationRecord> {
    records.into_iter().map(ApplicationRecord::redacted).collect()
}

pub async fn submit_application(
    State(state): State<AppState>,
    Json(payload): Json<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    let application = state.workflow_service.create_application(payload).await?;
    Ok((StatusCode::CREATED, Json(application.redacted())))
}

pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<impl IntoResponse> {
    let applications = match query.status {
        Some(status) => state.workflow_service.get_by_status(status).await?,
        None => state.workflow_service.list_applications().await?,
    };
    Ok(Json(redact_all(applications)))
}

pub async fn pending_applications(
    State(state): State<AppState>,
    Extension(identity): Extension<StaffIdentity>,
) -> Result<impl IntoResponse> {
    let mut pending = state
        .workflow_service
        .get_pending_for_role(identity.role)
        .await?;
    pending.pending = redact_all(pending.pending);
    pending.all = redact_all(pending.all);
    Ok(Json(pending))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.workflow_service.get_application(id).await?;
    Ok(Json(application.redacted()))
}

pub async fn allowed_transitions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(identity): Extension<StaffIdentity>,
) -> Result<impl IntoResponse> {
    let (current_status, allowed) = state
        .workflow_service
        .allowed_transitions(id, identity.role)
        .await?;
    Ok(Json(AllowedTransitionsResponse {
        id,
        current_status,
        role: identity.role,
        allowed: allowed.into_iter().collect(),
    }))
}

pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(identity): Extension<StaffIdentity>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    let updated = state
        .workflow_service
        .apply_transition(
            id,
            payload.status,
            &identity.name,
            identity.role,
            payload.notes,
            payload.metadata,
        )
        .await?;
    Ok(Json(updated.redacted()))
}
