use std::collections::BTreeSet;

use crate::models::status::{ActorRole, ApplicationStatus};

/// Statuses the given role may move an application to from `current`.
/// Pairs with no edges yield an empty set.
pub fn allowed_next_statuses(
    current: ApplicationStatus,
    role: ActorRole,
) -> BTreeSet<ApplicationStatus> {
    use crate::models::status::ApplicationStatus::*;

    let review_edges: &[ApplicationStatus] = match current {
        Submitted => &[UnderReview, HrRejected],
        UnderReview => &[InterviewScheduled, HrRejected],
        InterviewScheduled => &[InterviewCompleted, HrRejected],
        InterviewCompleted => &[HrApproved, HrRejected],
        _ => &[],
    };

    let admin_edges: &[ApplicationStatus] = match current {
        HrApproved => &[AdminApproved, AdminRejected],
        // reopen or close out an hr rejection
        HrRejected => &[UnderReview, AdminRejected],
        AdminApproved => &[Hired],
        _ => &[],
    };

    let mut next: BTreeSet<ApplicationStatus> = review_edges.iter().copied().collect();
    if role == ActorRole::Admin {
        next.extend(admin_edges.iter().copied());
    }
    next
}

pub fn is_transition_allowed(
    current: ApplicationStatus,
    requested: ApplicationStatus,
    role: ActorRole,
) -> bool {
    allowed_next_statuses(current, role).contains(&requested)
}

/// Statuses that sit in a role's review queue.
pub fn pending_statuses(role: ActorRole) -> &'static [ApplicationStatus] {
    match role {
        ActorRole::Hr => &[
            ApplicationStatus::Submitted,
            ApplicationStatus::UnderReview,
            ApplicationStatus::InterviewScheduled,
            ApplicationStatus::InterviewCompleted,
        ],
        ActorRole::Admin => &[ApplicationStatus::HrApproved],
    }
}
