use std::env;

use chrono::Utc;
use intern_portal_backend::{
    database::{
        application_repo::PgApplicationStore,
        intern_repo::PgInternDirectory,
        pool::{create_pool, run_migrations},
    },
    error::Error,
    models::{
        application::{ApplicantProfile, ApplicationRecord},
        intern::{InternAccountStatus, NewInternAccount},
        status::{ActorRole, ApplicationStatus},
    },
    services::{
        application_store::{mutation, ApplicationStore, DUPLICATE_EMAIL_CODE},
        intern_directory::InternDirectory,
        workflow_service::advance,
    },
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Connects to `DATABASE_URL` and migrates; `None` skips the test.
async fn test_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Some(url) = env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty()) else {
        eprintln!("DATABASE_URL not set; skipping Postgres test");
        return None;
    };
    let pool = create_pool(&url).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    Some(pool)
}

fn unique_email() -> String {
    format!("it_{}@example.com", Uuid::new_v4().simple())
}

fn application(email: &str) -> ApplicationRecord {
    ApplicationRecord::submitted(
        ApplicantProfile {
            name: "Integration Applicant".into(),
            email: email.into(),
            phone: "+1 555 0100".into(),
            university: "State University".into(),
            major: "Computer Science".into(),
            graduation_date: None,
            skills: vec!["rust".into(), "sql".into()],
            position: "Backend Intern".into(),
        },
        Some(json!({ "originalPassword": "hunter2" })),
        Utc::now(),
    )
}

async fn move_to(
    store: &PgApplicationStore,
    id: Uuid,
    status: ApplicationStatus,
    role: ActorRole,
) -> Result<ApplicationRecord, Error> {
    store
        .update_with(
            id,
            mutation(move |record| {
                advance(record, status, "Integration", role, Some("it".into()), None, Utc::now())
                    .map(|_| ())
            }),
        )
        .await
}

fn is_duplicate_email(err: &Error) -> bool {
    match err {
        Error::Validation(errors) => errors
            .field_errors()
            .get("email")
            .map(|errs| errs.iter().any(|e| e.code == DUPLICATE_EMAIL_CODE))
            .unwrap_or(false),
        _ => false,
    }
}

#[tokio::test]
async fn active_email_is_unique_until_rejected() {
    let Some(pool) = test_pool().await else { return };
    let store = PgApplicationStore::new(pool);
    let email = unique_email();

    let first = store.insert(application(&email)).await.expect("insert");
    let fetched = store.get(first.id).await.expect("get").expect("stored");
    assert_eq!(fetched.current_status, ApplicationStatus::Submitted);
    assert_eq!(fetched.workflow.len(), 1);
    assert_eq!(fetched.skills, vec!["rust".to_string(), "sql".to_string()]);

    let err = store
        .insert(application(&email.to_uppercase()))
        .await
        .unwrap_err();
    assert!(is_duplicate_email(&err), "unexpected error: {err:?}");

    move_to(&store, first.id, ApplicationStatus::HrRejected, ActorRole::Hr)
        .await
        .expect("reject");
    let second = store.insert(application(&email)).await.expect("resubmit");

    let err = move_to(&store, first.id, ApplicationStatus::UnderReview, ActorRole::Admin)
        .await
        .unwrap_err();
    assert!(is_duplicate_email(&err), "unexpected error: {err:?}");

    let first = store.get(first.id).await.unwrap().unwrap();
    assert_eq!(first.current_status, ApplicationStatus::HrRejected);
    assert_eq!(first.rejection_reason.as_deref(), Some("it"));
    assert_eq!(first.workflow.len(), 2);

    let submitted = store
        .list_by_statuses(&[ApplicationStatus::Submitted])
        .await
        .unwrap();
    assert!(submitted.iter().any(|app| app.id == second.id));
    assert!(submitted.iter().all(|app| app.id != first.id));
}

#[tokio::test]
async fn failed_mutation_rolls_back() {
    let Some(pool) = test_pool().await else { return };
    let store = PgApplicationStore::new(pool);
    let created = store.insert(application(&unique_email())).await.unwrap();

    let err = store
        .update_with(
            created.id,
            mutation(|record| {
                record.hr_reviewer = Some("Half-applied".into());
                Err(Error::Internal("abort".into()))
            }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Internal(_)));

    let err = move_to(&store, created.id, ApplicationStatus::Hired, ActorRole::Hr)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));

    let stored = store.get(created.id).await.unwrap().unwrap();
    assert!(stored.hr_reviewer.is_none());
    assert_eq!(stored.current_status, ApplicationStatus::Submitted);
    assert_eq!(stored.workflow.len(), 1);

    let err = move_to(&store, Uuid::new_v4(), ApplicationStatus::UnderReview, ActorRole::Hr)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn locked_updates_on_one_application_do_not_interleave() {
    let Some(pool) = test_pool().await else { return };
    let store = PgApplicationStore::new(pool);
    let created = store.insert(application(&unique_email())).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            move_to(&store, created.id, ApplicationStatus::UnderReview, ActorRole::Hr).await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(Error::InvalidTransition { current, .. }) => {
                assert_eq!(current, ApplicationStatus::UnderReview)
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(ok, 1);

    let stored = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(stored.workflow.len(), 2);
    assert_eq!(stored.current_status, stored.workflow.last().unwrap().status);
}

#[tokio::test]
async fn hire_clears_submission_password_in_database() {
    let Some(pool) = test_pool().await else { return };
    let store = PgApplicationStore::new(pool);
    let created = store.insert(application(&unique_email())).await.unwrap();

    for (status, role) in [
        (ApplicationStatus::UnderReview, ActorRole::Hr),
        (ApplicationStatus::InterviewScheduled, ActorRole::Hr),
        (ApplicationStatus::InterviewCompleted, ActorRole::Hr),
        (ApplicationStatus::HrApproved, ActorRole::Hr),
        (ApplicationStatus::AdminApproved, ActorRole::Admin),
    ] {
        move_to(&store, created.id, status, role).await.unwrap();
    }

    let stored = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(stored.current_status, ApplicationStatus::Hired);
    assert_eq!(stored.metadata, Some(json!({})));
}

#[tokio::test]
async fn intern_account_is_created_then_reactivated() {
    let Some(pool) = test_pool().await else { return };
    let directory = PgInternDirectory::new(pool.clone());
    let email = unique_email();
    let first_application = Uuid::new_v4();
    let second_application = Uuid::new_v4();

    let created = directory
        .create_account(NewInternAccount {
            application_id: first_application,
            name: "Integration Intern".into(),
            email: email.clone(),
            phone: "555".into(),
            university: "State University".into(),
            major: "Physics".into(),
            graduation_date: None,
            skills: vec!["python".into()],
            position: "Research Intern".into(),
            password_hash: "hash".into(),
        })
        .await
        .expect("create account");
    assert_eq!(created.status, InternAccountStatus::Active);
    assert_eq!(created.application_history, vec![first_application]);

    sqlx::query("UPDATE intern_accounts SET status = 'inactive' WHERE id = $1")
        .bind(created.id)
        .execute(&pool)
        .await
        .unwrap();

    let found = directory
        .find_account_by_email(&format!(" {} ", email.to_uppercase()))
        .await
        .unwrap()
        .expect("found by email");
    assert_eq!(found.id, created.id);
    assert_eq!(found.status, InternAccountStatus::Inactive);

    directory
        .reactivate_account(created.id, second_application)
        .await
        .unwrap();
    directory
        .reactivate_account(created.id, second_application)
        .await
        .unwrap();

    let reactivated = directory.find_account_by_email(&email).await.unwrap().unwrap();
    assert_eq!(reactivated.status, InternAccountStatus::Active);
    assert_eq!(
        reactivated.application_history,
        vec![first_application, second_application]
    );

    let err = directory
        .reactivate_account(Uuid::new_v4(), second_application)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
