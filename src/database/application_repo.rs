use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{ApplicationRecord, WorkflowStep};
use crate::models::status::ApplicationStatus;
use crate::services::application_store::{duplicate_email_error, ApplicationStore, RecordMutation};

const ACTIVE_EMAIL_CONSTRAINT: &str = "uq_applications_active_email";

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, email, phone, university, major, graduation_date, skills, position,
           current_status, workflow, interview_date, interview_type, interview_feedback,
           interview_rating, hr_reviewer, admin_reviewer, rejection_reason, metadata,
           created_at, updated_at
    FROM applications
"#;

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    university: String,
    major: String,
    graduation_date: Option<NaiveDate>,
    skills: Json<Vec<String>>,
    position: String,
    current_status: String,
    workflow: Json<Vec<WorkflowStep>>,
    interview_date: Option<DateTime<Utc>>,
    interview_type: Option<String>,
    interview_feedback: Option<String>,
    interview_rating: Option<i32>,
    hr_reviewer: Option<String>,
    admin_reviewer: Option<String>,
    rejection_reason: Option<String>,
    metadata: Option<JsonValue>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for ApplicationRecord {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        let current_status: ApplicationStatus = row.current_status.parse().map_err(Error::Internal)?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            university: row.university,
            major: row.major,
            graduation_date: row.graduation_date,
            skills: row.skills.0,
            position: row.position,
            current_status,
            workflow: row.workflow.0,
            interview_date: row.interview_date,
            interview_type: row.interview_type,
            interview_feedback: row.interview_feedback,
            interview_rating: row.interview_rating,
            hr_reviewer: row.hr_reviewer,
            admin_reviewer: row.admin_reviewer,
            rejection_reason: row.rejection_reason,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_write_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.constraint() == Some(ACTIVE_EMAIL_CONSTRAINT) {
            return duplicate_email_error();
        }
    }
    Error::from(err)
}

#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, clause: &str, statuses: Option<Vec<String>>) -> Result<Vec<ApplicationRecord>> {
        let sql = format!("{} {} ORDER BY created_at DESC", SELECT_COLUMNS, clause);
        let mut query = sqlx::query_as::<_, ApplicationRow>(&sql);
        if let Some(statuses) = statuses {
            query = query.bind(statuses);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(ApplicationRecord::try_from).collect()
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, name, email, phone, university, major, graduation_date, skills, position,
                current_status, workflow, interview_date, interview_type, interview_feedback,
                interview_rating, hr_reviewer, admin_reviewer, rejection_reason, metadata,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.university)
        .bind(&record.major)
        .bind(record.graduation_date)
        .bind(Json(&record.skills))
        .bind(&record.position)
        .bind(record.current_status.as_str())
        .bind(Json(&record.workflow))
        .bind(record.interview_date)
        .bind(&record.interview_type)
        .bind(&record.interview_feedback)
        .bind(record.interview_rating)
        .bind(&record.hr_reviewer)
        .bind(&record.admin_reviewer)
        .bind(&record.rejection_reason)
        .bind(&record.metadata)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApplicationRecord>> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ApplicationRecord::try_from).transpose()
    }

    async fn update_with(&self, id: Uuid, mutation: RecordMutation) -> Result<ApplicationRecord> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{} WHERE id = $1 FOR UPDATE", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(Error::application_not_found(id));
        };

        let mut record = ApplicationRecord::try_from(row)?;
        // dropping `tx` on error rolls the transaction back
        mutation(&mut record)?;

        sqlx::query::<Postgres>(
            r#"
            UPDATE applications
            SET current_status = $1, workflow = $2, interview_date = $3, interview_type = $4,
                interview_feedback = $5, interview_rating = $6, hr_reviewer = $7,
                admin_reviewer = $8, rejection_reason = $9, metadata = $10, updated_at = $11
            WHERE id = $12
            "#,
        )
        .bind(record.current_status.as_str())
        .bind(Json(&record.workflow))
        .bind(record.interview_date)
        .bind(&record.interview_type)
        .bind(&record.interview_feedback)
        .bind(record.interview_rating)
        .bind(&record.hr_reviewer)
        .bind(&record.admin_reviewer)
        .bind(&record.rejection_reason)
        .bind(&record.metadata)
        .bind(record.updated_at)
        .bind(record.id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<ApplicationRecord>> {
        self.fetch_where("", None).await
    }

    async fn list_by_statuses(&self, statuses: &[ApplicationStatus]) -> Result<Vec<ApplicationRecord>> {
        let statuses = statuses.iter().map(|s| s.as_str().to_string()).collect();
        self.fetch_where("WHERE current_status = ANY($1)", Some(statuses))
            .await
    }
}
