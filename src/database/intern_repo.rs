use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::intern::{InternAccount, InternAccountStatus, NewInternAccount};
use crate::services::intern_directory::InternDirectory;

#[derive(Debug, FromRow)]
struct InternAccountRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    university: String,
    major: String,
    graduation_date: Option<NaiveDate>,
    skills: Json<Vec<String>>,
    position: String,
    password_hash: String,
    status: String,
    application_history: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InternAccountRow> for InternAccount {
    fn from(row: InternAccountRow) -> Self {
        let status = if row.status == InternAccountStatus::Active.as_str() {
            InternAccountStatus::Active
        } else {
            InternAccountStatus::Inactive
        };
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            university: row.university,
            major: row.major,
            graduation_date: row.graduation_date,
            skills: row.skills.0,
            position: row.position,
            password_hash: row.password_hash,
            status,
            application_history: row.application_history,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgInternDirectory {
    pool: PgPool,
}

impl PgInternDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InternDirectory for PgInternDirectory {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<InternAccount>> {
        let row = sqlx::query_as::<_, InternAccountRow>(
            r#"
            SELECT id, name, email, phone, university, major, graduation_date, skills, position,
                   password_hash, status, application_history, created_at, updated_at
            FROM intern_accounts
            WHERE LOWER(TRIM(email)) = LOWER(TRIM($1))
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(InternAccount::from))
    }

    async fn create_account(&self, account: NewInternAccount) -> Result<InternAccount> {
        let row = sqlx::query_as::<_, InternAccountRow>(
            r#"
            INSERT INTO intern_accounts (
                id, name, email, phone, university, major, graduation_date, skills, position,
                password_hash, status, application_history
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, ARRAY[$12]::uuid[])
            RETURNING id, name, email, phone, university, major, graduation_date, skills, position,
                      password_hash, status, application_history, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.university)
        .bind(&account.major)
        .bind(account.graduation_date)
        .bind(Json(&account.skills))
        .bind(&account.position)
        .bind(&account.password_hash)
        .bind(InternAccountStatus::Active.as_str())
        .bind(account.application_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn reactivate_account(&self, id: Uuid, application_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE intern_accounts
            SET status = $1,
                application_history = CASE
                    WHEN $2 = ANY(application_history) THEN application_history
                    ELSE array_append(application_history, $2)
                END,
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(InternAccountStatus::Active.as_str())
        .bind(application_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Intern account {} not found", id)));
        }
        Ok(())
    }
}
