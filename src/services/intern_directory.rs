use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::normalize_email;
use crate::models::intern::{InternAccount, InternAccountStatus, NewInternAccount};

/// Intern accounts, keyed by email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InternDirectory: Send + Sync + 'static {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<InternAccount>>;

    async fn create_account(&self, account: NewInternAccount) -> Result<InternAccount>;

    /// Marks the account active and records `application_id` in its history.
    async fn reactivate_account(&self, id: Uuid, application_id: Uuid) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct InMemoryInternDirectory {
    accounts: Arc<RwLock<HashMap<Uuid, InternAccount>>>,
}

impl InMemoryInternDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn accounts(&self) -> Vec<InternAccount> {
        self.accounts.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl InternDirectory for InMemoryInternDirectory {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<InternAccount>> {
        let key = normalize_email(email);
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| normalize_email(&a.email) == key)
            .cloned())
    }

    async fn create_account(&self, account: NewInternAccount) -> Result<InternAccount> {
        let mut accounts = self.accounts.write().await;
        let key = normalize_email(&account.email);
        if accounts.values().any(|a| normalize_email(&a.email) == key) {
            return Err(Error::BadRequest(format!(
                "An intern account for {} already exists",
                account.email
            )));
        }

        let now = Utc::now();
        let created = InternAccount {
            id: Uuid::new_v4(),
            name: account.name,
            email: account.email,
            phone: account.phone,
            university: account.university,
            major: account.major,
            graduation_date: account.graduation_date,
            skills: account.skills,
            position: account.position,
            password_hash: account.password_hash,
            status: InternAccountStatus::Active,
            application_history: vec![account.application_id],
            created_at: now,
            updated_at: now,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn reactivate_account(&self, id: Uuid, application_id: Uuid) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Intern account {} not found", id)))?;
        account.status = InternAccountStatus::Active;
        if !account.application_history.contains(&application_id) {
            account.application_history.push(application_id);
        }
        account.updated_at = Utc::now();
        Ok(())
    }
}
