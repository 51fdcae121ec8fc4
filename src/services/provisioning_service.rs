use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, rngs::OsRng, thread_rng, Rng};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::ApplicationRecord;
use crate::models::intern::{InternAccount, NewInternAccount};
use crate::services::intern_directory::InternDirectory;

const GENERATED_PASSWORD_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisioningOutcome {
    Created(InternAccount),
    Reactivated(Uuid),
}

/// Opens (or reopens) the intern account for a hired applicant.
#[derive(Clone)]
pub struct ProvisioningService {
    directory: Arc<dyn InternDirectory>,
    fallback_password: Option<String>,
}

impl ProvisioningService {
    pub fn new(directory: Arc<dyn InternDirectory>, fallback_password: Option<String>) -> Self {
        Self {
            directory,
            fallback_password,
        }
    }

    /// `password` is the one chosen at submission, already taken off the
    /// application record.
    pub async fn provision(
        &self,
        application: &ApplicationRecord,
        password: Option<String>,
    ) -> Result<ProvisioningOutcome> {
        if let Some(existing) = self
            .directory
            .find_account_by_email(&application.email)
            .await?
        {
            self.directory
                .reactivate_account(existing.id, application.id)
                .await?;
            tracing::info!(
                application_id = %application.id,
                account_id = %existing.id,
                "Reactivated existing intern account"
            );
            return Ok(ProvisioningOutcome::Reactivated(existing.id));
        }

        let password = self.initial_password(password);
        let password_hash = hash_password(&password)?;
        let profile = application.profile();

        let account = self
            .directory
            .create_account(NewInternAccount {
                application_id: application.id,
                name: profile.name,
                email: profile.email,
                phone: profile.phone,
                university: profile.university,
                major: profile.major,
                graduation_date: profile.graduation_date,
                skills: profile.skills,
                position: profile.position,
                password_hash,
            })
            .await?;

        tracing::info!(
            application_id = %application.id,
            account_id = %account.id,
            "Created intern account"
        );
        Ok(ProvisioningOutcome::Created(account))
    }

    /// Submission password, then the configured default, then a random one.
    fn initial_password(&self, submitted: Option<String>) -> String {
        submitted
            .or_else(|| self.fallback_password.clone())
            .unwrap_or_else(|| generate_password(GENERATED_PASSWORD_LEN))
    }
}

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

fn generate_password(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
