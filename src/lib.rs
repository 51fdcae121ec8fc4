pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::config::Config;
use crate::database::{
    application_repo::PgApplicationStore, intern_repo::PgInternDirectory, pool::create_pool,
    pool::run_migrations,
};
use crate::error::Result;
use crate::services::{
    application_store::{ApplicationStore, InMemoryApplicationStore},
    intern_directory::{InMemoryInternDirectory, InternDirectory},
    notification_service::{LogNotifier, StatusNotifier, WebhookNotifier},
    provisioning_service::ProvisioningService,
    workflow_service::WorkflowService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    InMemory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::InMemory => "in_memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub workflow_service: WorkflowService,
    pub storage: StorageBackend,
}

impl AppState {
    pub fn new(workflow_service: WorkflowService, storage: StorageBackend) -> Self {
        Self {
            workflow_service,
            storage,
        }
    }

    /// Postgres-backed when `DATABASE_URL` is set, in-memory otherwise.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let notifier = notifier_from_config(config);

        let Some(database_url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL not set; applications are kept in memory only");
            return Ok(Self::in_memory(config, notifier));
        };

        let pool = create_pool(database_url).await?;
        run_migrations(&pool).await?;

        let store: Arc<dyn ApplicationStore> = Arc::new(PgApplicationStore::new(pool.clone()));
        let directory: Arc<dyn InternDirectory> = Arc::new(PgInternDirectory::new(pool));
        let provisioning =
            ProvisioningService::new(directory, config.default_intern_password.clone());

        Ok(Self::new(
            WorkflowService::new(store, provisioning, notifier),
            StorageBackend::Postgres,
        ))
    }

    pub fn in_memory(config: &Config, notifier: Arc<dyn StatusNotifier>) -> Self {
        let provisioning = ProvisioningService::new(
            Arc::new(InMemoryInternDirectory::new()),
            config.default_intern_password.clone(),
        );
        Self::new(
            WorkflowService::new(Arc::new(InMemoryApplicationStore::new()), provisioning, notifier),
            StorageBackend::InMemory,
        )
    }
}

fn notifier_from_config(config: &Config) -> Arc<dyn StatusNotifier> {
    match &config.notification_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone(), config.webhook_secret.clone())),
        None => Arc::new(LogNotifier),
    }
}
