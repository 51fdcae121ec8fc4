use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{normalize_email, ApplicationRecord};
use crate::models::status::ApplicationStatus;

/// Edit applied to a loaded record inside a single read-modify-write. An
/// `Err` aborts the write and leaves the stored record untouched.
pub type RecordMutation = Box<dyn FnOnce(&mut ApplicationRecord) -> Result<()> + Send>;

pub fn mutation<F>(f: F) -> RecordMutation
where
    F: FnOnce(&mut ApplicationRecord) -> Result<()> + Send + 'static,
{
    Box::new(f)
}

pub const DUPLICATE_EMAIL_CODE: &str = "duplicate_active_application";

pub fn duplicate_email_error() -> Error {
    Error::invalid_field(
        "email",
        DUPLICATE_EMAIL_CODE,
        "An active application with this email address already exists.",
    )
}

/// Durable home of application records.
///
/// `update_with` is the only write path after creation and must be atomic
/// per application id: concurrent calls on the same id never interleave,
/// calls on different ids may run in parallel.
#[async_trait]
pub trait ApplicationStore: Send + Sync + 'static {
    /// Stores a new record. Fails with a validation error when an active
    /// application already exists for the same email.
    async fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord>;

    async fn get(&self, id: Uuid) -> Result<Option<ApplicationRecord>>;

    /// Loads, mutates and saves one record as a unit. Fails with `NotFound`
    /// when the id is unknown.
    async fn update_with(&self, id: Uuid, mutation: RecordMutation) -> Result<ApplicationRecord>;

    async fn list_all(&self) -> Result<Vec<ApplicationRecord>>;

    async fn list_by_statuses(&self, statuses: &[ApplicationStatus]) -> Result<Vec<ApplicationRecord>>;
}

/// Lock order is record slot before email index before record map; no path
/// takes them the other way round.
#[derive(Clone, Default)]
pub struct InMemoryApplicationStore {
    records: Arc<RwLock<HashMap<Uuid, Arc<Mutex<ApplicationRecord>>>>>,
    active_emails: Arc<Mutex<HashMap<String, Uuid>>>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn snapshot(&self) -> Vec<ApplicationRecord> {
        let slots: Vec<_> = self.records.read().await.values().cloned().collect();
        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            out.push(slot.lock().await.clone());
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord> {
        let mut active = self.active_emails.lock().await;
        let key = normalize_email(&record.email);
        if record.is_active() {
            if active.contains_key(&key) {
                return Err(duplicate_email_error());
            }
            active.insert(key, record.id);
        }
        self.records
            .write()
            .await
            .insert(record.id, Arc::new(Mutex::new(record.clone())));
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApplicationRecord>> {
        let slot = self.records.read().await.get(&id).cloned();
        match slot {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn update_with(&self, id: Uuid, mutation: RecordMutation) -> Result<ApplicationRecord> {
        let slot = self
            .records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::application_not_found(id))?;

        let mut current = slot.lock().await;
        let mut draft = current.clone();
        mutation(&mut draft)?;

        if current.is_active() != draft.is_active() {
            let mut active = self.active_emails.lock().await;
            let key = normalize_email(&draft.email);
            if draft.is_active() {
                match active.get(&key) {
                    Some(owner) if *owner != id => return Err(duplicate_email_error()),
                    _ => {
                        active.insert(key, id);
                    }
                }
            } else if active.get(&key) == Some(&id) {
                active.remove(&key);
            }
        }

        *current = draft.clone();
        Ok(draft)
    }

    async fn list_all(&self) -> Result<Vec<ApplicationRecord>> {
        Ok(self.snapshot().await)
    }

    async fn list_by_statuses(&self, statuses: &[ApplicationStatus]) -> Result<Vec<ApplicationRecord>> {
        Ok(self
            .snapshot()
            .await
            .into_iter()
            .filter(|r| statuses.contains(&r.current_status))
            .collect())
    }
}
