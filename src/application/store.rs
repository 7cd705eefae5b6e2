use crate::domain::ports::StorageHandle;
use crate::domain::registration::RegistrationRecord;
use crate::error::Result;
use tracing::{debug, error};

/// Storage key holding the retained registrations as a JSON array.
pub const REGISTRATIONS_KEY: &str = "wcdmr_registrations";
pub const DEFAULT_MAX_RECORDS: usize = 100;

/// Bounded, ordered list of registrations in persistent storage.
///
/// A pending record is finalized by writing a record with the same email:
/// the first pending entry for that email is replaced in place. Two pending
/// registrations sharing one inbox cannot be told apart.
#[derive(Clone)]
pub struct RegistrationStore {
    storage: StorageHandle,
    max_records: usize,
}

impl RegistrationStore {
    pub fn new(storage: StorageHandle) -> Self {
        Self::with_capacity(storage, DEFAULT_MAX_RECORDS)
    }

    pub fn with_capacity(storage: StorageHandle, max_records: usize) -> Self {
        Self {
            storage,
            max_records: max_records.max(1),
        }
    }

    /// All retained registrations, oldest first.
    pub async fn registrations(&self) -> Result<Vec<RegistrationRecord>> {
        match self.storage.get_item(REGISTRATIONS_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn find_pending(&self, email: &str) -> Result<Option<RegistrationRecord>> {
        Ok(self
            .registrations()
            .await?
            .into_iter()
            .find(|r| r.email == email && r.is_pending()))
    }

    /// Inserts or finalizes `record`, then trims to the most recent entries.
    ///
    /// Storage failures are logged and reported as `false`; the workflow keeps
    /// going toward payment either way.
    pub async fn store_registration(&self, record: &RegistrationRecord) -> bool {
        match self.try_store(record).await {
            Ok(()) => {
                debug!(email = %record.email, status = ?record.status, "Registration stored");
                true
            }
            Err(e) => {
                error!(error = %e, email = %record.email, "Unable to store registration");
                false
            }
        }
    }

    async fn try_store(&self, record: &RegistrationRecord) -> Result<()> {
        let mut registrations = self.registrations().await?;

        match registrations
            .iter()
            .position(|r| r.email == record.email && r.is_pending())
        {
            Some(index) => registrations[index] = record.clone(),
            None => registrations.push(record.clone()),
        }

        if registrations.len() > self.max_records {
            let excess = registrations.len() - self.max_records;
            registrations.drain(..excess);
        }

        let raw = serde_json::to_string(&registrations)?;
        self.storage.set_item(REGISTRATIONS_KEY, raw).await
    }
}
