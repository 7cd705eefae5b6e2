use crate::domain::ports::StorageHandle;
use crate::domain::registration::RegistrationRecord;
use crate::error::Result;
use tracing::warn;

/// Key holding the serialized in-flight registration.
pub const REGISTRATION_KEY: &str = "wcdmr_registration";
/// Key recording that the pre-payment confirmation already went out.
pub const EMAIL_SENT_KEY: &str = "wcdmr_registration_email_sent";

/// Tab-scoped slot carrying a registration across the hosted payment redirect.
#[derive(Clone)]
pub struct SessionSlot {
    storage: StorageHandle,
}

impl SessionSlot {
    pub fn new(storage: StorageHandle) -> Self {
        Self { storage }
    }

    /// Parks `record` as the in-flight registration. Any email-sent flag from
    /// an earlier registration is dropped.
    pub async fn save(&self, record: &RegistrationRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.storage.remove_item(EMAIL_SENT_KEY).await?;
        self.storage.set_item(REGISTRATION_KEY, raw).await
    }

    /// The in-flight registration, if any. An unreadable entry counts as none.
    pub async fn load(&self) -> Result<Option<RegistrationRecord>> {
        let Some(raw) = self.storage.get_item(REGISTRATION_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session registration");
                Ok(None)
            }
        }
    }

    pub async fn mark_notified(&self) -> Result<()> {
        self.storage.set_item(EMAIL_SENT_KEY, "1".to_string()).await
    }

    /// Sets the email-sent flag only if `record` is still the one in the slot.
    ///
    /// Returns whether the flag was set.
    pub async fn mark_notified_for(&self, record: &RegistrationRecord) -> Result<bool> {
        let current = self.load().await?;
        let is_current = current
            .is_some_and(|r| r.timestamp == record.timestamp && r.email == record.email);
        if is_current {
            self.mark_notified().await?;
        }
        Ok(is_current)
    }

    pub async fn was_notified(&self) -> Result<bool> {
        Ok(self.storage.get_item(EMAIL_SENT_KEY).await?.as_deref() == Some("1"))
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage.remove_item(REGISTRATION_KEY).await?;
        self.storage.remove_item(EMAIL_SENT_KEY).await
    }
}
