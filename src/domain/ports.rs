use super::notification::NotificationPayload;
use super::validation::Field;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// String key/value storage with browser `Storage` semantics.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: String) -> Result<()>;
    async fn remove_item(&self, key: &str) -> Result<()>;
}

pub type StorageHandle = Arc<dyn KeyValueStorage>;

/// Sends the registration confirmation.
///
/// `Ok(false)` and `Err(_)` are both soft failures; callers never undo a
/// registration because of them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_confirmation(
        &self,
        payload: &NotificationPayload,
        payment_id: &str,
    ) -> Result<bool>;
}

pub type NotifierHandle = Arc<dyn Notifier>;

/// What the user gets to see once a registration is completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessView {
    pub payment_summary: String,
    pub email_status: String,
    pub transaction_label: String,
    pub payment_id: String,
    /// Text for the screen-reader live region.
    pub announcement: String,
}

/// The UI surface the workflow talks to.
pub trait Presenter: Send + Sync {
    fn show_status(&self, message: &str);
    fn show_error(&self, message: &str);
    /// Screen-reader announcement.
    fn announce(&self, message: &str);
    fn focus_field(&self, field: Field);
    fn show_success(&self, view: &SuccessView);
}

pub type PresenterHandle = Arc<dyn Presenter>;
