#![allow(dead_code)]

use async_trait::async_trait;
use retreat_registration::application::orchestrator::RegistrationOrchestrator;
use retreat_registration::application::session::SessionSlot;
use retreat_registration::application::store::RegistrationStore;
use retreat_registration::config::RegistrationConfig;
use retreat_registration::domain::form::FormSnapshot;
use retreat_registration::domain::notification::NotificationPayload;
use retreat_registration::domain::ports::{Notifier, NotifierHandle};
use retreat_registration::error::{RegistrationError, Result};
use retreat_registration::infrastructure::in_memory::InMemoryStorage;
use retreat_registration::interfaces::presenter::RecordingPresenter;
use serde_json::{Value, json};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;

pub fn form_json(email: &str, method: &str) -> Value {
    json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "email": email,
        "phone": "555-123-4567",
        "addressLine": "12 Pine Street",
        "city": "Twin Peaks",
        "zipCode": "92391",
        "churchName": "Grace Chapel",
        "emergencyName": "John Doe",
        "emergencyPhone": "(555) 987-6543",
        "bunkOptions": ["Lower bunk"],
        "paymentUnderstanding": true,
        "paymentMethods": [method],
        "amount": "245"
    })
}

pub fn form(email: &str, method: &str) -> FormSnapshot {
    serde_json::from_value(form_json(email, method)).unwrap()
}

pub fn write_form(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file
}

/// How a [`ScriptedNotifier`] answers.
#[derive(Clone, Copy)]
pub enum Reply {
    Delivered,
    Rejected,
    Errors,
    /// Succeeds after the given delay.
    DeliveredAfter(Duration),
    /// Never resolves.
    Hangs,
}

pub struct ScriptedNotifier {
    reply: Reply,
    calls: AtomicUsize,
}

impl ScriptedNotifier {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn send_confirmation(&self, _: &NotificationPayload, _: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Reply::Delivered => Ok(true),
            Reply::Rejected => Ok(false),
            Reply::Errors => Err(RegistrationError::Storage("relay offline".to_string())),
            Reply::DeliveredAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(true)
            }
            Reply::Hangs => std::future::pending().await,
        }
    }
}

pub struct Workflow {
    pub orchestrator: RegistrationOrchestrator,
    pub persistent: Arc<InMemoryStorage>,
    pub session: SessionSlot,
    pub presenter: Arc<RecordingPresenter>,
}

pub fn workflow(notifier: Option<NotifierHandle>) -> Workflow {
    workflow_with(RegistrationConfig::default(), notifier)
}

pub fn workflow_with(config: RegistrationConfig, notifier: Option<NotifierHandle>) -> Workflow {
    let persistent = Arc::new(InMemoryStorage::new());
    let store = RegistrationStore::with_capacity(persistent.clone(), config.max_records);
    let session = SessionSlot::new(Arc::new(InMemoryStorage::new()));
    let presenter = Arc::new(RecordingPresenter::new());
    let orchestrator =
        RegistrationOrchestrator::new(config, store, session.clone(), notifier, presenter.clone());
    Workflow {
        orchestrator,
        persistent,
        session,
        presenter,
    }
}
