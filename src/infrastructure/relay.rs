use crate::config::EventDetails;
use crate::domain::notification::{ConfirmationMessage, NotificationPayload};
use crate::domain::ports::Notifier;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

/// Request body accepted by the serverless mail relay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    to: &'a str,
    to_name: &'a str,
    subject: &'a str,
    template: &'a str,
    text: &'a str,
    payment_id: &'a str,
    data: &'a NotificationPayload,
}

/// Sends confirmations through an HTTP mail relay.
///
/// The attendee confirmation goes first, then the organizer copy when an admin
/// address is configured. Delivery counts as successful if either one is
/// accepted.
#[derive(Clone, Debug)]
pub struct RelayNotifier {
    client: Client,
    endpoint: String,
    admin_email: Option<String>,
    event: EventDetails,
}

impl RelayNotifier {
    pub fn new(
        endpoint: impl Into<String>,
        admin_email: Option<String>,
        event: EventDetails,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            admin_email,
            event,
        })
    }

    async fn post(&self, request: &RelayRequest<'_>) -> bool {
        match self.client.post(&self.endpoint).json(request).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = %response.status(), to = request.to, "Mail relay rejected message");
                false
            }
            Err(e) => {
                warn!(error = %e, to = request.to, "Mail relay request failed");
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    async fn send_confirmation(
        &self,
        payload: &NotificationPayload,
        payment_id: &str,
    ) -> Result<bool> {
        let attendee = ConfirmationMessage::attendee(payload, payment_id, &self.event);
        let attendee_sent = self
            .post(&RelayRequest {
                to: &payload.email,
                to_name: &payload.full_name,
                subject: &attendee.subject,
                template: "confirmation",
                text: &attendee.body,
                payment_id,
                data: payload,
            })
            .await;

        let mut organizer_sent = false;
        if let Some(admin_email) = self.admin_email.as_deref() {
            let organizer = ConfirmationMessage::organizer(payload, payment_id, &self.event);
            organizer_sent = self
                .post(&RelayRequest {
                    to: admin_email,
                    to_name: "Registration Team",
                    subject: &organizer.subject,
                    template: "admin-notification",
                    text: &organizer.body,
                    payment_id,
                    data: payload,
                })
                .await;
        }

        info!(attendee_sent, organizer_sent, payment_id, "Email delivery results");
        Ok(attendee_sent || organizer_sent)
    }
}
