use super::session::SessionSlot;
use super::store::RegistrationStore;
use super::view::EmailStatus;
use crate::config::RegistrationConfig;
use crate::domain::form::FormSnapshot;
use crate::domain::notification::NotificationPayload;
use crate::domain::ports::{Notifier, NotifierHandle, PresenterHandle, SuccessView};
use crate::domain::registration::{
    Amount, PaymentMethod, RegistrationRecord, pending_payment_id,
};
use crate::domain::return_signal::ReturnSignal;
use crate::domain::validation::{Field, FieldFeedback, ValidationReport, validate_form};
use crate::error::{RegistrationError, Result};
use chrono::Utc;
use tracing::{error, info, warn};

const SESSION_SAVE_FAILED: &str =
    "We could not save your registration. Please refresh the page and try again.";
const SENDING_CONFIRMATION: &str = "Registration complete. Sending confirmation email...";
const REDIRECT_ANNOUNCEMENT: &str = "Registration complete. Redirecting to PayPal payment now.";
const RESET_ANNOUNCEMENT: &str = "Form reset. Ready for new registration.";

/// States an in-flight registration moves through.
///
/// There is no failure state: invalid input never leaves `New`, and an
/// abandoned hosted payment stays `AwaitingExternalRedirect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    New,
    Validated,
    PendingStored,
    AwaitingExternalRedirect,
    Finalizing,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub record: RegistrationRecord,
    pub email: EmailStatus,
    pub view: SuccessView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Invalid(ValidationReport),
    /// The browser should now navigate to `url`.
    Redirect {
        url: String,
        record: RegistrationRecord,
        email: EmailStatus,
    },
    Completed(Completion),
}

impl SubmissionOutcome {
    pub fn state(&self) -> RegistrationState {
        match self {
            SubmissionOutcome::Invalid(_) => RegistrationState::New,
            SubmissionOutcome::Redirect { .. } => RegistrationState::AwaitingExternalRedirect,
            SubmissionOutcome::Completed(_) => RegistrationState::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnOutcome {
    /// Nothing in the session slot; the page was loaded normally.
    NoPendingRegistration,
    /// The return carried no success signal. The registration stays pending.
    AwaitingPayment,
    Completed {
        completion: Completion,
        /// Return URL without its query string.
        cleaned_url: String,
    },
}

impl ReturnOutcome {
    pub fn state(&self) -> Option<RegistrationState> {
        match self {
            ReturnOutcome::NoPendingRegistration => None,
            ReturnOutcome::AwaitingPayment => Some(RegistrationState::AwaitingExternalRedirect),
            ReturnOutcome::Completed { .. } => Some(RegistrationState::Completed),
        }
    }
}

/// Drives a registration from form submission to a completed record.
///
/// One instance serves all three payment channels; the channel is taken from
/// the submitted form.
pub struct RegistrationOrchestrator {
    config: RegistrationConfig,
    store: RegistrationStore,
    session: SessionSlot,
    notifier: Option<NotifierHandle>,
    presenter: PresenterHandle,
}

impl RegistrationOrchestrator {
    /// Creates a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `config` - Payment link, delays and display settings.
    /// * `store` - Persistent registration list.
    /// * `session` - Slot that survives the hosted payment redirect.
    /// * `notifier` - Confirmation sender; `None` when email is not configured.
    /// * `presenter` - UI surface for status, errors and announcements.
    pub fn new(
        config: RegistrationConfig,
        store: RegistrationStore,
        session: SessionSlot,
        notifier: Option<NotifierHandle>,
        presenter: PresenterHandle,
    ) -> Self {
        Self {
            config,
            store,
            session,
            notifier,
            presenter,
        }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    pub fn store(&self) -> &RegistrationStore {
        &self.store
    }

    /// Validates `form` and starts payment through its selected channel.
    pub async fn submit<F>(&self, form: &FormSnapshot, feedback: &mut F) -> Result<SubmissionOutcome>
    where
        F: FieldFeedback + Send + ?Sized,
    {
        let report = validate_form(form, feedback);
        let method = match form.selected_method() {
            Some(method) if report.is_valid() => method,
            selected => {
                self.reject(&report, selected);
                return Ok(SubmissionOutcome::Invalid(report));
            }
        };

        let default_amount = Amount::new(self.config.default_amount)?;
        let record = form.read_registration(method, Utc::now().timestamp_millis(), default_amount);
        info!(
            state = ?RegistrationState::Validated,
            email = %record.email,
            method = %method,
            "Registration validated"
        );

        if method.redirects() {
            return self.start_hosted_payment(record).await;
        }
        let payment_id = method.payment_id(record.timestamp);
        let record = self.persist_pending(record).await;
        self.finalize(record, payment_id, false)
            .await
            .map(SubmissionOutcome::Completed)
    }

    /// Handles the browser coming back from the hosted payment page.
    pub async fn handle_return(&self, return_url: &str) -> Result<ReturnOutcome> {
        let signal = ReturnSignal::from_url(return_url)?;
        let Some(record) = self.session.load().await? else {
            return Ok(ReturnOutcome::NoPendingRegistration);
        };

        if !signal.is_success() {
            info!(email = %record.email, "Return without payment confirmation, registration stays pending");
            return Ok(ReturnOutcome::AwaitingPayment);
        }

        let payment_id = signal
            .external_payment_id()
            .map(str::to_string)
            .unwrap_or_else(|| PaymentMethod::PayPal.payment_id(record.timestamp));
        let already_notified = self.session.was_notified().await?;

        let completion = self.finalize(record, payment_id, already_notified).await?;
        Ok(ReturnOutcome::Completed {
            completion,
            cleaned_url: signal.cleaned_url(),
        })
    }

    /// Drops any in-flight registration so the form can be filled again.
    pub async fn reset(&self) -> Result<()> {
        self.session.clear().await?;
        self.presenter.announce(RESET_ANNOUNCEMENT);
        self.presenter.focus_field(Field::FirstName);
        Ok(())
    }

    /// How to pay `amount` through `method`, shown when the method is picked.
    pub fn payment_instructions(&self, method: PaymentMethod, amount: Amount) -> String {
        match method {
            PaymentMethod::PayPal => format!(
                "Complete Registration & Pay {} with PayPal. You will be redirected to {}.",
                amount, self.config.hosted_payment_url
            ),
            PaymentMethod::Zelle => format!(
                "Send {} with Zelle to {} ({}), then complete your registration.",
                amount, self.config.zelle_contact, self.config.zelle_recipient
            ),
            PaymentMethod::MoneyOrder => format!(
                "Mail a money order for {} payable to {}.",
                amount, self.config.mail_payee
            ),
        }
    }

    fn reject(&self, report: &ValidationReport, method: Option<PaymentMethod>) {
        let message = match method {
            Some(PaymentMethod::PayPal) => {
                "Please fill in all required fields correctly before proceeding to payment."
            }
            _ => "Please fill in all required fields correctly before completing registration.",
        };
        self.presenter.show_error(message);
        if let Some(announcement) = report.announcement() {
            self.presenter.announce(&announcement);
        }
        if let Some(field) = report.first_invalid() {
            self.presenter.focus_field(field);
        }
        info!(errors = report.error_count(), "Registration rejected by validation");
    }

    async fn persist_pending(&self, mut record: RegistrationRecord) -> RegistrationRecord {
        record.payment_id = Some(pending_payment_id(record.timestamp));
        if self.store.store_registration(&record).await {
            info!(state = ?RegistrationState::PendingStored, email = %record.email, "Pending registration stored");
        } else {
            warn!(email = %record.email, "Pending registration was not persisted, continuing");
        }
        record
    }

    async fn start_hosted_payment(&self, record: RegistrationRecord) -> Result<SubmissionOutcome> {
        let record = self.persist_pending(record).await;

        // Without the session copy the return from PayPal cannot be matched.
        if let Err(e) = self.session.save(&record).await {
            error!(error = %e, "Unable to save registration session data");
            self.presenter.show_error(SESSION_SAVE_FAILED);
            return Err(RegistrationError::SessionUnavailable);
        }

        self.presenter.show_status(SENDING_CONFIRMATION);
        let email = self.pre_payment_confirmation(&record).await;
        self.presenter.show_status(email.redirect_message());
        self.presenter.announce(REDIRECT_ANNOUNCEMENT);

        tokio::time::sleep(self.config.redirect_delay()).await;
        info!(
            state = ?RegistrationState::AwaitingExternalRedirect,
            email = %record.email,
            %email,
            "Redirecting to hosted payment page"
        );
        Ok(SubmissionOutcome::Redirect {
            url: self.config.hosted_payment_url.clone(),
            record,
            email,
        })
    }

    /// Sends the confirmation before leaving for PayPal, bounded by the
    /// notification timeout.
    ///
    /// The send runs as its own task. If it loses the race it keeps running and
    /// a late success still sets the session flag, so the return handler will
    /// not send a second confirmation. The flag is only set while `record` is
    /// still the registration in the session slot.
    async fn pre_payment_confirmation(&self, record: &RegistrationRecord) -> EmailStatus {
        let Some(notifier) = self.notifier.clone() else {
            warn!("Email service is not configured. Confirmation email skipped.");
            return EmailStatus::NotConfigured;
        };
        let payload = NotificationPayload::from(record);
        let payment_id = record.payment_id.clone().unwrap_or_default();
        let session = self.session.clone();
        let owner = record.clone();

        let send = tokio::spawn(async move {
            let sent = deliver(notifier.as_ref(), &payload, &payment_id).await;
            if sent {
                match session.mark_notified_for(&owner).await {
                    Ok(true) => {}
                    Ok(false) => {
                        info!(email = %owner.email, "Late confirmation belongs to a registration no longer in session")
                    }
                    Err(e) => warn!(error = %e, "Unable to record that the confirmation was sent"),
                }
            }
            sent
        });

        match tokio::time::timeout(self.config.notification_timeout(), send).await {
            Ok(Ok(sent)) => EmailStatus::from_result(sent),
            Ok(Err(e)) => {
                warn!(error = %e, "Confirmation task failed");
                EmailStatus::Failed
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.notification_timeout_ms,
                    "Confirmation email timed out, continuing to payment"
                );
                EmailStatus::TimedOut
            }
        }
    }

    async fn confirm(&self, record: &RegistrationRecord) -> EmailStatus {
        let Some(notifier) = self.notifier.as_ref() else {
            warn!("Email service is not configured. Confirmation email skipped.");
            return EmailStatus::NotConfigured;
        };
        let payload = NotificationPayload::from(record);
        let payment_id = record.payment_id.clone().unwrap_or_default();
        EmailStatus::from_result(deliver(notifier.as_ref(), &payload, &payment_id).await)
    }

    async fn finalize(
        &self,
        mut record: RegistrationRecord,
        payment_id: String,
        already_notified: bool,
    ) -> Result<Completion> {
        info!(state = ?RegistrationState::Finalizing, email = %record.email, %payment_id, "Finalizing registration");
        record.complete(payment_id)?;
        if !self.store.store_registration(&record).await {
            warn!(email = %record.email, "Completed registration was not persisted");
        }

        let email = if already_notified {
            EmailStatus::Sent
        } else {
            self.confirm(&record).await
        };

        let view = SuccessView::for_record(&record, email, &self.config.mail_payee);
        self.presenter.show_success(&view);
        self.presenter.announce(&view.announcement);

        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "Unable to clear registration session data");
        }
        info!(state = ?RegistrationState::Completed, email = %record.email, %email, "Registration completed");

        Ok(Completion {
            record,
            email,
            view,
        })
    }
}

async fn deliver(notifier: &dyn Notifier, payload: &NotificationPayload, payment_id: &str) -> bool {
    match notifier.send_confirmation(payload, payment_id).await {
        Ok(true) => true,
        Ok(false) => {
            warn!(payment_id, "Confirmation email could not be delivered");
            false
        }
        Err(e) => {
            warn!(error = %e, payment_id, "Error sending confirmation email");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::fixtures::valid_snapshot;
    use crate::domain::ports::KeyValueStorage;
    use crate::domain::registration::RegistrationStatus;
    use crate::domain::validation::FieldStates;
    use crate::infrastructure::in_memory::InMemoryStorage;
    use crate::interfaces::presenter::{PresenterEvent, RecordingPresenter};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingNotifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send_confirmation(&self, _: &NotificationPayload, _: &str) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    struct ReadOnlyStorage;

    #[async_trait]
    impl KeyValueStorage for ReadOnlyStorage {
        async fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set_item(&self, _key: &str, _value: String) -> Result<()> {
            Err(RegistrationError::Storage("session storage disabled".to_string()))
        }

        async fn remove_item(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    struct Harness {
        orchestrator: RegistrationOrchestrator,
        session: SessionSlot,
        presenter: Arc<RecordingPresenter>,
    }

    fn harness(notifier: Option<NotifierHandle>) -> Harness {
        let store = RegistrationStore::new(Arc::new(InMemoryStorage::new()));
        let session = SessionSlot::new(Arc::new(InMemoryStorage::new()));
        let presenter = Arc::new(RecordingPresenter::new());
        let orchestrator = RegistrationOrchestrator::new(
            RegistrationConfig::default(),
            store,
            session.clone(),
            notifier,
            presenter.clone(),
        );
        Harness {
            orchestrator,
            session,
            presenter,
        }
    }

    #[tokio::test]
    async fn test_invalid_form_stays_new() {
        let h = harness(None);
        let mut form = valid_snapshot(PaymentMethod::PayPal);
        form.email = "not-an-email".to_string();
        let mut fields = FieldStates::new();

        let outcome = h.orchestrator.submit(&form, &mut fields).await.unwrap();

        assert_eq!(outcome.state(), RegistrationState::New);
        assert!(fields.is_invalid(Field::Email));
        assert!(h.orchestrator.store().registrations().await.unwrap().is_empty());
        assert!(h.presenter.events().contains(&PresenterEvent::Focus(Field::Email)));
        assert!(h.presenter.events().contains(&PresenterEvent::Error(
            "Please fill in all required fields correctly before proceeding to payment."
                .to_string()
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paypal_submit_parks_in_session() {
        let notifier = Arc::new(CountingNotifier::default());
        let h = harness(Some(notifier.clone()));

        let outcome = h
            .orchestrator
            .submit(&valid_snapshot(PaymentMethod::PayPal), &mut FieldStates::new())
            .await
            .unwrap();

        let SubmissionOutcome::Redirect { url, record, email } = outcome else {
            panic!("expected redirect");
        };
        assert_eq!(url, crate::config::DEFAULT_HOSTED_PAYMENT_URL);
        assert_eq!(email, EmailStatus::Sent);
        assert_eq!(record.status, RegistrationStatus::Pending);
        assert_eq!(h.session.load().await.unwrap(), Some(record));
        assert!(h.session.was_notified().await.unwrap());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_return_does_not_resend_confirmation() {
        let notifier = Arc::new(CountingNotifier::default());
        let h = harness(Some(notifier.clone()));
        h.orchestrator
            .submit(&valid_snapshot(PaymentMethod::PayPal), &mut FieldStates::new())
            .await
            .unwrap();

        let outcome = h
            .orchestrator
            .handle_return("https://wcdmr.com/?token=abc&PayerID=123")
            .await
            .unwrap();

        let ReturnOutcome::Completed { completion, .. } = outcome else {
            panic!("expected completion");
        };
        assert_eq!(completion.email, EmailStatus::Sent);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
        assert!(h.session.load().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_save_failure_blocks_payment() {
        let notifier = Arc::new(CountingNotifier::default());
        let store = RegistrationStore::new(Arc::new(InMemoryStorage::new()));
        let presenter = Arc::new(RecordingPresenter::new());
        let orchestrator = RegistrationOrchestrator::new(
            RegistrationConfig::default(),
            store,
            SessionSlot::new(Arc::new(ReadOnlyStorage)),
            Some(notifier.clone()),
            presenter.clone(),
        );

        let result = orchestrator
            .submit(&valid_snapshot(PaymentMethod::PayPal), &mut FieldStates::new())
            .await;

        assert!(matches!(result, Err(RegistrationError::SessionUnavailable)));
        assert!(
            presenter
                .events()
                .contains(&PresenterEvent::Error(SESSION_SAVE_FAILED.to_string()))
        );
        assert!(presenter.statuses().is_empty());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_return_without_session_is_ignored() {
        let h = harness(None);
        let outcome = h
            .orchestrator
            .handle_return("https://wcdmr.com/?token=abc&PayerID=123")
            .await
            .unwrap();
        assert_eq!(outcome, ReturnOutcome::NoPendingRegistration);
        assert_eq!(outcome.state(), None);
    }

    #[tokio::test]
    async fn test_money_order_completes_without_notifier() {
        let h = harness(None);
        let outcome = h
            .orchestrator
            .submit(&valid_snapshot(PaymentMethod::MoneyOrder), &mut FieldStates::new())
            .await
            .unwrap();

        let SubmissionOutcome::Completed(completion) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(completion.email, EmailStatus::NotConfigured);
        assert_eq!(
            completion.record.payment_id,
            Some(format!("MONEY-ORDER-{}", completion.record.timestamp))
        );
        assert_eq!(completion.view.transaction_label, "Registration Reference");

        let all = h.orchestrator.store().registrations().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, RegistrationStatus::Completed);
    }

    #[tokio::test]
    async fn test_reset_clears_session() {
        let h = harness(None);
        h.session
            .save(&valid_snapshot(PaymentMethod::PayPal).read_registration(
                PaymentMethod::PayPal,
                1,
                Amount::new(rust_decimal_macros::dec!(245)).unwrap(),
            ))
            .await
            .unwrap();

        h.orchestrator.reset().await.unwrap();

        assert!(h.session.load().await.unwrap().is_none());
        assert!(h.presenter.events().contains(&PresenterEvent::Announcement(
            RESET_ANNOUNCEMENT.to_string()
        )));
    }

    #[test]
    fn test_payment_instructions_use_config() {
        let h = harness(None);
        let amount = Amount::new(rust_decimal_macros::dec!(245)).unwrap();

        let zelle = h.orchestrator.payment_instructions(PaymentMethod::Zelle, amount);
        assert!(zelle.contains("wcdmrpayments@gmail.com"));
        assert!(zelle.contains("$245.00"));

        let money_order = h
            .orchestrator
            .payment_instructions(PaymentMethod::MoneyOrder, amount);
        assert!(money_order.ends_with("payable to WCDMR."));
    }
}
