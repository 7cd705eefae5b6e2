use crate::domain::ports::SuccessView;
use crate::domain::registration::{PaymentMethod, RegistrationRecord};
use std::fmt;

/// Outcome of a confirmation-email attempt, as far as the user is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStatus {
    Sent,
    Failed,
    /// No notifier is configured.
    NotConfigured,
    /// The pre-payment send did not settle within the timeout.
    TimedOut,
}

impl EmailStatus {
    pub fn from_result(sent: bool) -> Self {
        if sent { EmailStatus::Sent } else { EmailStatus::Failed }
    }

    pub fn was_sent(&self) -> bool {
        matches!(self, EmailStatus::Sent)
    }

    /// Sentence shown with a completed registration.
    pub fn completion_sentence(&self) -> &'static str {
        match self {
            EmailStatus::Sent => "A confirmation email has been sent to your email address.",
            EmailStatus::Failed => {
                "Registration is complete, but we could not send the confirmation email. Please contact the admin team."
            }
            EmailStatus::NotConfigured => {
                "Registration is complete. Email confirmation is not configured on this page yet."
            }
            EmailStatus::TimedOut => {
                "Registration is complete, but your confirmation email may not have been confirmed yet."
            }
        }
    }

    /// Status line shown right before leaving for the hosted payment page.
    pub fn redirect_message(&self) -> &'static str {
        match self {
            EmailStatus::Sent => {
                "Registration complete. Check your email for confirmation. Redirecting to PayPal payment..."
            }
            EmailStatus::Failed => {
                "Registration complete. We could not send the confirmation email. Redirecting to PayPal payment..."
            }
            EmailStatus::NotConfigured => "Registration complete. Redirecting to PayPal payment...",
            EmailStatus::TimedOut => {
                "Registration complete. Your email may not have been confirmed yet. Redirecting to PayPal payment..."
            }
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EmailStatus::Sent => "sent",
            EmailStatus::Failed => "failed",
            EmailStatus::NotConfigured => "not configured",
            EmailStatus::TimedOut => "timed out",
        };
        f.write_str(name)
    }
}

impl SuccessView {
    pub fn for_record(record: &RegistrationRecord, email: EmailStatus, mail_payee: &str) -> Self {
        let amount = record.amount;
        let (payment_summary, summary) = match record.payment_method {
            PaymentMethod::PayPal => (
                format!("Your payment of {} has been processed successfully.", amount),
                format!("Registration successful! Payment of {} processed.", amount),
            ),
            PaymentMethod::Zelle => (
                format!(
                    "Your registration is complete. We recorded your Zelle payment of {}.",
                    amount
                ),
                format!("Registration successful. Zelle payment of {} recorded.", amount),
            ),
            PaymentMethod::MoneyOrder => (
                format!(
                    "Your registration is complete. Please mail your money order for {} to {}.",
                    amount, mail_payee
                ),
                format!(
                    "Registration successful. Please mail your money order payment of {}.",
                    amount
                ),
            ),
        };
        let transaction_label = record.payment_method.transaction_label().to_string();
        let payment_id = record
            .payment_id
            .clone()
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            announcement: format!("{} {}: {}", summary, transaction_label, payment_id),
            payment_summary,
            email_status: email.completion_sentence().to_string(),
            transaction_label,
            payment_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::fixtures::pending_record;

    #[test]
    fn test_paypal_view() {
        let mut record = pending_record("jane@x.com", 1);
        record.complete("123").unwrap();

        let view = SuccessView::for_record(&record, EmailStatus::Sent, "WCDMR");
        assert_eq!(
            view.payment_summary,
            "Your payment of $245.00 has been processed successfully."
        );
        assert_eq!(view.transaction_label, "Transaction ID");
        assert_eq!(view.payment_id, "123");
        assert_eq!(
            view.announcement,
            "Registration successful! Payment of $245.00 processed. Transaction ID: 123"
        );
        assert!(view.email_status.contains("has been sent"));
    }

    #[test]
    fn test_money_order_view() {
        let mut record = pending_record("jane@x.com", 1);
        record.payment_method = PaymentMethod::MoneyOrder;
        record.complete("MONEY-ORDER-1").unwrap();

        let view = SuccessView::for_record(&record, EmailStatus::Failed, "WCDMR");
        assert!(view.payment_summary.contains("mail your money order for $245.00 to WCDMR"));
        assert_eq!(view.transaction_label, "Registration Reference");
        assert!(view.email_status.contains("could not send"));
    }

    #[test]
    fn test_timeout_message_mentions_unconfirmed_email() {
        assert!(
            EmailStatus::TimedOut
                .redirect_message()
                .contains("email may not have been confirmed")
        );
        assert!(!EmailStatus::NotConfigured.was_sent());
        assert_eq!(EmailStatus::from_result(true), EmailStatus::Sent);
    }
}
