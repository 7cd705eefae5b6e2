use crate::error::{RegistrationError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A positive registration fee in major units (dollars).
///
/// Conversion to minor units only happens at the notification boundary, see
/// [`Amount::to_minor_units`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// A positive value whose minor-unit form still fits in a `Decimal`.
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(RegistrationError::Validation(
                "Amount must be positive".to_string(),
            ));
        }
        if value.checked_mul(Decimal::ONE_HUNDRED).is_none() {
            return Err(RegistrationError::Validation(
                "Amount is too large".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Cents, as expected by the mail relay.
    pub fn to_minor_units(&self) -> Decimal {
        self.0.saturating_mul(Decimal::ONE_HUNDRED)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = RegistrationError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// The closed set of payment channels offered on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Hosted payment link; the browser leaves the site and comes back.
    #[serde(rename = "paypal")]
    PayPal,
    /// Peer transfer, reconciled by the organizers by hand.
    Zelle,
    /// Mailed money order, recorded optimistically.
    MoneyOrder,
}

impl PaymentMethod {
    /// Prefix used when the payment id is derived from the timestamp.
    pub fn payment_id_tag(&self) -> &'static str {
        match self {
            PaymentMethod::PayPal => "PAYPAL",
            PaymentMethod::Zelle => "ZELLE",
            PaymentMethod::MoneyOrder => "MONEY-ORDER",
        }
    }

    pub fn payment_id(&self, timestamp: i64) -> String {
        format!("{}-{}", self.payment_id_tag(), timestamp)
    }

    pub fn transaction_label(&self) -> &'static str {
        match self {
            PaymentMethod::MoneyOrder => "Registration Reference",
            PaymentMethod::PayPal | PaymentMethod::Zelle => "Transaction ID",
        }
    }

    /// Whether completing this channel leaves the site.
    pub fn redirects(&self) -> bool {
        matches!(self, PaymentMethod::PayPal)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::Zelle => "zelle",
            PaymentMethod::MoneyOrder => "money_order",
        };
        f.write_str(name)
    }
}

pub fn pending_payment_id(timestamp: i64) -> String {
    format!("PENDING-{}", timestamp)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Completed,
}

/// One attendee registration, as persisted in client storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    /// Lookup key when a pending registration is finalized.
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub videophone: String,
    pub address_line: String,
    pub city: String,
    pub zip_code: String,
    pub full_address: String,
    pub church_name: String,
    pub emergency_name: String,
    pub emergency_phone: String,
    /// Checked bunk options joined with `", "`.
    pub bunk_selection: String,
    #[serde(default)]
    pub youth_info: String,
    pub payment_understanding: bool,
    pub amount: Amount,
    pub payment_method: PaymentMethod,
    /// Assigned when the record is persisted as pending or finalized.
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Creation instant, epoch milliseconds.
    pub timestamp: i64,
    pub status: RegistrationStatus,
}

impl RegistrationRecord {
    pub fn is_pending(&self) -> bool {
        self.status == RegistrationStatus::Pending
    }

    /// Moves the record from `pending` to `completed`. Only allowed once.
    pub fn complete(&mut self, payment_id: impl Into<String>) -> Result<()> {
        if self.status == RegistrationStatus::Completed {
            return Err(RegistrationError::AlreadyCompleted(self.email.clone()));
        }
        self.payment_id = Some(payment_id.into());
        self.status = RegistrationStatus::Completed;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal_macros::dec;

    pub fn pending_record(email: &str, timestamp: i64) -> RegistrationRecord {
        RegistrationRecord {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            full_name: "Jane Doe".to_string(),
            email: email.to_string(),
            phone: "555-123-4567".to_string(),
            videophone: String::new(),
            address_line: "12 Pine Street".to_string(),
            city: "Twin Peaks".to_string(),
            zip_code: "92391".to_string(),
            full_address: "12 Pine Street, Twin Peaks, 92391".to_string(),
            church_name: "Grace Chapel".to_string(),
            emergency_name: "John Doe".to_string(),
            emergency_phone: "(555) 987-6543".to_string(),
            bunk_selection: "Lower bunk".to_string(),
            youth_info: String::new(),
            payment_understanding: true,
            amount: Amount::new(dec!(245)).unwrap(),
            payment_method: PaymentMethod::PayPal,
            payment_id: Some(pending_payment_id(timestamp)),
            timestamp,
            status: RegistrationStatus::Pending,
        }
    }
}
