//! Runtime configuration for the registration workflow.
//!
//! Every value the page used to hard-code (payment link, Zelle contact, delays,
//! event details) lives here and is injected into the orchestrator at
//! construction. All fields have defaults, so a config file only needs to list
//! what it overrides.

use crate::error::{RegistrationError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HOSTED_PAYMENT_URL: &str = "https://www.paypal.com/ncp/payment/LNMQ6S8HZWP5C";

/// Details about the retreat itself, used in confirmation messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventDetails {
    pub name: String,
    pub dates: String,
    pub venue: String,
    pub venue_address: String,
    pub rsvp_link: String,
}

impl Default for EventDetails {
    fn default() -> Self {
        Self {
            name: "WCDMR 2026".to_string(),
            dates: "November 6-8, 2026".to_string(),
            venue: "Pine Crest Camp, Twin Peaks, CA".to_string(),
            venue_address: "1140 PINECREST ROAD, TWIN PEAKS, CA 92361".to_string(),
            rsvp_link: "https://forms.gle/qaW22U9mB2C1hGx86".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Fixed hosted payment page the PayPal channel redirects to.
    pub hosted_payment_url: String,
    pub zelle_contact: String,
    pub zelle_recipient: String,
    /// Payee named in the money-order instructions.
    pub mail_payee: String,
    /// Organizer address that receives a copy of every registration.
    pub admin_email: Option<String>,
    /// Mail relay endpoint. When absent, confirmations are not configured.
    pub relay_url: Option<String>,
    pub default_amount: Decimal,
    pub redirect_delay_ms: u64,
    pub notification_timeout_ms: u64,
    pub max_records: usize,
    pub event: EventDetails,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            hosted_payment_url: DEFAULT_HOSTED_PAYMENT_URL.to_string(),
            zelle_contact: "wcdmrpayments@gmail.com".to_string(),
            zelle_recipient: "WEST COAST DEAF MEN'S RETREAT".to_string(),
            mail_payee: "WCDMR".to_string(),
            admin_email: Some("wcdeafmr@gmail.com".to_string()),
            relay_url: None,
            default_amount: dec!(245.00),
            redirect_delay_ms: 1200,
            notification_timeout_ms: 2500,
            max_records: 100,
            event: EventDetails::default(),
        }
    }
}

impl RegistrationConfig {
    /// Loads a JSON config file; missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| RegistrationError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(RegistrationError::Config(
                "max_records must be at least 1".to_string(),
            ));
        }
        if self.default_amount <= Decimal::ZERO {
            return Err(RegistrationError::Config(
                "default_amount must be positive".to_string(),
            ));
        }
        url::Url::parse(&self.hosted_payment_url)
            .map_err(|e| RegistrationError::Config(format!("hosted_payment_url: {}", e)))?;
        Ok(())
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }
}
