use super::registration::{PaymentMethod, RegistrationRecord, RegistrationStatus};
use crate::config::EventDetails;
use rust_decimal::Decimal;
use serde::Serialize;

/// Record as handed to the mail relay.
///
/// Same fields as [`RegistrationRecord`] except `amount`, which is in cents
/// here, plus the `name`/`zip` aliases the relay templates use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub videophone: String,
    pub address_line: String,
    pub city: String,
    pub zip_code: String,
    pub full_address: String,
    pub church_name: String,
    pub emergency_name: String,
    pub emergency_phone: String,
    pub bunk_selection: String,
    pub youth_info: String,
    pub payment_understanding: bool,
    /// Minor units.
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    pub timestamp: i64,
    pub status: RegistrationStatus,
    pub name: String,
    pub zip: String,
}

impl From<&RegistrationRecord> for NotificationPayload {
    fn from(record: &RegistrationRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            full_name: record.full_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            videophone: record.videophone.clone(),
            address_line: record.address_line.clone(),
            city: record.city.clone(),
            zip_code: record.zip_code.clone(),
            full_address: record.full_address.clone(),
            church_name: record.church_name.clone(),
            emergency_name: record.emergency_name.clone(),
            emergency_phone: record.emergency_phone.clone(),
            bunk_selection: record.bunk_selection.clone(),
            youth_info: record.youth_info.clone(),
            payment_understanding: record.payment_understanding,
            amount: record.amount.to_minor_units(),
            payment_method: record.payment_method,
            payment_id: record.payment_id.clone(),
            timestamp: record.timestamp,
            status: record.status,
            name: record.full_name.clone(),
            zip: record.zip_code.clone(),
        }
    }
}

impl NotificationPayload {
    /// Amount back in major units, for display.
    pub fn amount_major(&self) -> Decimal {
        self.amount / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationMessage {
    pub subject: String,
    pub body: String,
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}

impl ConfirmationMessage {
    /// Message sent to the attendee.
    pub fn attendee(payload: &NotificationPayload, payment_id: &str, event: &EventDetails) -> Self {
        let body = format!(
            "Dear {name},\n\n\
             Thank you for registering for {event}!\n\n\
             Payment Amount: ${amount:.2}\n\
             Transaction ID: {payment_id}\n\
             Event Dates: {dates}\n\
             Venue: {venue}\n\
             Address: {address}\n\n\
             Please complete the RSVP form if you haven't already: {rsvp}\n\n\
             We look forward to seeing you!\n\n\
             {event} Team",
            name = payload.full_name,
            event = event.name,
            amount = payload.amount_major(),
            payment_id = payment_id,
            dates = event.dates,
            venue = event.venue,
            address = event.venue_address,
            rsvp = event.rsvp_link,
        );
        Self {
            subject: format!("{} - Registration Confirmed!", event.name),
            body,
        }
    }

    /// Copy of the registration sent to the organizers.
    pub fn organizer(payload: &NotificationPayload, payment_id: &str, event: &EventDetails) -> Self {
        let body = format!(
            "New Registration Received\n\n\
             Name: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Videophone: {}\n\
             Church: {}\n\
             Address: {}\n\
             Emergency Contact: {} ({})\n\
             Bunk Selection: {}\n\
             Youth Info: {}\n\
             Amount: ${:.2}\n\
             Payment Method: {}\n\
             Payment ID: {}\n\
             Event: {}",
            payload.full_name,
            payload.email,
            payload.phone,
            or_na(&payload.videophone),
            or_na(&payload.church_name),
            or_na(&payload.full_address),
            or_na(&payload.emergency_name),
            or_na(&payload.emergency_phone),
            or_na(&payload.bunk_selection),
            or_na(&payload.youth_info),
            payload.amount_major(),
            payload.payment_method,
            payment_id,
            event.name,
        );
        Self {
            subject: format!("New {} Registration - {}", event.name, payload.full_name),
            body,
        }
    }
}
