//! Field rules for the registration form.
//!
//! Every rule is a pure predicate over the trimmed field value. `validate_form`
//! runs all of them (no short-circuit) and reports each outcome through a
//! [`FieldFeedback`] so the caller can flag or clear the field.

use super::form::FormSnapshot;
use super::registration::Amount;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// Form fields that carry a validation rule, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    AddressLine,
    City,
    ZipCode,
    ChurchName,
    EmergencyName,
    EmergencyPhone,
    BunkSelection,
    PaymentUnderstanding,
    PaymentMethod,
    Amount,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::AddressLine,
        Field::City,
        Field::ZipCode,
        Field::ChurchName,
        Field::EmergencyName,
        Field::EmergencyPhone,
        Field::BunkSelection,
        Field::PaymentUnderstanding,
        Field::PaymentMethod,
        Field::Amount,
    ];

    /// Element id of the field on the page.
    pub fn id(&self) -> &'static str {
        match self {
            Field::FirstName => "first-name",
            Field::LastName => "last-name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::AddressLine => "address-line",
            Field::City => "city",
            Field::ZipCode => "zip-code",
            Field::ChurchName => "church-name",
            Field::EmergencyName => "emergency-name",
            Field::EmergencyPhone => "emergency-phone",
            Field::BunkSelection => "bunk-selection",
            Field::PaymentUnderstanding => "payment-understanding",
            Field::PaymentMethod => "payment-method",
            Field::Amount => "amount",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Field::FirstName => "Please enter your first name",
            Field::LastName => "Please enter your last name",
            Field::Email => "Please enter a valid email address",
            Field::Phone => "Please enter a valid phone number",
            Field::AddressLine => "Please enter your street address",
            Field::City => "Please enter your city",
            Field::ZipCode => "Please enter a valid ZIP code",
            Field::ChurchName => "Please enter your church name",
            Field::EmergencyName => "Please enter emergency contact name",
            Field::EmergencyPhone => "Please enter emergency contact phone number",
            Field::BunkSelection => "Please select at least one bunk option",
            Field::PaymentUnderstanding => "Please confirm payment understanding",
            Field::PaymentMethod => "Please select a payment method",
            Field::Amount => "Please enter a valid amount",
        }
    }

    pub fn is_valid(&self, form: &FormSnapshot) -> bool {
        match self {
            Field::FirstName => is_present(&form.first_name),
            Field::LastName => is_present(&form.last_name),
            Field::Email => is_email(&form.email),
            Field::Phone => is_phone(&form.phone),
            Field::AddressLine => has_min_chars(&form.address_line, 5),
            Field::City => has_min_chars(&form.city, 2),
            Field::ZipCode => is_zip_code(&form.zip_code),
            Field::ChurchName => has_min_chars(&form.church_name, 2),
            Field::EmergencyName => has_min_chars(&form.emergency_name, 2),
            Field::EmergencyPhone => is_phone(&form.emergency_phone),
            Field::BunkSelection => form.bunk_options.iter().any(|option| is_present(option)),
            Field::PaymentUnderstanding => form.payment_understanding,
            Field::PaymentMethod => form.selected_method().is_some(),
            Field::Amount => is_positive_amount(&form.amount),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

/// `local@domain.tld`: no whitespace, a single `@`, and a dot inside the domain.
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Digits, spaces, hyphens and parentheses only, with at least ten digits.
pub fn is_phone(value: &str) -> bool {
    let value = value.trim();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    !value.is_empty() && allowed && digits >= 10
}

/// Five digits, optionally followed by `-` and four digits.
pub fn is_zip_code(value: &str) -> bool {
    let value = value.trim();
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match value.split_once('-') {
        None => value.len() == 5 && all_digits(value),
        Some((zip, plus4)) => {
            zip.len() == 5 && all_digits(zip) && plus4.len() == 4 && all_digits(plus4)
        }
    }
}

/// Parses to a positive amount that [`Amount`] accepts.
pub fn is_positive_amount(value: &str) -> bool {
    value
        .trim()
        .parse::<Decimal>()
        .map(|amount| Amount::new(amount).is_ok())
        .unwrap_or(false)
}

/// Receives per-field validation results.
///
/// The page adapter implements this to set `aria-invalid` and the error text;
/// [`FieldStates`] keeps the same information in memory.
pub trait FieldFeedback {
    fn mark_invalid(&mut self, field: Field, message: &str);
    fn clear(&mut self, field: Field);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStates {
    invalid: BTreeMap<Field, String>,
}

impl FieldStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_invalid(&self, field: Field) -> bool {
        self.invalid.contains_key(&field)
    }

    pub fn message(&self, field: Field) -> Option<&str> {
        self.invalid.get(&field).map(String::as_str)
    }

    pub fn invalid_fields(&self) -> Vec<Field> {
        self.invalid.keys().copied().collect()
    }
}

impl FieldFeedback for FieldStates {
    fn mark_invalid(&mut self, field: Field, message: &str) {
        self.invalid.insert(field, message.to_string());
    }

    fn clear(&mut self, field: Field) {
        self.invalid.remove(&field);
    }
}

/// Aggregate result of [`validate_form`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    failures: Vec<Field>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[Field] {
        &self.failures
    }

    /// Field that should receive focus.
    pub fn first_invalid(&self) -> Option<Field> {
        self.failures.first().copied()
    }

    /// Screen-reader text for a failed validation, `None` when valid.
    pub fn announcement(&self) -> Option<String> {
        match self.failures.len() {
            0 => None,
            1 => Some("Form validation failed. 1 error found. Please review the form.".to_string()),
            n => Some(format!(
                "Form validation failed. {} errors found. Please review the form.",
                n
            )),
        }
    }
}

/// Checks every field and reports each outcome to `feedback`.
pub fn validate_form<F: FieldFeedback + ?Sized>(
    form: &FormSnapshot,
    feedback: &mut F,
) -> ValidationReport {
    let mut failures = Vec::new();
    for field in Field::ALL {
        if field.is_valid(form) {
            feedback.clear(field);
        } else {
            feedback.mark_invalid(field, field.message());
            failures.push(field);
        }
    }
    ValidationReport { failures }
}
