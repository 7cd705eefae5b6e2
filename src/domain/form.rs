use super::registration::{Amount, PaymentMethod, RegistrationRecord, RegistrationStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Raw values of the registration form, detached from any UI.
///
/// Produced by whatever adapter owns the page (or a JSON file on the CLI). The
/// validator and orchestrator only ever see this type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub videophone: String,
    pub address_line: String,
    pub city: String,
    pub zip_code: String,
    pub church_name: String,
    pub emergency_name: String,
    pub emergency_phone: String,
    /// Values of the checked bunk checkboxes, in page order.
    pub bunk_options: Vec<String>,
    pub youth_info: String,
    pub payment_understanding: bool,
    /// Every selected payment radio. Valid input has exactly one.
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(deserialize_with = "string_or_number")]
    pub amount: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

impl FormSnapshot {
    /// The single selected payment method, if exactly one is selected.
    pub fn selected_method(&self) -> Option<PaymentMethod> {
        match self.payment_methods.as_slice() {
            [method] => Some(*method),
            _ => None,
        }
    }

    pub fn parsed_amount(&self) -> Option<Amount> {
        self.amount
            .trim()
            .parse::<Decimal>()
            .ok()
            .and_then(|value| Amount::new(value).ok())
    }

    /// Snapshots the form into a pending record for `method`.
    ///
    /// Performs no validation; callers run [`super::validation::validate_form`]
    /// first. An unparsable amount falls back to `default_amount`.
    pub fn read_registration(
        &self,
        method: PaymentMethod,
        timestamp: i64,
        default_amount: Amount,
    ) -> RegistrationRecord {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let address_line = self.address_line.trim().to_string();
        let city = self.city.trim().to_string();
        let zip_code = self.zip_code.trim().to_string();
        let full_address = [address_line.as_str(), city.as_str(), zip_code.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        RegistrationRecord {
            full_name: format!("{} {}", first_name, last_name),
            first_name,
            last_name,
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            videophone: self.videophone.trim().to_string(),
            address_line,
            city,
            zip_code,
            full_address,
            church_name: self.church_name.trim().to_string(),
            emergency_name: self.emergency_name.trim().to_string(),
            emergency_phone: self.emergency_phone.trim().to_string(),
            bunk_selection: self
                .bunk_options
                .iter()
                .map(|option| option.trim())
                .collect::<Vec<_>>()
                .join(", "),
            youth_info: self.youth_info.trim().to_string(),
            payment_understanding: self.payment_understanding,
            amount: self.parsed_amount().unwrap_or(default_amount),
            payment_method: method,
            payment_id: None,
            timestamp,
            status: RegistrationStatus::Pending,
        }
    }
}

/// Formats phone digits as `(555) 123-4567` while the user types.
pub fn format_phone_input(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0 => String::new(),
        1..=3 => format!("({}", digits),
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => {
            let end = digits.len().min(10);
            format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..end])
        }
    }
}

/// Formats ZIP digits as `12345` or `12345-6789`.
pub fn format_zip_input(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > 5 {
        let end = digits.len().min(9);
        format!("{}-{}", &digits[..5], &digits[5..end])
    } else {
        digits
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::valid_snapshot;
    use super::*;
    use rust_decimal_macros::dec;

    fn default_amount() -> Amount {
        Amount::new(dec!(245.00)).unwrap()
    }

    #[test]
    fn test_read_registration_derives_fields() {
        let mut snapshot = valid_snapshot(PaymentMethod::Zelle);
        snapshot.first_name = "  Jane ".to_string();
        snapshot.bunk_options = vec!["Lower bunk".to_string(), "Cabin A".to_string()];

        let record = snapshot.read_registration(PaymentMethod::Zelle, 1000, default_amount());

        assert_eq!(record.first_name, "Jane");
        assert_eq!(record.full_name, "Jane Doe");
        assert_eq!(record.full_address, "12 Pine Street, Twin Peaks, 92391");
        assert_eq!(record.bunk_selection, "Lower bunk, Cabin A");
        assert_eq!(record.payment_method, PaymentMethod::Zelle);
        assert_eq!(record.payment_id, None);
        assert_eq!(record.status, RegistrationStatus::Pending);
        assert_eq!(record.amount.value(), dec!(245));
    }

    #[test]
    fn test_full_address_skips_blank_parts() {
        let mut snapshot = valid_snapshot(PaymentMethod::Zelle);
        snapshot.city = "   ".to_string();

        let record = snapshot.read_registration(PaymentMethod::Zelle, 1, default_amount());
        assert_eq!(record.full_address, "12 Pine Street, 92391");
    }

    #[test]
    fn test_read_twice_differs_only_in_timestamp() {
        let snapshot = valid_snapshot(PaymentMethod::PayPal);
        let first = snapshot.read_registration(PaymentMethod::PayPal, 1, default_amount());
        let mut second = snapshot.read_registration(PaymentMethod::PayPal, 2, default_amount());

        assert_ne!(first.timestamp, second.timestamp);
        second.timestamp = first.timestamp;
        assert_eq!(first, second);
    }

    #[test]
    fn test_unparsable_amount_uses_default() {
        let mut snapshot = valid_snapshot(PaymentMethod::Zelle);
        snapshot.amount = "abc".to_string();

        let record = snapshot.read_registration(PaymentMethod::Zelle, 1, default_amount());
        assert_eq!(record.amount, default_amount());
    }

    #[test]
    fn test_selected_method_requires_exactly_one() {
        let mut snapshot = valid_snapshot(PaymentMethod::Zelle);
        assert_eq!(snapshot.selected_method(), Some(PaymentMethod::Zelle));

        snapshot.payment_methods.push(PaymentMethod::PayPal);
        assert_eq!(snapshot.selected_method(), None);

        snapshot.payment_methods.clear();
        assert_eq!(snapshot.selected_method(), None);
    }

    #[test]
    fn test_snapshot_deserializes_numeric_amount() {
        let json = r#"{ "firstName": "Jane", "amount": 245, "paymentMethods": ["money_order"] }"#;
        let snapshot: FormSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.amount, "245");
        assert_eq!(snapshot.selected_method(), Some(PaymentMethod::MoneyOrder));
        assert!(snapshot.last_name.is_empty());
    }

    #[test]
    fn test_format_phone_input() {
        assert_eq!(format_phone_input(""), "");
        assert_eq!(format_phone_input("55"), "(55");
        assert_eq!(format_phone_input("55512"), "(555) 12");
        assert_eq!(format_phone_input("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone_input("555123456789"), "(555) 123-4567");
    }

    #[test]
    fn test_format_zip_input() {
        assert_eq!(format_zip_input("9239"), "9239");
        assert_eq!(format_zip_input("923911234"), "92391-1234");
        assert_eq!(format_zip_input("92391-12345"), "92391-1234");
    }
}
