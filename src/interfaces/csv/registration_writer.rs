use crate::domain::registration::{PaymentMethod, RegistrationRecord, RegistrationStatus};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct RegistrationRow<'a> {
    timestamp: i64,
    status: RegistrationStatus,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    church: &'a str,
    bunk: &'a str,
    method: PaymentMethod,
    payment_id: &'a str,
    amount: Decimal,
}

impl<'a> From<&'a RegistrationRecord> for RegistrationRow<'a> {
    fn from(record: &'a RegistrationRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            status: record.status,
            name: &record.full_name,
            email: &record.email,
            phone: &record.phone,
            church: &record.church_name,
            bunk: &record.bunk_selection,
            method: record.payment_method,
            payment_id: record.payment_id.as_deref().unwrap_or(""),
            amount: record.amount.value(),
        }
    }
}

/// Exports retained registrations as CSV, one row per record.
pub struct RegistrationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RegistrationWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes a header followed by `records`, in the order given.
    pub fn write_registrations<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a RegistrationRecord>,
    {
        let mut wrote_row = false;
        for record in records {
            self.writer.serialize(RegistrationRow::from(record))?;
            wrote_row = true;
        }
        if !wrote_row {
            self.writer.write_record([
                "timestamp",
                "status",
                "name",
                "email",
                "phone",
                "church",
                "bunk",
                "method",
                "payment_id",
                "amount",
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::fixtures::pending_record;

    fn export(records: &[RegistrationRecord]) -> String {
        let mut buffer = Vec::new();
        RegistrationWriter::new(&mut buffer)
            .write_registrations(records)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_writes_header_and_rows() {
        let mut done = pending_record("jane@x.com", 2);
        done.payment_method = PaymentMethod::Zelle;
        done.complete("ZELLE-2").unwrap();

        let output = export(&[pending_record("amy@x.com", 1), done]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "timestamp,status,name,email,phone,church,bunk,method,payment_id,amount"
        );
        assert_eq!(
            lines[1],
            "1,pending,Jane Doe,amy@x.com,555-123-4567,Grace Chapel,Lower bunk,paypal,PENDING-1,245"
        );
        assert!(lines[2].starts_with("2,completed,"));
        assert!(lines[2].contains(",zelle,ZELLE-2,"));
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let output = export(&[]);
        assert_eq!(
            output.trim_end(),
            "timestamp,status,name,email,phone,church,bunk,method,payment_id,amount"
        );
    }
}
