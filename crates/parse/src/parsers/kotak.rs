use chrono::{DateTime, Utc};
use smsledger_core::{ParsedTransaction, TransactionType};

use super::{amount, run, BankParser, Draft, Template};

re!(re_upi_sent,
    r"(?i)Sent\s+Rs\.?\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+from\s+Kotak\s+Bank\s+AC\s+[*x]*(\d{4})\s+to\s+(\S+?)\s+on\s+\S+?\.?\s*UPI\s+Ref:?\s*(\d+)");
re!(re_upi_received,
    r"(?i)Received\s+Rs\.?\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+in\s+your\s+Kotak\s+Bank\s+AC\s+[*x]*(\d{4})\s+from\s+(\S+?)\s+on\s+\S+?\.?\s*UPI\s+Ref:?\s*(\d+)");

pub struct KotakParser;

impl KotakParser {
    const TEMPLATES: &'static [Template] = &[upi_sent, upi_received];
}

impl BankParser for KotakParser {
    fn bank_name(&self) -> &'static str {
        "Kotak Mahindra Bank"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &["KOTAKB", "KOTAK", "KOTAKBANK"]
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        run(self.bank_name(), Self::TEMPLATES, body, received_at)
    }
}

fn upi_sent(body: &str) -> Option<Draft> {
    let c = re_upi_sent().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Debit)
        .account(&c[2])
        .merchant(&c[3])
        .reference(&c[4]);
    Some(draft)
}

fn upi_received(body: &str) -> Option<Draft> {
    let c = re_upi_received().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Credit)
        .account(&c[2])
        .merchant(&c[3])
        .reference(&c[4]);
    Some(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::test_support::received_at;
    use smsledger_core::Money;

    #[test]
    fn upi_sent_to_vpa() {
        let body = "Sent Rs.500.00 from Kotak Bank AC X1234 to zomato@hdfcbank on 15-05-24.UPI Ref 412345678901. Not you, https://kotak.com/KBANKT/Fraud";
        let tx = KotakParser.parse(body, received_at()).unwrap();
        assert_eq!(tx.amount, Money::from_cents(50_000));
        assert_eq!(tx.kind, TransactionType::Debit);
        assert_eq!(tx.merchant.as_deref(), Some("Zomato"));
        assert_eq!(tx.account_last_four.as_deref(), Some("1234"));
        assert_eq!(tx.reference_number.as_deref(), Some("412345678901"));
        assert_eq!(tx.bank_name.as_deref(), Some("Kotak Mahindra Bank"));
    }

    #[test]
    fn upi_received_from_vpa() {
        let body = "Received Rs.1500.00 in your Kotak Bank AC X1234 from rahul@okaxis on 15-05-24.UPI Ref:412345678901.";
        let tx = KotakParser.parse(body, received_at()).unwrap();
        assert_eq!(tx.amount, Money::from_cents(150_000));
        assert_eq!(tx.kind, TransactionType::Credit);
        assert_eq!(tx.merchant.as_deref(), Some("Rahul"));
    }
}
