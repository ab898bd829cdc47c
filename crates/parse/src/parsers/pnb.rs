use chrono::{DateTime, Utc};
use smsledger_core::{ParsedTransaction, TransactionType};

use super::{amount, direction, run, BankParser, Draft, Template};

re!(re_upi,
    r"(?i)A/c\s+[*x]*(\d{4})\s+(debited|credited)\s+(?:with\s+)?INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+Dt\s+[\d-]+(?:\s+[\d:]+)?\s+thru\s+UPI:?\s*(\d+)");
re!(re_transfer_credit,
    r"(?i)A/c\s+[*x]*(\d{4})\s+has\s+been\s+credited\s+with\s+INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+on\s+\S+\s+by\s+(?:NEFT|IMPS|RTGS)\s+from\s+(.+?)\.");

pub struct PnbParser;

impl PnbParser {
    const TEMPLATES: &'static [Template] = &[upi, transfer_credit];
}

impl BankParser for PnbParser {
    fn bank_name(&self) -> &'static str {
        "Punjab National Bank"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &["PNBSMS", "PUNJNB", "PNB"]
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        run(self.bank_name(), Self::TEMPLATES, body, received_at)
    }
}

/// `A/c XX1234 debited INR 1,000.00 Dt 15-05-24 14:20 thru UPI:412345678901. Bal INR 5,000.00`
fn upi(body: &str) -> Option<Draft> {
    let c = re_upi().captures(body)?;
    let draft = Draft::new(amount(&c[3])?, direction(&c[2])?)
        .account(&c[1])
        .reference(&c[4]);
    Some(draft)
}

fn transfer_credit(body: &str) -> Option<Draft> {
    let c = re_transfer_credit().captures(body)?;
    let draft = Draft::new(amount(&c[2])?, TransactionType::Credit)
        .account(&c[1])
        .merchant(&c[3]);
    Some(draft)
}
