use chrono::{DateTime, Utc};
use smsledger_core::{ParsedTransaction, TransactionType};

use super::{amount, run, BankParser, Draft, Template};

re!(re_upi_sent,
    r"(?i)Sent\s+Rs\.?\s*([0-9,]+(?:\.[0-9]{1,2})?)\s*\n\s*From\s+HDFC\s+Bank\s+A/C\s+[*x]*(\d{4})\s*\n\s*To\s+([^\n]+?)\s*\n(?:\s*On\s+[^\n]+\n)?\s*Ref\s+(\d+)");
re!(re_upi_received,
    r"(?i)Rs\.?\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+credited\s+to\s+HDFC\s+Bank\s+A/c\s+[*x]*(\d{4})\s+on\s+\S+\s+from\s+VPA\s+([\w.-]+@\w+)\s*\(UPI\s+(\d+)\)");
re!(re_card_spent,
    r"(?i)Spent\s+Rs\.?\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+On\s+HDFC\s+Bank\s+Card\s+[*x]*(\d{4})\s+At\s+(.+?)\s+On\s+");

pub struct HdfcParser;

impl HdfcParser {
    const TEMPLATES: &'static [Template] = &[upi_sent, upi_received, card_spent];
}

impl BankParser for HdfcParser {
    fn bank_name(&self) -> &'static str {
        "HDFC Bank"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &["HDFCBK", "HDFC", "HDFCBANK"]
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        run(self.bank_name(), Self::TEMPLATES, body, received_at)
    }
}

/// ```text
/// Sent Rs.250.00
/// From HDFC Bank A/C *1234
/// To SWIGGY
/// On 15/05/24
/// Ref 412345678901
/// ```
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

fn card_spent(body: &str) -> Option<Draft> {
    let c = re_card_spent().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Debit)
        .account(&c[2])
        .merchant(&c[3]);
    Some(draft)
}
