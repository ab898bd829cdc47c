use chrono::{DateTime, Utc};
use smsledger_core::{ParsedTransaction, TransactionType};

use super::{amount, run, BankParser, Draft, Template};

re!(re_upi_debit,
    r"(?i)A/C\s+[*x]*(\d{4})\s+debited\s+by\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+on\s+date\s+\S+\s+trf\s+to\s+(.+?)\s+Refno\s+(\d+)");
re!(re_transfer_credit,
    r"(?i)A/c\s+[*x]*(\d{4})-?\s*credited\s+by\s+Rs\.?\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+on\s+\S+\s+transfer\s+from\s+(.+?)\s+Ref\s+No\.?\s*(\d+)");
re!(re_atm_withdrawal,
    r"(?i)Rs\.?\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+withdrawn\s+at\s+SBI\s+ATM\s+\S+\s+from\s+A/c\s*[*x]*(\d{4})");

pub struct SbiParser;

impl SbiParser {
    const TEMPLATES: &'static [Template] = &[upi_debit, transfer_credit, atm_withdrawal];
}

impl BankParser for SbiParser {
    fn bank_name(&self) -> &'static str {
        "SBI"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &["SBIINB", "SBIATM", "SBI", "SBIBANK"]
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        run(self.bank_name(), Self::TEMPLATES, body, received_at)
    }
}

/// `Dear UPI user A/C X1234 debited by 500.0 on date 12May24 trf to SWIGGY Refno 412345678901.`
fn upi_debit(body: &str) -> Option<Draft> {
    let c = re_upi_debit().captures(body)?;
    let draft = Draft::new(amount(&c[2])?, TransactionType::Debit)
        .account(&c[1])
        .merchant(&c[3])
        .reference(&c[4]);
    Some(draft)
}

fn transfer_credit(body: &str) -> Option<Draft> {
    let c = re_transfer_credit().captures(body)?;
    let draft = Draft::new(amount(&c[2])?, TransactionType::Credit)
        .account(&c[1])
        .merchant(&c[3])
        .reference(&c[4]);
    Some(draft)
}

fn atm_withdrawal(body: &str) -> Option<Draft> {
    let c = re_atm_withdrawal().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Debit)
        .account(&c[2])
        .label("ATM Withdrawal");
    Some(draft)
}
