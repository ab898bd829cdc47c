use chrono::{DateTime, Utc};
use smsledger_core::{ParsedTransaction, TransactionType};

use super::{amount, run, BankParser, Draft, Template};

re!(re_upi_debit,
    r"(?i)Acct\s+[*x]*(\d{3,4})\s+debited\s+(?:for|with)\s+(?:Rs\.?|INR)\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+on\s+\S+?;?\s+(.+?)\s+credited\.?\s*UPI:?\s*(\d+)");
re!(re_upi_credit,
    r"(?i)Acct\s+[*x]*(\d{3,4})\s+is\s+credited\s+with\s+(?:Rs\.?|INR)\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+on\s+\S+\s+from\s+(.+?)\.\s*UPI:?\s*(\d+)");
re!(re_card_spent,
    r"(?i)INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+spent\s+(?:using|on)\s+ICICI\s+Bank\s+Card\s+[*x]*(\d{4})\s+on\s+\S+\s+on\s+(.+?)\.");

pub struct IciciParser;

impl IciciParser {
    const TEMPLATES: &'static [Template] = &[upi_debit, upi_credit, card_spent];
}

impl BankParser for IciciParser {
    fn bank_name(&self) -> &'static str {
        "ICICI Bank"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &["ICICIB", "ICICI", "ICICIBANK"]
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        run(self.bank_name(), Self::TEMPLATES, body, received_at)
    }
}

/// `ICICI Bank Acct XX123 debited for Rs 240.00 on 15-May-24; SWIGGY credited. UPI:412345678901.`
fn upi_debit(body: &str) -> Option<Draft> {
    let c = re_upi_debit().captures(body)?;
    let draft = Draft::new(amount(&c[2])?, TransactionType::Debit)
        .account(&c[1])
        .merchant(&c[3])
        .reference(&c[4]);
    Some(draft)
}

fn upi_credit(body: &str) -> Option<Draft> {
    let c = re_upi_credit().captures(body)?;
    let draft = Draft::new(amount(&c[2])?, TransactionType::Credit)
        .account(&c[1])
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
