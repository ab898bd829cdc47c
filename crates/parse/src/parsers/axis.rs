use chrono::{DateTime, Utc};
use smsledger_core::{ParsedTransaction, TransactionType};

use super::{amount, direction, run, BankParser, Draft, Template};

re!(re_upi_multiline,
    r"(?i)INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+(debited|credited)\s*\n\s*A/c\s+no\.\s*XX(\d{4,})\s*\n\s*[\d-]+[,\s]*[\d:.]*\s*\n\s*UPI/\w+/(\d+)/(.+)");
re!(re_transfer_multiline,
    r"(?i)(Debit|Credit)\s+INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s*\n\s*Axis\s+Bank\s+A/c\s+XX(\d{4,})\s*\n\s*[\d-]+[\s,]*[\d:.]*\s*\n\s*(?:IMPS|NEFT)/\w+/(\w+)/(.+)");
re!(re_card_debit,
    r"(?i)INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+debited\s+from\s+A/c\s+no\.\s*XX(\d{4,})\s+on\s+(.+?)\s+\d{2}-\d{2}-\d{2,4}");
re!(re_lite_topup,
    r"(?is)UPI\s+LITE\s+top-?up.*?INR\s+([0-9,]+(?:\.[0-9]{1,2})?).*?successful");
re!(re_lite_reference, r"(?i)Ref\s+no\.?\s*(\d+)");
re!(re_mandate,
    r"(?i)debited\s+towards\s+(.+?)\s+for\s+INR\s+([0-9,]+(?:\.[0-9]{1,2})?)");
re!(re_interest,
    r"(?is)INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+credited\s+to\s+A/c\s+no\.\s*XX(\d{4,}).*?Int\.?\s*Pd");

pub struct AxisParser;

impl AxisParser {
    const TEMPLATES: &'static [Template] = &[
        upi_multiline,
        transfer_multiline,
        card_debit,
        lite_topup,
        mandate,
        interest,
    ];
}

impl BankParser for AxisParser {
    fn bank_name(&self) -> &'static str {
        "Axis Bank"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &["AXISBK", "AXIS", "AXISBANK"]
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        run(self.bank_name(), Self::TEMPLATES, body, received_at)
    }
}

// ── Templates ────────────────────────────────────────────────────────────────

/// ```text
/// INR 250.00 debited
/// A/c no. XX1234
/// 15-05-24, 10:20:30
/// UPI/P2M/412345678901/SWIGGY
/// ```
fn upi_multiline(body: &str) -> Option<Draft> {
    let c = re_upi_multiline().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, direction(&c[2])?)
        .account(&c[3])
        .reference(&c[4])
        .merchant(&c[5]);
    Some(draft)
}

/// ```text
/// Debit INR 5,000.00
/// Axis Bank A/c XX1234
/// 15-05-24 11:05:10
/// IMPS/P2A/412312345678/RAHUL
/// ```
fn transfer_multiline(body: &str) -> Option<Draft> {
    let c = re_transfer_multiline().captures(body)?;
    let draft = Draft::new(amount(&c[2])?, direction(&c[1])?)
        .account(&c[3])
        .reference(&c[4])
        .merchant(&c[5]);
    Some(draft)
}

fn card_debit(body: &str) -> Option<Draft> {
    let c = re_card_debit().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Debit)
        .account(&c[2])
        .merchant(&c[3]);
    Some(draft)
}

fn lite_topup(body: &str) -> Option<Draft> {
    let c = re_lite_topup().captures(body)?;
    let mut draft = Draft::new(amount(&c[1])?, TransactionType::Debit).label("UPI LITE Top-up");
    if let Some(r) = re_lite_reference().captures(body) {
        draft = draft.reference(&r[1]);
    }
    Some(draft)
}

fn mandate(body: &str) -> Option<Draft> {
    let c = re_mandate().captures(body)?;
    let draft = Draft::new(amount(&c[2])?, TransactionType::Debit).merchant(&c[1]);
    Some(draft)
}

fn interest(body: &str) -> Option<Draft> {
    let c = re_interest().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Credit)
        .account(&c[2])
        .label("Interest");
    Some(draft)
}
