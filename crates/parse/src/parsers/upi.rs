use chrono::{DateTime, Utc};
use smsledger_core::{ParsedTransaction, TransactionType};

use super::{amount, is_transactional, BankParser, Draft};

re!(re_paid,
    r"(?im)\b(?:paid|sent)\s+(?:Rs\.?|INR|₹)\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+to\s+(.+?)(?:\s+(?:on|via|using|from|ref)\b|[.]\s|[.]?$)");
re!(re_received,
    r"(?im)\breceived\s+(?:Rs\.?|INR|₹)\s*([0-9,]+(?:\.[0-9]{1,2})?)\s+from\s+(.+?)(?:\s+(?:on|in|via|ref)\b|[.]\s|[.]?$)");
re!(re_vpa, r"(?i)\b(?:to|from)\s+([a-z0-9._-]+@[a-z]+)");

/// VPA handle suffix to the bank or app behind it.
const VPA_BANKS: &[(&str, &str)] = &[
    ("@okhdfcbank", "HDFC Bank"),
    ("@okicici", "ICICI Bank"),
    ("@oksbi", "SBI"),
    ("@okaxis", "Axis Bank"),
    ("@paytm", "Paytm"),
    ("@ybl", "PhonePe"),
    ("@ibl", "ICICI Bank"),
    ("@axl", "Axis Bank"),
];

/// Payment-app notifications (GPay, PhonePe, Paytm, BHIM, Amazon Pay).
///
/// Tried after every bank parser: bank messages routinely mention "UPI".
pub struct UpiParser;

impl BankParser for UpiParser {
    fn bank_name(&self) -> &'static str {
        "UPI"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &["GPAY", "PHONEPE", "PAYTM", "BHIM", "AMAZON", "UPI"]
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        if !is_transactional(body) {
            return None;
        }
        let vpa = re_vpa().captures(body).map(|c| c[1].to_string());

        let mut draft = match app_template(body) {
            Some(draft) => draft,
            None => Draft::from_primitives(body)?,
        };
        if draft.merchant.is_none() {
            draft.merchant = vpa.clone();
        }
        draft.bank = vpa.as_deref().and_then(bank_from_vpa);
        draft.finish(self.bank_name(), body, received_at)
    }
}

fn app_template(body: &str) -> Option<Draft> {
    if let Some(c) = re_paid().captures(body) {
        return Some(Draft::new(amount(&c[1])?, TransactionType::Debit).merchant(&c[2]));
    }
    let c = re_received().captures(body)?;
    Some(Draft::new(amount(&c[1])?, TransactionType::Credit).merchant(&c[2]))
}

pub(crate) fn bank_from_vpa(vpa: &str) -> Option<&'static str> {
    let vpa = vpa.to_lowercase();
    VPA_BANKS
        .iter()
        .find(|(handle, _)| vpa.contains(handle))
        .map(|(_, bank)| *bank)
}
