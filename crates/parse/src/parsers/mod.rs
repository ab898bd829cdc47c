//! One parser per bank or payment rail.
//!
//! Each parser owns a short ordered list of layout templates for the formats
//! its sender is known to use. The first template that recognises the body
//! wins; when none does, the shared primitives in [`crate::patterns`] are
//! tried instead. Whatever path is taken, a message that is non-final, an
//! outgoing-transfer confirmation, or has no direction evidence at all
//! produces nothing.

use chrono::{DateTime, Utc};
use smsledger_core::{Money, ParsedTransaction, TransactionType};

use crate::merchant::normalize_merchant;
use crate::patterns;

mod axis;
mod generic;
mod hdfc;
mod hsbc;
mod icici;
mod kotak;
mod pnb;
mod sbi;
mod upi;

pub use axis::AxisParser;
pub use generic::{FreeTextParser, FreeTextTransaction, GenericParser};
pub use hdfc::HdfcParser;
pub use hsbc::HsbcParser;
pub use icici::IciciParser;
pub use kotak::KotakParser;
pub use pnb::PnbParser;
pub use sbi::SbiParser;
pub use upi::UpiParser;

/// A parser for one bank's or payment app's messages.
pub trait BankParser: Send + Sync {
    fn bank_name(&self) -> &'static str;

    /// Upper-case fragments of the sender ids this bank sends from.
    fn sender_patterns(&self) -> &'static [&'static str];

    /// Case-insensitive substring match of `sender` against [`sender_patterns`](Self::sender_patterns).
    fn can_parse(&self, sender: &str) -> bool {
        let sender = sender.to_uppercase();
        self.sender_patterns().iter().any(|p| sender.contains(p))
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction>;
}

// ── Shared template machinery ────────────────────────────────────────────────

/// What a template (or the primitive fallback) pulled out of a body. Fields
/// left empty are filled from the primitives in [`Draft::finish`].
#[derive(Debug, Clone)]
pub(crate) struct Draft {
    pub amount: Money,
    pub kind: TransactionType,
    pub merchant: Option<String>,
    /// Fixed labels like "Interest" skip normalization.
    pub merchant_is_label: bool,
    pub account: Option<String>,
    pub reference: Option<String>,
    pub bank: Option<&'static str>,
}

impl Draft {
    pub fn new(amount: Money, kind: TransactionType) -> Self {
        Draft {
            amount,
            kind,
            merchant: None,
            merchant_is_label: false,
            account: None,
            reference: None,
            bank: None,
        }
    }

    pub fn merchant(mut self, raw: &str) -> Self {
        self.merchant = Some(raw.trim().to_string());
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.merchant = Some(label.to_string());
        self.merchant_is_label = true;
        self
    }

    pub fn account(mut self, digits: &str) -> Self {
        self.account = Some(patterns::last_four(digits));
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.trim().to_uppercase());
        self
    }

    /// Build a draft from the shared primitives alone.
    pub fn from_primitives(body: &str) -> Option<Self> {
        let amount = patterns::extract_amount(body)?;
        let kind = patterns::extract_transaction_type(body)?;
        let mut draft = Draft::new(amount, kind);
        draft.merchant = patterns::extract_merchant(body);
        Some(draft)
    }

    pub fn finish(
        self,
        bank_name: &'static str,
        body: &str,
        received_at: DateTime<Utc>,
    ) -> Option<ParsedTransaction> {
        if !self.amount.is_positive() {
            return None;
        }
        let merchant = match self.merchant {
            Some(label) if self.merchant_is_label => Some(label),
            Some(raw) => Some(normalize_merchant(&raw)).filter(|m| !m.is_empty()),
            None => None,
        };
        Some(ParsedTransaction {
            amount: self.amount,
            kind: self.kind,
            merchant,
            account_last_four: self
                .account
                .or_else(|| patterns::extract_account_last_four(body)),
            bank_name: Some(self.bank.unwrap_or(bank_name).to_string()),
            reference_number: self
                .reference
                .or_else(|| patterns::extract_reference_number(body)),
            balance: patterns::extract_balance(body),
            occurred_at: received_at,
            raw_sms: body.to_string(),
        })
    }
}

/// A layout recogniser: `Some` only when the whole layout matched.
pub(crate) type Template = fn(&str) -> Option<Draft>;

/// Apply the conservative guards, then the templates, then the primitives.
pub(crate) fn run(
    bank_name: &'static str,
    templates: &[Template],
    body: &str,
    received_at: DateTime<Utc>,
) -> Option<ParsedTransaction> {
    if !is_transactional(body) {
        return None;
    }
    let draft = match templates.iter().find_map(|t| t(body)) {
        Some(draft) => draft,
        None => Draft::from_primitives(body)?,
    };
    draft.finish(bank_name, body, received_at)
}

/// The guards every parser applies before extracting anything.
pub(crate) fn is_transactional(body: &str) -> bool {
    if patterns::is_non_final(body) {
        tracing::trace!("non-final message");
        return false;
    }
    if patterns::is_outgoing_confirmation(body) {
        tracing::trace!("outgoing transfer confirmation");
        return false;
    }
    patterns::score_transaction_type(body).resolve().is_some()
}

/// Parse an amount captured by a template.
pub(crate) fn amount(raw: &str) -> Option<Money> {
    Money::parse(raw).filter(|m| m.is_positive())
}

pub(crate) fn direction(word: &str) -> Option<TransactionType> {
    match word.to_lowercase().as_str() {
        "debited" | "debit" | "sent" | "paid" | "spent" => Some(TransactionType::Debit),
        "credited" | "credit" | "received" => Some(TransactionType::Credit),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, TimeZone, Utc};

    pub fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 30, 8, 0, 0).unwrap()
    }
}
