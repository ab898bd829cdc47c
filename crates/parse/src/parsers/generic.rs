use chrono::{DateTime, Utc};
use smsledger_core::{Money, ParsedTransaction, TransactionType};

use super::{is_transactional, BankParser, Draft};

/// A last-resort general-purpose transaction text parser.
pub trait FreeTextParser: Send + Sync {
    fn parse_free_text(&self, body: &str) -> Option<FreeTextTransaction>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreeTextTransaction {
    pub amount: Money,
    pub kind: Option<TransactionType>,
    pub merchant: Option<String>,
}

/// Used for any sender no bank parser claims. Carries no templates and no
/// bank name.
#[derive(Default)]
pub struct GenericParser {
    fallback: Option<Box<dyn FreeTextParser>>,
}

impl GenericParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(fallback: impl FreeTextParser + 'static) -> Self {
        Self {
            fallback: Some(Box::new(fallback)),
        }
    }

    fn from_fallback(&self, body: &str) -> Option<Draft> {
        let found = self.fallback.as_ref()?.parse_free_text(body)?;
        let kind = found.kind?;
        if !found.amount.is_positive() {
            return None;
        }
        let mut draft = Draft::new(found.amount, kind);
        draft.merchant = found.merchant;
        Some(draft)
    }
}

impl BankParser for GenericParser {
    fn bank_name(&self) -> &'static str {
        "Unknown"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &[]
    }

    fn can_parse(&self, _sender: &str) -> bool {
        true
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        if !is_transactional(body) {
            return None;
        }
        let draft = Draft::from_primitives(body).or_else(|| self.from_fallback(body))?;
        let mut tx = draft.finish(self.bank_name(), body, received_at)?;
        tx.bank_name = None;
        Some(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::test_support::received_at;

    struct Canned(Option<FreeTextTransaction>);

    impl FreeTextParser for Canned {
        fn parse_free_text(&self, _body: &str) -> Option<FreeTextTransaction> {
            self.0.clone()
        }
    }

    #[test]
    fn primitives_first() {
        let tx = GenericParser::new()
            .parse("Rs 120 debited at CHAI POINT on 01-05", received_at())
            .unwrap();
        assert_eq!(tx.amount, Money::from_cents(12_000));
        assert_eq!(tx.merchant.as_deref(), Some("Chai Point"));
        assert_eq!(tx.bank_name, None);
    }

    #[test]
    fn free_text_fallback_fills_missing_amount() {
        let parser = GenericParser::with_fallback(Canned(Some(FreeTextTransaction {
            amount: Money::from_cents(4_500),
            kind: Some(TransactionType::Debit),
            merchant: Some("METRO CARD".to_string()),
        })));
        let tx = parser
            .parse("Forty five rupees debited for metro card recharge", received_at())
            .unwrap();
        assert_eq!(tx.amount, Money::from_cents(4_500));
        assert_eq!(tx.merchant.as_deref(), Some("Metro Card"));
    }

    #[test]
    fn free_text_without_type_is_discarded() {
        let parser = GenericParser::with_fallback(Canned(Some(FreeTextTransaction {
            amount: Money::from_cents(4_500),
            kind: None,
            merchant: None,
        })));
        assert!(parser
            .parse("Forty five rupees debited for metro card recharge", received_at())
            .is_none());
    }

    #[test]
    fn zero_score_message_never_reaches_fallback() {
        let parser = GenericParser::with_fallback(Canned(Some(FreeTextTransaction {
            amount: Money::from_cents(100),
            kind: Some(TransactionType::Credit),
            merchant: None,
        })));
        assert!(parser.parse("Your statement is ready", received_at()).is_none());
    }
}
