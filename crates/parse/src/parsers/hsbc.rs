use chrono::{DateTime, Utc};
use smsledger_core::{ParsedTransaction, TransactionType};

use super::{amount, run, BankParser, Draft, Template};

re!(re_account, r"(?i)A/c\s+(?:no\.?\s*)?(?:XX|x+|\*+)(\d{4})");

re!(re_upi_payment,
    r"(?i)INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+is\s+paid\s+from\s+HSBC\s+account\s+\w*?(\d{4})\s+to\s+(.+?)\s+on\s+");
re!(re_upi_payment_reference, r"(?i)ref\s*[:#]?\s*(\d{8,})");
re!(re_transfer_credit,
    r"(?i)credited\s+with\s+INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\+?\s+on\s+.+?\s+with\s+UTR\s+(\w+)\s+as\s+(?:NEFT|IMPS)\s+from\s+.+?\s+of\s+(.+)");
re!(re_upi_incoming,
    r"(?i)credited\s+for\s+INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+on\s+\S+\s+from\s+([\w.-]+@\w+)");
re!(re_debit_card,
    r"(?im)using\s+HSBC\s+Debit\s+Card\s+(\d{4})\s+for\s+INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\s+on\s+.+?\s+at\s+(.+?)(?:\s*\.|$)");
re!(re_account_debit,
    r"(?im)debited\s+with\s+INR\s+([0-9,]+(?:\.[0-9]{1,2})?)[-\s]*on\s+.+?\s+as\s+(.+?)(?:\s*\.|$)");
re!(re_account_credit,
    r"(?im)credited\s+with\s+INR\s+([0-9,]+(?:\.[0-9]{1,2})?)\+?\s*on\s+.+?\s+as\s+(.+?)(?:\s+with\s+UTR|\s*\.|$)");
re!(re_cash_withdrawal, r"(?i)^CSH\s*WDL\b");

pub struct HsbcParser;

impl HsbcParser {
    const TEMPLATES: &'static [Template] = &[
        upi_payment,
        transfer_credit,
        upi_incoming,
        debit_card,
        account_debit,
        account_credit,
    ];
}

impl BankParser for HsbcParser {
    fn bank_name(&self) -> &'static str {
        "HSBC"
    }

    fn sender_patterns(&self) -> &'static [&'static str] {
        &["HSBC", "HSBCBK", "HSBCBANK", "HSBCIN", "HSBCIM"]
    }

    fn parse(&self, body: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
        run(self.bank_name(), Self::TEMPLATES, body, received_at)
    }
}

fn with_account(draft: Draft, body: &str) -> Draft {
    match re_account().captures(body) {
        Some(c) => draft.account(&c[1]),
        None => draft,
    }
}

// ── Templates ────────────────────────────────────────────────────────────────

fn upi_payment(body: &str) -> Option<Draft> {
    let c = re_upi_payment().captures(body)?;
    let mut draft = Draft::new(amount(&c[1])?, TransactionType::Debit)
        .account(&c[2])
        .merchant(&c[3]);
    if let Some(r) = re_upi_payment_reference().captures(body) {
        draft = draft.reference(&r[1]);
    }
    Some(draft)
}

fn transfer_credit(body: &str) -> Option<Draft> {
    let c = re_transfer_credit().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Credit)
        .reference(&c[2])
        .merchant(&c[3]);
    Some(with_account(draft, body))
}

fn upi_incoming(body: &str) -> Option<Draft> {
    let c = re_upi_incoming().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Credit).merchant(&c[2]);
    Some(with_account(draft, body))
}

fn debit_card(body: &str) -> Option<Draft> {
    let c = re_debit_card().captures(body)?;
    let draft = Draft::new(amount(&c[2])?, TransactionType::Debit)
        .account(&c[1])
        .merchant(&c[3]);
    Some(draft)
}

fn account_debit(body: &str) -> Option<Draft> {
    let c = re_account_debit().captures(body)?;
    let reason = c[2].trim();
    let draft = Draft::new(amount(&c[1])?, TransactionType::Debit);
    let draft = if re_cash_withdrawal().is_match(reason) {
        draft.label("ATM Withdrawal")
    } else {
        draft.merchant(reason)
    };
    Some(with_account(draft, body))
}

fn account_credit(body: &str) -> Option<Draft> {
    let c = re_account_credit().captures(body)?;
    let draft = Draft::new(amount(&c[1])?, TransactionType::Credit).merchant(&c[2]);
    Some(with_account(draft, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::test_support::received_at;
    use smsledger_core::Money;

    fn parse(body: &str) -> Option<ParsedTransaction> {
        HsbcParser.parse(body, received_at())
    }

    #[test]
    fn sender_matching() {
        assert!(HsbcParser.can_parse("JM-HSBCIN-S"));
        assert!(HsbcParser.can_parse("AD-HSBCIM-S"));
        assert!(!HsbcParser.can_parse("AD-AXISBK-S"));
    }

    #[test]
    fn upi_payment() {
        let body = "INR 1,500.00 is paid from HSBC account XXXXXX1234 to SWIGGY on 30Jan with ref 603012345678";
        let tx = parse(body).unwrap();
        assert_eq!(tx.amount, Money::from_cents(150_000));
        assert_eq!(tx.kind, TransactionType::Debit);
        assert_eq!(tx.merchant.as_deref(), Some("Swiggy"));
        assert_eq!(tx.account_last_four.as_deref(), Some("1234"));
        assert_eq!(tx.reference_number.as_deref(), Some("603012345678"));
    }

    #[test]
    fn neft_credit_with_utr() {
        let body = "HSBC: A/c XX1234 is credited with INR 18,528.62+ on 30JAN at 19.56.03 with UTR HDFCR52026013000 as NEFT from HDFC A/c ***0051 of BIRLA SUN LIFE INSURANCE";
        let tx = parse(body).unwrap();
        assert_eq!(tx.amount, Money::from_cents(1_852_862));
        assert_eq!(tx.kind, TransactionType::Credit);
        assert_eq!(tx.merchant.as_deref(), Some("Birla Sun Life Insurance"));
        assert_eq!(tx.reference_number.as_deref(), Some("HDFCR52026013000"));
        assert_eq!(tx.account_last_four.as_deref(), Some("1234"));
    }

    #[test]
    fn upi_incoming_credit() {
        let body = "HSBC: A/c XX1234 is credited for INR 5,000.00 on 15Jan from sender@oksbi. UPI Ref No 603098765432";
        let tx = parse(body).unwrap();
        assert_eq!(tx.amount, Money::from_cents(500_000));
        assert_eq!(tx.kind, TransactionType::Credit);
        assert_eq!(tx.merchant.as_deref(), Some("Sender"));
        assert_eq!(tx.reference_number.as_deref(), Some("603098765432"));
    }

    #[test]
    fn debit_card_purchase() {
        let body = "Transaction using HSBC Debit Card 5678 for INR 999.00 on 20Jan at AMAZON RETAIL INDIA.";
        let tx = parse(body).unwrap();
        assert_eq!(tx.amount, Money::from_cents(99_900));
        assert_eq!(tx.kind, TransactionType::Debit);
        assert_eq!(tx.merchant.as_deref(), Some("Amazon"));
        assert_eq!(tx.account_last_four.as_deref(), Some("5678"));
    }

    #[test]
    fn account_debit_reason_is_merchant() {
        let body = "HSBC: A/c XX1234 has been debited with INR 2,500.00- on 10Jan as BILL PAYMENT";
        let tx = parse(body).unwrap();
        assert_eq!(tx.amount, Money::from_cents(250_000));
        assert_eq!(tx.kind, TransactionType::Debit);
        assert_eq!(tx.merchant.as_deref(), Some("Bill Payment"));
        assert_eq!(tx.account_last_four.as_deref(), Some("1234"));
    }

    #[test]
    fn cash_withdrawal_is_labelled() {
        let body = "HSBC: A/c XX1234 has been debited with INR 10,000.00- on 10Jan as CSH WDL";
        let tx = parse(body).unwrap();
        assert_eq!(tx.amount, Money::from_cents(1_000_000));
        assert_eq!(tx.merchant.as_deref(), Some("ATM Withdrawal"));
    }

    #[test]
    fn account_credit_reason_is_merchant() {
        let body = "HSBC: A/c XX1234 has been credited with INR 50,000.00+ on 01Jan as SALARY JAN 2026.";
        let tx = parse(body).unwrap();
        assert_eq!(tx.amount, Money::from_cents(5_000_000));
        assert_eq!(tx.kind, TransactionType::Credit);
        assert_eq!(tx.merchant.as_deref(), Some("Salary Jan 2026"));
    }

    #[test]
    fn informational_messages_are_skipped() {
        assert!(parse("Your OTP for HSBC net banking is 123456. Do not share.").is_none());
        assert!(parse(
            "HSBC Internet Banking will be under scheduled maintenance on 15Jan from 2AM to 5AM."
        )
        .is_none());
    }
}
