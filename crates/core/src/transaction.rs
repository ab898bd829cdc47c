use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::category::CategoryId;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Debit => write!(f, "debit"),
            TransactionType::Credit => write!(f, "credit"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(TransactionType::Debit),
            "credit" => Ok(TransactionType::Credit),
            other => Err(format!("Unknown transaction type: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    Sms,
    Manual,
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionSource::Sms => write!(f, "sms"),
            TransactionSource::Manual => write!(f, "manual"),
        }
    }
}

impl FromStr for TransactionSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sms" => Ok(TransactionSource::Sms),
            "manual" => Ok(TransactionSource::Manual),
            other => Err(format!("Unknown transaction source: '{other}'")),
        }
    }
}

/// What a bank parser recovered from a single message. Never mutated after
/// the parser returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub amount: Money,
    pub kind: TransactionType,
    pub merchant: Option<String>,
    pub account_last_four: Option<String>,
    pub bank_name: Option<String>,
    pub reference_number: Option<String>,
    /// Available balance quoted alongside the transaction, if any.
    pub balance: Option<Money>,
    pub occurred_at: DateTime<Utc>,
    pub raw_sms: String,
}

/// A transaction ready to be written to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: Money,
    pub kind: TransactionType,
    pub occurred_at: DateTime<Utc>,
    pub merchant: Option<String>,
    pub category_id: Option<CategoryId>,
    pub account_last_four: Option<String>,
    pub bank_name: Option<String>,
    pub reference_number: Option<String>,
    pub balance: Option<Money>,
    pub notes: Option<String>,
    pub source: TransactionSource,
    pub raw_sms: Option<String>,
}

impl NewTransaction {
    pub fn from_parsed(parsed: ParsedTransaction, category_id: Option<CategoryId>) -> Self {
        NewTransaction {
            amount: parsed.amount,
            kind: parsed.kind,
            occurred_at: parsed.occurred_at,
            merchant: parsed.merchant,
            category_id,
            account_last_four: parsed.account_last_four,
            bank_name: parsed.bank_name,
            reference_number: parsed.reference_number,
            balance: parsed.balance,
            notes: None,
            source: TransactionSource::Sms,
            raw_sms: Some(parsed.raw_sms),
        }
    }

    pub fn manual(amount: Money, kind: TransactionType, occurred_at: DateTime<Utc>) -> Self {
        NewTransaction {
            amount,
            kind,
            occurred_at,
            merchant: None,
            category_id: None,
            account_last_four: None,
            bank_name: None,
            reference_number: None,
            balance: None,
            notes: None,
            source: TransactionSource::Manual,
            raw_sms: None,
        }
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// A committed ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Money,
    pub kind: TransactionType,
    pub occurred_at: DateTime<Utc>,
    pub merchant: Option<String>,
    pub category_id: Option<CategoryId>,
    pub account_last_four: Option<String>,
    pub bank_name: Option<String>,
    pub reference_number: Option<String>,
    pub balance: Option<Money>,
    pub notes: Option<String>,
    pub source: TransactionSource,
    pub raw_sms: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn from_new(id: TransactionId, tx: NewTransaction, created_at: DateTime<Utc>) -> Self {
        Transaction {
            id,
            amount: tx.amount,
            kind: tx.kind,
            occurred_at: tx.occurred_at,
            merchant: tx.merchant,
            category_id: tx.category_id,
            account_last_four: tx.account_last_four,
            bank_name: tx.bank_name,
            reference_number: tx.reference_number,
            balance: tx.balance,
            notes: tx.notes,
            source: tx.source,
            raw_sms: tx.raw_sms,
            created_at,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.kind == TransactionType::Debit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parsed() -> ParsedTransaction {
        ParsedTransaction {
            amount: Money::from_cents(49_900),
            kind: TransactionType::Debit,
            merchant: Some("Netflix".to_string()),
            account_last_four: Some("1234".to_string()),
            bank_name: Some("HDFC Bank".to_string()),
            reference_number: Some("412345678901".to_string()),
            balance: None,
            occurred_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            raw_sms: "Rs.499 debited".to_string(),
        }
    }

    #[test]
    fn type_round_trips_through_strings() {
        assert_eq!("DEBIT".parse::<TransactionType>().unwrap(), TransactionType::Debit);
        assert_eq!(TransactionType::Credit.to_string(), "credit");
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn source_round_trips_through_strings() {
        assert_eq!("sms".parse::<TransactionSource>().unwrap(), TransactionSource::Sms);
        assert_eq!(TransactionSource::Manual.to_string(), "manual");
    }

    #[test]
    fn from_parsed_keeps_raw_text_and_tags_sms() {
        let tx = NewTransaction::from_parsed(parsed(), Some(CategoryId(7)));
        assert_eq!(tx.source, TransactionSource::Sms);
        assert_eq!(tx.raw_sms.as_deref(), Some("Rs.499 debited"));
        assert_eq!(tx.category_id, Some(CategoryId(7)));
        assert_eq!(tx.merchant.as_deref(), Some("Netflix"));
    }

    #[test]
    fn manual_entry_has_no_raw_text() {
        let tx = NewTransaction::manual(
            Money::from_cents(10_000),
            TransactionType::Credit,
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        )
        .with_merchant("Cash");
        assert_eq!(tx.source, TransactionSource::Manual);
        assert!(tx.raw_sms.is_none());
        assert_eq!(tx.merchant.as_deref(), Some("Cash"));
    }

    #[test]
    fn serde_uses_snake_case_tags() {
        let json = serde_json::to_string(&TransactionType::Debit).unwrap();
        assert_eq!(json, "\"debit\"");
    }
}
