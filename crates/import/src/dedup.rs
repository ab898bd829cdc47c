use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use smsledger_core::{Money, ParsedTransaction, Transaction};

/// Why a candidate was judged a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub enum DuplicateMatch {
    /// The exact message text is already in the ledger.
    RawText,
    /// Same amount at a nearby instant, typically one alert sent twice over
    /// different channels.
    AmountAndTime { existing_at: DateTime<Utc> },
}

/// The "already seen" set for one sync run.
///
/// Built once from a snapshot of the ledger and extended with every
/// transaction the run commits, so a message repeated later in the same
/// batch is caught too.
pub struct DedupGate {
    raw_texts: HashSet<String>,
    by_amount: HashMap<Money, Vec<DateTime<Utc>>>,
    window: Duration,
}

impl DedupGate {
    pub fn new(existing: &[Transaction], window: Duration) -> Self {
        let mut gate = Self {
            raw_texts: HashSet::new(),
            by_amount: HashMap::new(),
            window,
        };
        for tx in existing {
            gate.insert(tx.raw_sms.as_deref(), tx.amount, tx.occurred_at);
        }
        gate
    }

    pub fn check(&self, candidate: &ParsedTransaction) -> Option<DuplicateMatch> {
        if self.raw_texts.contains(&candidate.raw_sms) {
            return Some(DuplicateMatch::RawText);
        }
        self.by_amount
            .get(&candidate.amount)?
            .iter()
            .copied()
            .find(|at| within(candidate.occurred_at, *at, self.window))
            .map(|existing_at| DuplicateMatch::AmountAndTime { existing_at })
    }

    /// Make a committed candidate visible to later checks.
    pub fn record(&mut self, committed: &ParsedTransaction) {
        self.insert(
            Some(&committed.raw_sms),
            committed.amount,
            committed.occurred_at,
        );
    }

    fn insert(&mut self, raw: Option<&str>, amount: Money, at: DateTime<Utc>) {
        if let Some(raw) = raw {
            self.raw_texts.insert(raw.to_string());
        }
        self.by_amount.entry(amount).or_default().push(at);
    }
}

fn within(a: DateTime<Utc>, b: DateTime<Utc>, window: Duration) -> bool {
    (a - b).num_milliseconds().abs() < window.num_milliseconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use smsledger_core::{NewTransaction, TransactionId, TransactionType};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, s).unwrap()
    }

    fn parsed(cents: i64, when: DateTime<Utc>, raw: &str) -> ParsedTransaction {
        ParsedTransaction {
            amount: Money::from_cents(cents),
            kind: TransactionType::Debit,
            merchant: None,
            account_last_four: None,
            bank_name: None,
            reference_number: None,
            balance: None,
            occurred_at: when,
            raw_sms: raw.to_string(),
        }
    }

    fn stored(cents: i64, when: DateTime<Utc>, raw: Option<&str>) -> Transaction {
        let mut new = NewTransaction::manual(Money::from_cents(cents), TransactionType::Debit, when);
        new.raw_sms = raw.map(str::to_string);
        Transaction::from_new(TransactionId(1), new, when)
    }

    fn gate(existing: &[Transaction]) -> DedupGate {
        DedupGate::new(existing, Duration::seconds(60))
    }

    #[test]
    fn same_raw_text_is_duplicate() {
        let g = gate(&[stored(500, at(9, 0, 0), Some("Rs 5 debited"))]);
        let candidate = parsed(99_900, at(18, 0, 0), "Rs 5 debited");
        assert_eq!(g.check(&candidate), Some(DuplicateMatch::RawText));
    }

    #[test]
    fn same_amount_within_window_is_duplicate() {
        let g = gate(&[stored(25_000, at(9, 0, 0), None)]);
        let candidate = parsed(25_000, at(9, 0, 45), "other channel");
        assert_eq!(
            g.check(&candidate),
            Some(DuplicateMatch::AmountAndTime { existing_at: at(9, 0, 0) })
        );
        let before = parsed(25_000, at(8, 59, 30), "earlier channel");
        assert!(g.check(&before).is_some());
    }

    #[test]
    fn window_edge_and_other_amounts_pass() {
        let g = gate(&[stored(25_000, at(9, 0, 0), None)]);
        assert!(g.check(&parsed(25_000, at(9, 1, 0), "a minute later")).is_none());
        assert!(g.check(&parsed(25_001, at(9, 0, 10), "different amount")).is_none());
    }

    #[test]
    fn recorded_candidates_block_repeats_in_same_run() {
        let mut g = gate(&[]);
        let first = parsed(10_000, at(12, 0, 0), "Rs 100 debited");
        assert!(g.check(&first).is_none());
        g.record(&first);
        assert_eq!(g.check(&first), Some(DuplicateMatch::RawText));
    }
}
