use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smsledger_core::{Money, Period, Transaction, TransactionType};

use crate::config::SyncConfig;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Bucket an average gap between charges.
    pub fn from_interval_days(days: f64) -> Self {
        if days <= 2.0 {
            Frequency::Daily
        } else if days <= 10.0 {
            Frequency::Weekly
        } else if days <= 45.0 {
            Frequency::Monthly
        } else {
            Frequency::Yearly
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Yearly => write!(f, "yearly"),
        }
    }
}

/// A merchant the user appears to pay on a schedule. Advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSuggestion {
    pub merchant: String,
    pub average_amount: Money,
    pub count: usize,
    pub frequency: Frequency,
    pub average_interval_days: i64,
}

#[derive(Debug, Default)]
struct MerchantGroup {
    count: usize,
    total: Decimal,
    min: Option<Money>,
    max: Option<Money>,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

impl MerchantGroup {
    fn add(&mut self, amount: Money, at: DateTime<Utc>) {
        self.count += 1;
        self.total += amount.amount();
        self.min = Some(self.min.map_or(amount, |m| m.min(amount)));
        self.max = Some(self.max.map_or(amount, |m| m.max(amount)));
        self.first = Some(self.first.map_or(at, |t| t.min(at)));
        self.last = Some(self.last.map_or(at, |t| t.max(at)));
    }
}

pub struct RecurringDetector {
    window_days: u32,
    max_variance: Decimal,
}

impl Default for RecurringDetector {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}

impl RecurringDetector {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            window_days: config.recurring_window_days,
            max_variance: config.recurring_max_variance,
        }
    }

    /// Suggestions over the trailing window ending at `now`, most frequent
    /// first.
    pub fn detect(&self, history: &[Transaction], now: DateTime<Utc>) -> Vec<RecurringSuggestion> {
        let window = Period::trailing_days(now, self.window_days);
        let mut groups: BTreeMap<&str, MerchantGroup> = BTreeMap::new();
        for tx in history {
            if tx.kind != TransactionType::Debit || !window.contains_inclusive(tx.occurred_at) {
                continue;
            }
            let Some(merchant) = tx.merchant.as_deref().filter(|m| !m.is_empty()) else {
                continue;
            };
            groups.entry(merchant).or_default().add(tx.amount, tx.occurred_at);
        }

        let mut suggestions: Vec<RecurringSuggestion> = groups
            .into_iter()
            .filter_map(|(merchant, group)| self.suggest(merchant, &group))
            .collect();
        suggestions.sort_by(|a, b| b.count.cmp(&a.count));
        suggestions
    }

    fn suggest(&self, merchant: &str, group: &MerchantGroup) -> Option<RecurringSuggestion> {
        if group.count < 2 {
            return None;
        }
        let avg = group.total / Decimal::from(group.count);
        if avg > Decimal::ZERO {
            let spread = group.max?.amount() - group.min?.amount();
            if spread / avg >= self.max_variance {
                return None;
            }
        }

        let span = (group.last? - group.first?).num_seconds() as f64 / SECONDS_PER_DAY;
        let interval = span / (group.count - 1) as f64;

        Some(RecurringSuggestion {
            merchant: merchant.to_string(),
            average_amount: Money::from_decimal(avg),
            count: group.count,
            frequency: Frequency::from_interval_days(interval),
            average_interval_days: interval.round() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use smsledger_core::{NewTransaction, TransactionId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap()
    }

    fn charge(merchant: &str, cents: i64, days_ago: i64) -> Transaction {
        let at = now() - Duration::days(days_ago);
        let tx = NewTransaction::manual(Money::from_cents(cents), TransactionType::Debit, at)
            .with_merchant(merchant);
        Transaction::from_new(TransactionId(days_ago), tx, at)
    }

    #[test]
    fn monthly_subscription_is_suggested() {
        let history = vec![
            charge("Netflix", 49_900, 65),
            charge("Netflix", 49_900, 35),
            charge("Netflix", 50_000, 5),
        ];
        let found = RecurringDetector::default().detect(&history, now());
        assert_eq!(found.len(), 1);
        let s = &found[0];
        assert_eq!(s.merchant, "Netflix");
        assert_eq!(s.count, 3);
        assert_eq!(s.frequency, Frequency::Monthly);
        assert_eq!(s.average_interval_days, 30);
        assert_eq!(s.average_amount, Money::from_cents(49_933));
    }

    #[test]
    fn inconsistent_amounts_are_not_recurring() {
        let history = vec![
            charge("Amazon", 10_000, 60),
            charge("Amazon", 10_000, 30),
            charge("Amazon", 90_000, 1),
        ];
        assert!(RecurringDetector::default().detect(&history, now()).is_empty());
    }

    #[test]
    fn single_charges_and_old_charges_are_ignored() {
        let history = vec![
            charge("Gym", 150_000, 10),
            charge("Gym", 150_000, 200),
            charge("", 1_000, 3),
            charge("", 1_000, 4),
        ];
        assert!(RecurringDetector::default().detect(&history, now()).is_empty());
    }

    #[test]
    fn sorted_by_occurrence_count() {
        let mut history = vec![charge("Spotify", 11_900, 40), charge("Spotify", 11_900, 10)];
        for day in 0..6 {
            history.push(charge("Metro Card", 5_000, day * 7 + 1));
        }
        let found = RecurringDetector::default().detect(&history, now());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].merchant, "Metro Card");
        assert_eq!(found[0].frequency, Frequency::Weekly);
        assert_eq!(found[1].frequency, Frequency::Monthly);
    }

    #[test]
    fn frequency_buckets() {
        assert_eq!(Frequency::from_interval_days(1.0), Frequency::Daily);
        assert_eq!(Frequency::from_interval_days(2.0), Frequency::Daily);
        assert_eq!(Frequency::from_interval_days(7.0), Frequency::Weekly);
        assert_eq!(Frequency::from_interval_days(45.0), Frequency::Monthly);
        assert_eq!(Frequency::from_interval_days(46.0), Frequency::Yearly);
    }
}
