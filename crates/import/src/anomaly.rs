//! Post-commit spending checks: unusual amounts against trailing averages,
//! and user-configured amount tiers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use smsledger_core::{
    CategoryId, Money, NewTransaction, NotificationTier, Period, Transaction, TransactionType,
};

use crate::config::SyncConfig;
use crate::notify::{Alert, AlertKind};

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    total: Decimal,
    count: usize,
}

impl Tally {
    fn add(&mut self, amount: Money) {
        self.total += amount.amount();
        self.count += 1;
    }

    fn mean(&self) -> Option<Decimal> {
        (self.count > 0).then(|| self.total / Decimal::from(self.count))
    }
}

/// Trailing-window mean of prior debits and the sample it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingAverage {
    pub mean: Decimal,
    pub count: usize,
}

/// Debit totals per category and per merchant over a trailing window.
///
/// Derived from the ledger snapshot at the start of a run and updated as the
/// run commits, so each transaction is compared only against what came
/// before it.
#[derive(Debug, Clone)]
pub struct SpendingStats {
    window: Period,
    by_category: HashMap<CategoryId, Tally>,
    by_merchant: HashMap<String, Tally>,
}

impl SpendingStats {
    pub fn new(window: Period) -> Self {
        Self {
            window,
            by_category: HashMap::new(),
            by_merchant: HashMap::new(),
        }
    }

    pub fn from_history(history: &[Transaction], window: Period) -> Self {
        let mut stats = Self::new(window);
        for tx in history {
            stats.record(
                tx.kind,
                tx.category_id,
                tx.merchant.as_deref(),
                tx.amount,
                tx.occurred_at,
            );
        }
        stats
    }

    pub fn record(
        &mut self,
        kind: TransactionType,
        category_id: Option<CategoryId>,
        merchant: Option<&str>,
        amount: Money,
        at: DateTime<Utc>,
    ) {
        if kind != TransactionType::Debit || !self.window.contains_inclusive(at) {
            return;
        }
        if let Some(id) = category_id {
            self.by_category.entry(id).or_default().add(amount);
        }
        if let Some(m) = merchant.filter(|m| !m.is_empty()) {
            self.by_merchant.entry(m.to_string()).or_default().add(amount);
        }
    }

    pub fn record_new(&mut self, tx: &NewTransaction) {
        self.record(
            tx.kind,
            tx.category_id,
            tx.merchant.as_deref(),
            tx.amount,
            tx.occurred_at,
        );
    }

    /// The category average when it has enough samples, else the merchant's.
    pub fn average(
        &self,
        category_id: Option<CategoryId>,
        merchant: Option<&str>,
        min_samples: usize,
    ) -> Option<SpendingAverage> {
        let enough = |t: &Tally| {
            let mean = t.mean()?;
            (t.count >= min_samples && mean > Decimal::ZERO).then_some(SpendingAverage {
                mean,
                count: t.count,
            })
        };
        category_id
            .and_then(|id| self.by_category.get(&id))
            .and_then(enough)
            .or_else(|| merchant.and_then(|m| self.by_merchant.get(m)).and_then(enough))
    }
}

/// Flags debits well above what the user usually spends in that category.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    multiplier: Decimal,
    min_samples: usize,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}

impl AnomalyDetector {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            multiplier: config.anomaly_multiplier,
            min_samples: config.anomaly_min_samples,
        }
    }

    pub fn check(&self, stats: &SpendingStats, tx: &NewTransaction) -> Option<Alert> {
        if tx.kind != TransactionType::Debit {
            return None;
        }
        let avg = stats.average(tx.category_id, tx.merchant.as_deref(), self.min_samples)?;
        if tx.amount.amount() <= avg.mean * self.multiplier {
            return None;
        }
        let label = tx.merchant.as_deref().unwrap_or("transaction");
        Some(Alert {
            kind: AlertKind::UnusualSpending,
            title: "Unusual Spending Alert".to_string(),
            body: format!(
                "{} at {} is significantly higher than your average of {}",
                tx.amount,
                label,
                Money::from_decimal(avg.mean.round())
            ),
            sound: true,
        })
    }
}

/// The enabled tier with the highest minimum not above `amount`.
pub fn select_tier(tiers: &[NotificationTier], amount: Money) -> Option<&NotificationTier> {
    tiers
        .iter()
        .filter(|t| t.enabled && t.min_amount <= amount)
        .max_by_key(|t| t.min_amount)
}

pub fn tier_alert(tiers: &[NotificationTier], tx: &NewTransaction) -> Option<Alert> {
    if tx.kind != TransactionType::Debit {
        return None;
    }
    let tier = select_tier(tiers, tx.amount)?;
    let body = match tx.merchant.as_deref() {
        Some(m) => format!("{} spent at {} (above {})", tx.amount, m, tier.min_amount),
        None => format!("{} spent (above {})", tx.amount, tier.min_amount),
    };
    Some(Alert {
        kind: AlertKind::Tier {
            key: tier.key.clone(),
        },
        title: tier.label.clone(),
        body,
        sound: tier.sound,
    })
}
