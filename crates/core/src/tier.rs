use serde::{Deserialize, Serialize};

use super::money::Money;

/// A user alert threshold. The tier with the highest `min_amount` not above
/// the transaction amount wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationTier {
    pub id: Option<i64>,
    /// Stable key (`normal`, `high`, `critical`) used to update a tier in place.
    pub key: String,
    pub label: String,
    pub min_amount: Money,
    pub enabled: bool,
    pub sound: bool,
}

impl NotificationTier {
    pub fn new(key: &str, label: &str, min_amount: Money) -> Self {
        NotificationTier {
            id: None,
            key: key.to_string(),
            label: label.to_string(),
            min_amount,
            enabled: true,
            sound: true,
        }
    }
}

pub fn default_tiers() -> Vec<NotificationTier> {
    vec![
        NotificationTier::new("normal", "Normal", Money::from_cents(100_000)),
        NotificationTier::new("high", "High", Money::from_cents(500_000)),
        NotificationTier::new("critical", "Critical", Money::from_cents(2_500_000)),
    ]
}
