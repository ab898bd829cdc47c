use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunables for one sync run and the offline detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Two transactions of the same amount closer than this are one event.
    pub duplicate_window_secs: i64,
    pub anomaly_window_days: u32,
    /// A debit above `multiplier × average` is unusual.
    pub anomaly_multiplier: Decimal,
    pub anomaly_min_samples: usize,
    pub recurring_window_days: u32,
    /// Groups whose `(max - min) / avg` reaches this are not recurring.
    pub recurring_max_variance: Decimal,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            duplicate_window_secs: 60,
            anomaly_window_days: 90,
            anomaly_multiplier: Decimal::TWO,
            anomaly_min_samples: 2,
            recurring_window_days: 90,
            recurring_max_variance: Decimal::new(2, 1),
        }
    }
}

impl SyncConfig {
    pub fn duplicate_window(&self) -> Duration {
        Duration::seconds(self.duplicate_window_secs)
    }
}
