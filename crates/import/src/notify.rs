use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertKind {
    UnusualSpending,
    Tier { key: String },
}

/// A user-visible alert: title and body, plus whether it should make a sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub body: String,
    pub sound: bool,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification queue is full")]
    QueueFull,
    #[error("notification channel closed")]
    Closed,
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Schedules alerts. Implementations must not block: the caller has already
/// committed the transaction and only logs a failure.
pub trait Notifier: Send + Sync {
    fn schedule(&self, alert: Alert) -> Result<(), NotifyError>;
}

/// Keeps every alert in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
    reject: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that refuses every alert.
    pub fn rejecting() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn schedule(&self, alert: Alert) -> Result<(), NotifyError> {
        if self.reject {
            return Err(NotifyError::Rejected(alert.title));
        }
        self.alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(alert);
        Ok(())
    }
}
