use async_trait::async_trait;
use smsledger_core::{InboundMessage, Period};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("message source unavailable: {0}")]
    Unavailable(String),
    #[error("permission to read messages denied")]
    PermissionDenied,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed message export: {0}")]
    Malformed(String),
}

/// Bulk read access to the device inbox.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Every message received inside `period`, oldest first.
    async fn read_messages(&self, period: &Period) -> Result<Vec<InboundMessage>, SourceError>;
}

/// A fixed message list.
#[derive(Debug, Clone, Default)]
pub struct MemoryMessageSource {
    messages: Vec<InboundMessage>,
    unavailable: Option<String>,
}

impl MemoryMessageSource {
    pub fn new(messages: Vec<InboundMessage>) -> Self {
        Self {
            messages,
            unavailable: None,
        }
    }

    /// A source whose every read fails.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            messages: Vec::new(),
            unavailable: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl MessageSource for MemoryMessageSource {
    async fn read_messages(&self, period: &Period) -> Result<Vec<InboundMessage>, SourceError> {
        if let Some(reason) = &self.unavailable {
            return Err(SourceError::Unavailable(reason.clone()));
        }
        let mut messages: Vec<InboundMessage> = self
            .messages
            .iter()
            .filter(|m| period.contains_inclusive(m.received_at))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.received_at);
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn filters_to_period_in_order() {
        let now = Utc.with_ymd_and_hms(2026, 4, 30, 0, 0, 0).unwrap();
        let source = MemoryMessageSource::new(vec![
            InboundMessage::new("A", "newer", now - Duration::days(1)),
            InboundMessage::new("A", "too old", now - Duration::days(40)),
            InboundMessage::new("A", "older", now - Duration::days(2)),
        ]);
        let got = source
            .read_messages(&Period::trailing_days(now, 30))
            .await
            .unwrap();
        let bodies: Vec<&str> = got.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["older", "newer"]);
    }

    #[tokio::test]
    async fn unavailable_source_errors() {
        let now = Utc.with_ymd_and_hms(2026, 4, 30, 0, 0, 0).unwrap();
        let err = MemoryMessageSource::unavailable("no permission")
            .read_messages(&Period::trailing_days(now, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
