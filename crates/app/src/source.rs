use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use smsledger_core::{InboundMessage, Period};
use smsledger_import::{MessageSource, SourceError};

/// One record of an inbox export, as written by common SMS backup apps.
#[derive(Debug, Deserialize)]
struct ExportedMessage {
    address: String,
    body: String,
    /// Epoch milliseconds.
    date: i64,
}

/// Reads a JSON array of exported inbox messages.
pub struct JsonExportSource {
    path: PathBuf,
}

impl JsonExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MessageSource for JsonExportSource {
    async fn read_messages(&self, period: &Period) -> Result<Vec<InboundMessage>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    SourceError::Unavailable(format!("{} not found", self.path.display()))
                }
                ErrorKind::PermissionDenied => SourceError::PermissionDenied,
                _ => SourceError::Io(e),
            })?;
        let exported: Vec<ExportedMessage> =
            serde_json::from_str(&content).map_err(|e| SourceError::Malformed(e.to_string()))?;

        let mut messages = Vec::with_capacity(exported.len());
        for m in exported {
            let Some(received_at) = Utc.timestamp_millis_opt(m.date).single() else {
                tracing::debug!(date = m.date, "skipping message with invalid timestamp");
                continue;
            };
            if period.contains_inclusive(received_at) {
                messages.push(InboundMessage::new(m.address, m.body, received_at));
            }
        }
        messages.sort_by_key(|m| m.received_at);
        tracing::debug!(count = messages.len(), path = %self.path.display(), "read inbox export");
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> Period {
        let now = Utc.with_ymd_and_hms(2026, 4, 10, 0, 0, 0).unwrap();
        Period::trailing_days(now, 7)
    }

    #[tokio::test]
    async fn reads_window_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inbox.json");
        let in_window_late = Utc.with_ymd_and_hms(2026, 4, 9, 8, 0, 0).unwrap();
        let in_window_early = Utc.with_ymd_and_hms(2026, 4, 5, 8, 0, 0).unwrap();
        let too_old = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let json = serde_json::json!([
            {"address": "VM-HDFCBK", "body": "late", "date": in_window_late.timestamp_millis()},
            {"address": "VM-ICICIB", "body": "early", "date": in_window_early.timestamp_millis()},
            {"address": "VM-SBIINB", "body": "old", "date": too_old.timestamp_millis()},
        ]);
        std::fs::write(&path, json.to_string()).unwrap();

        let messages = JsonExportSource::new(&path).read_messages(&period()).await.unwrap();
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["early", "late"]);
        assert_eq!(messages[0].sender, "VM-ICICIB");
    }

    #[tokio::test]
    async fn missing_export_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonExportSource::new(dir.path().join("nope.json"))
            .read_messages(&period())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inbox.json");
        std::fs::write(&path, "{\"not\": \"a list\"}").unwrap();
        let err = JsonExportSource::new(&path).read_messages(&period()).await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}
