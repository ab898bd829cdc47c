use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One text message as read from the device inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Sender address, e.g. `AX-HDFCBK` or `VM-AXISBK`.
    pub sender: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            received_at,
        }
    }
}
