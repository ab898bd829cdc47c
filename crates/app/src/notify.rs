use smsledger_import::{Alert, Notifier, NotifyError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// Hands alerts to a background task over a bounded channel. Scheduling never
/// waits: a full queue drops the alert.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Alert>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Alert>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// A notifier whose alerts are printed to stdout. The task ends once every
    /// notifier clone is dropped.
    pub fn printing(capacity: usize) -> (Self, JoinHandle<()>) {
        let (notifier, mut rx) = Self::new(capacity);
        let handle = tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                let bell = if alert.sound { "\x07" } else { "" };
                println!("{bell}[{}] {}", alert.title, alert.body);
            }
        });
        (notifier, handle)
    }
}

impl Notifier for ChannelNotifier {
    fn schedule(&self, alert: Alert) -> Result<(), NotifyError> {
        self.tx.try_send(alert).map_err(|e| match e {
            TrySendError::Full(_) => NotifyError::QueueFull,
            TrySendError::Closed(_) => NotifyError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsledger_import::AlertKind;

    fn alert(title: &str) -> Alert {
        Alert {
            kind: AlertKind::UnusualSpending,
            title: title.to_string(),
            body: "₹1,500 at Cafe Mocha".to_string(),
            sound: false,
        }
    }

    #[tokio::test]
    async fn delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new(4);
        notifier.schedule(alert("first")).unwrap();
        notifier.schedule(alert("second")).unwrap();
        assert_eq!(rx.recv().await.unwrap().title, "first");
        assert_eq!(rx.recv().await.unwrap().title, "second");
    }

    #[tokio::test]
    async fn full_queue_does_not_block() {
        let (notifier, _rx) = ChannelNotifier::new(1);
        notifier.schedule(alert("kept")).unwrap();
        assert!(matches!(notifier.schedule(alert("dropped")), Err(NotifyError::QueueFull)));
    }

    #[tokio::test]
    async fn closed_receiver_is_reported() {
        let (notifier, rx) = ChannelNotifier::new(1);
        drop(rx);
        assert!(matches!(notifier.schedule(alert("late")), Err(NotifyError::Closed)));
    }
}
