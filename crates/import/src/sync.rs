//! End-to-end import of one batch of inbox messages.

use std::sync::Arc;

use smsledger_core::{Clock, NewTransaction, NotificationTier, Period, SystemClock};
use smsledger_parse::ParserRouter;
use thiserror::Error;

use crate::anomaly::{tier_alert, AnomalyDetector, SpendingStats};
use crate::categorize::AutoCategorizer;
use crate::config::SyncConfig;
use crate::dedup::DedupGate;
use crate::ignore::{is_default_ignored, IgnoreRuleSet};
use crate::notify::{Alert, Notifier};
use crate::source::{MessageSource, SourceError};
use crate::store::{LedgerStore, StoreError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cannot read messages: {0}")]
    Source(#[from] SourceError),
    #[error("cannot load ledger: {0}")]
    Store(#[from] StoreError),
}

/// Aggregate outcome of a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub imported: usize,
    /// Ignored, unparsable or duplicate.
    pub skipped: usize,
    /// Persistence failures.
    pub errors: usize,
}

/// Everything user-configurable a run needs, loaded once up front.
pub struct RuleSet {
    pub ignore: IgnoreRuleSet,
    pub categorizer: AutoCategorizer,
    pub tiers: Vec<NotificationTier>,
}

enum Outcome {
    Imported,
    Skipped,
    Failed,
}

/// Drives read → filter → parse → dedupe → categorize → persist → notify.
pub struct SyncOrchestrator<S: MessageSource, L: LedgerStore, N: Notifier> {
    source: S,
    store: L,
    notifier: N,
    router: ParserRouter,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
}

impl<S: MessageSource, L: LedgerStore, N: Notifier> SyncOrchestrator<S, L, N> {
    pub fn new(source: S, store: L, notifier: N) -> Self {
        Self {
            source,
            store,
            notifier,
            router: ParserRouter::new(),
            config: SyncConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_router(mut self, router: ParserRouter) -> Self {
        self.router = router;
        self
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub async fn load_rules(&self) -> Result<RuleSet, StoreError> {
        let ignore = IgnoreRuleSet::new(self.store.list_ignore_rules().await?);
        let categories = self.store.list_categories().await?;
        let categorizer =
            AutoCategorizer::new(self.store.list_category_rules().await?, &categories);
        let tiers = self.store.list_notification_tiers().await?;
        Ok(RuleSet {
            ignore,
            categorizer,
            tiers,
        })
    }

    pub async fn sync_transactions(&self, days_back: u32) -> Result<SyncSummary, SyncError> {
        self.sync_with_progress(days_back, |_, _| {}).await
    }

    /// Like [`sync_transactions`](Self::sync_transactions), calling
    /// `on_progress(done, total)` after each message.
    pub async fn sync_with_progress(
        &self,
        days_back: u32,
        mut on_progress: impl FnMut(usize, usize) + Send,
    ) -> Result<SyncSummary, SyncError> {
        let rules = self.load_rules().await?;
        let now = self.clock.now();
        let messages = self
            .source
            .read_messages(&Period::trailing_days(now, days_back))
            .await?;
        let existing = self.store.list_transactions().await?;

        tracing::info!(
            messages = messages.len(),
            days_back,
            ignore_rules = rules.ignore.len(),
            "sync started"
        );

        let mut gate = DedupGate::new(&existing, self.config.duplicate_window());
        let mut stats = SpendingStats::from_history(
            &existing,
            Period::trailing_days(now, self.config.anomaly_window_days),
        );
        let detector = AnomalyDetector::new(&self.config);

        let mut summary = SyncSummary::default();
        let total = messages.len();
        for (i, message) in messages.iter().enumerate() {
            let outcome = if is_default_ignored(message) || rules.ignore.should_ignore(message) {
                tracing::debug!(sender = %message.sender, "ignored");
                Outcome::Skipped
            } else if let Some(parsed) = self.router.parse(message) {
                if let Some(found) = gate.check(&parsed) {
                    tracing::debug!(sender = %message.sender, ?found, "duplicate");
                    Outcome::Skipped
                } else {
                    let category_id = rules
                        .categorizer
                        .categorize(parsed.merchant.as_deref(), &parsed.raw_sms);
                    let tx = NewTransaction::from_parsed(parsed.clone(), category_id);
                    match self.store.insert_transaction(&tx).await {
                        Ok(id) => {
                            tracing::debug!(id = id.0, amount = %tx.amount, "imported");
                            gate.record(&parsed);
                            self.after_commit(&detector, &stats, &rules.tiers, &tx);
                            stats.record_new(&tx);
                            Outcome::Imported
                        }
                        Err(StoreError::Duplicate) => {
                            tracing::debug!(sender = %message.sender, "duplicate rejected by store");
                            gate.record(&parsed);
                            Outcome::Skipped
                        }
                        Err(e) => {
                            tracing::warn!(sender = %message.sender, error = %e, "failed to save transaction");
                            Outcome::Failed
                        }
                    }
                }
            } else {
                tracing::debug!(sender = %message.sender, "not a transaction");
                Outcome::Skipped
            };

            match outcome {
                Outcome::Imported => summary.imported += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Failed => summary.errors += 1,
            }
            on_progress(i + 1, total);
        }

        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            errors = summary.errors,
            "sync finished"
        );
        Ok(summary)
    }

    fn after_commit(
        &self,
        detector: &AnomalyDetector,
        stats: &SpendingStats,
        tiers: &[NotificationTier],
        tx: &NewTransaction,
    ) {
        let alerts = [detector.check(stats, tx), tier_alert(tiers, tx)];
        for alert in alerts.into_iter().flatten() {
            self.send(alert);
        }
    }

    fn send(&self, alert: Alert) {
        let title = alert.title.clone();
        if let Err(e) = self.notifier.schedule(alert) {
            tracing::warn!(%title, error = %e, "failed to schedule alert");
        }
    }
}
