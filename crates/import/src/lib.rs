//! The import pipeline: filtering, deduplication, categorization, spending
//! alerts and recurring-charge detection around the parsers in
//! `smsledger-parse`, plus the collaborator traits it talks to.

pub mod anomaly;
pub mod categorize;
pub mod config;
pub mod dedup;
pub mod ignore;
pub mod notify;
pub mod recurring;
pub mod source;
pub mod store;
pub mod sync;

pub use anomaly::{select_tier, tier_alert, AnomalyDetector, SpendingAverage, SpendingStats};
pub use categorize::AutoCategorizer;
pub use config::SyncConfig;
pub use dedup::{DedupGate, DuplicateMatch};
pub use ignore::{is_default_ignored, IgnoreRuleSet};
pub use notify::{Alert, AlertKind, Notifier, NotifyError, RecordingNotifier};
pub use recurring::{Frequency, RecurringDetector, RecurringSuggestion};
pub use source::{MemoryMessageSource, MessageSource, SourceError};
pub use store::{LedgerStore, MemoryLedger, StoreError};
pub use sync::{RuleSet, SyncError, SyncOrchestrator, SyncSummary};
