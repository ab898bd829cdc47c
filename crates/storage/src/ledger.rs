use std::path::Path;

use async_trait::async_trait;
use smsledger_core::{
    Category, CategoryRule, IgnoreRule, NewTransaction, NotificationTier, Transaction,
    TransactionId,
};
use smsledger_import::{LedgerStore, StoreError};

use crate::db::{self, DbPool};

/// Map a driver error onto the ledger's error vocabulary. `what` names the
/// row for not-found errors.
fn store_error(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match err {
        sqlx::Error::Database(ref e) if e.is_unique_violation() => StoreError::Duplicate,
        sqlx::Error::Database(ref e) if e.is_foreign_key_violation() => {
            StoreError::NotFound(what())
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(what()),
        sqlx::Error::Decode(e) => StoreError::Corrupt(e.to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    store_error(err, || "row".to_string())
}

/// The ledger persisted in a SQLite file.
#[derive(Clone)]
pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    /// Open (creating and seeding if needed) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let pool = db::create_db(path).await.map_err(backend)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn insert_transaction(&self, tx: &NewTransaction) -> Result<TransactionId, StoreError> {
        db::insert_transaction(&self.pool, tx)
            .await
            .map_err(|e| match tx.category_id {
                Some(id) => store_error(e, || format!("category {id}")),
                None => backend(e),
            })
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        db::get_transactions(&self.pool).await.map_err(backend)
    }

    async fn list_ignore_rules(&self) -> Result<Vec<IgnoreRule>, StoreError> {
        db::get_ignore_rules(&self.pool).await.map_err(backend)
    }

    async fn save_ignore_rule(&self, rule: &IgnoreRule) -> Result<i64, StoreError> {
        db::save_ignore_rule(&self.pool, rule)
            .await
            .map_err(|e| store_error(e, || format!("ignore rule {}", rule.id.unwrap_or_default())))
    }

    async fn delete_ignore_rule(&self, id: i64) -> Result<(), StoreError> {
        db::delete_ignore_rule(&self.pool, id)
            .await
            .map_err(|e| store_error(e, || format!("ignore rule {id}")))
    }

    async fn list_category_rules(&self) -> Result<Vec<CategoryRule>, StoreError> {
        db::get_category_rules(&self.pool).await.map_err(backend)
    }

    async fn save_category_rule(&self, rule: &CategoryRule) -> Result<i64, StoreError> {
        db::save_category_rule(&self.pool, rule)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => StoreError::NotFound(format!(
                    "category rule {}",
                    rule.id.unwrap_or_default()
                )),
                other => store_error(other, || format!("category {}", rule.category_id)),
            })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        db::get_categories(&self.pool).await.map_err(backend)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        db::get_category_by_name(&self.pool, name)
            .await
            .map_err(backend)
    }

    async fn list_notification_tiers(&self) -> Result<Vec<NotificationTier>, StoreError> {
        db::get_notification_tiers(&self.pool).await.map_err(backend)
    }

    async fn save_notification_tier(&self, tier: &NotificationTier) -> Result<i64, StoreError> {
        db::save_notification_tier(&self.pool, tier)
            .await
            .map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use smsledger_core::{
        CategoryId, FixedClock, IgnoreRuleKind, InboundMessage, Money, TransactionSource,
        TransactionType, DEFAULT_CATEGORIES,
    };
    use smsledger_import::{MemoryMessageSource, RecordingNotifier, SyncOrchestrator};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn open_temp() -> (TempDir, SqliteLedger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SqliteLedger::open(&dir.path().join("ledger.db")).await.unwrap();
        (dir, ledger)
    }

    fn sms_tx(raw: &str, cents: i64) -> NewTransaction {
        let mut tx = NewTransaction::manual(
            Money::from_cents(cents),
            TransactionType::Debit,
            Utc.with_ymd_and_hms(2026, 3, 14, 9, 15, 0).unwrap(),
        )
        .with_merchant("Swiggy");
        tx.source = TransactionSource::Sms;
        tx.raw_sms = Some(raw.to_string());
        tx.reference_number = Some("123456789012".to_string());
        tx.balance = Some(Money::from_cents(1_234_550));
        tx
    }

    #[tokio::test]
    async fn fresh_database_is_seeded() {
        let (_dir, ledger) = open_temp().await;
        let categories = ledger.list_categories().await.unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        let tiers = ledger.list_notification_tiers().await.unwrap();
        let keys: Vec<&str> = tiers.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["normal", "high", "critical"]);
        assert_eq!(tiers[0].min_amount, Money::from_cents(100_000));
    }

    #[tokio::test]
    async fn reopening_keeps_user_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        {
            let ledger = SqliteLedger::open(&path).await.unwrap();
            let mut tier = NotificationTier::new("normal", "Heads up", Money::from_cents(200_000));
            tier.sound = false;
            ledger.save_notification_tier(&tier).await.unwrap();
            ledger.pool().close().await;
        }
        let ledger = SqliteLedger::open(&path).await.unwrap();
        let tiers = ledger.list_notification_tiers().await.unwrap();
        assert_eq!(tiers.len(), 3);
        let normal = tiers.iter().find(|t| t.key == "normal").unwrap();
        assert_eq!(normal.label, "Heads up");
        assert!(!normal.sound);
        assert_eq!(
            ledger.list_categories().await.unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
    }

    #[tokio::test]
    async fn transaction_round_trips() {
        let (_dir, ledger) = open_temp().await;
        let food = ledger
            .find_category_by_name("FOOD & DINING")
            .await
            .unwrap()
            .unwrap();
        let tx = sms_tx("Rs.450.50 debited from a/c XX1234 to SWIGGY", 45_050).with_category(food.id);
        let id = ledger.insert_transaction(&tx).await.unwrap();

        let stored = ledger.list_transactions().await.unwrap();
        assert_eq!(stored.len(), 1);
        let row = &stored[0];
        assert_eq!(row.id, id);
        assert_eq!(row.amount, Money::from_cents(45_050));
        assert_eq!(row.kind, TransactionType::Debit);
        assert_eq!(row.occurred_at, tx.occurred_at);
        assert_eq!(row.category_id, Some(food.id));
        assert_eq!(row.balance, Some(Money::from_cents(1_234_550)));
        assert_eq!(row.source, TransactionSource::Sms);
        assert_eq!(row.raw_sms, tx.raw_sms);
    }

    #[tokio::test]
    async fn duplicate_raw_text_is_rejected() {
        let (_dir, ledger) = open_temp().await;
        ledger.insert_transaction(&sms_tx("same text", 100)).await.unwrap();
        let err = ledger
            .insert_transaction(&sms_tx("same text", 100))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        let manual = NewTransaction::manual(Money::from_cents(100), TransactionType::Credit, Utc::now());
        ledger.insert_transaction(&manual).await.unwrap();
        ledger.insert_transaction(&manual).await.unwrap();
        assert_eq!(ledger.list_transactions().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn ignore_rules_keep_insertion_order() {
        let (_dir, ledger) = open_temp().await;
        let first = ledger
            .save_ignore_rule(&IgnoreRule::new(IgnoreRuleKind::Sender, "JIOINF"))
            .await
            .unwrap();
        ledger
            .save_ignore_rule(&IgnoreRule::new(IgnoreRuleKind::Regex, r"win\s+\d+"))
            .await
            .unwrap();

        let mut rules = ledger.list_ignore_rules().await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, Some(first));
        assert_eq!(rules[1].kind, IgnoreRuleKind::Regex);

        rules[0].is_active = false;
        ledger.save_ignore_rule(&rules[0]).await.unwrap();
        assert!(!ledger.list_ignore_rules().await.unwrap()[0].is_active);

        ledger.delete_ignore_rule(first).await.unwrap();
        let err = ledger.delete_ignore_rule(first).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn category_rules_sorted_and_checked() {
        let (_dir, ledger) = open_temp().await;
        let gifts = ledger.find_category_by_name("Gifts").await.unwrap().unwrap();
        ledger
            .save_category_rule(&CategoryRule::new("ferns", gifts.id, 1))
            .await
            .unwrap();
        ledger
            .save_category_rule(&CategoryRule::new("swiggy", gifts.id, 10))
            .await
            .unwrap();
        let rules = ledger.list_category_rules().await.unwrap();
        assert_eq!(rules[0].pattern, "swiggy");
        assert_eq!(rules[1].pattern, "ferns");

        let err = ledger
            .save_category_rule(&CategoryRule::new("x", CategoryId(9_999), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn sync_twice_against_sqlite_imports_once() {
        let (_dir, ledger) = open_temp().await;
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 15, 0).unwrap();
        let inbox = vec![
            InboundMessage::new(
                "AX-HDFCBK",
                "Rs.500.00 debited from a/c **1234 on 14-03-26 to VPA zomato@hdfcbank (UPI Ref No 612345678903)",
                at,
            ),
            InboundMessage::new("AD-OFFERS", "Flat 50% off this weekend! Shop now", at),
        ];
        let sync = SyncOrchestrator::new(
            MemoryMessageSource::new(inbox),
            ledger,
            RecordingNotifier::new(),
        )
        .with_clock(Arc::new(FixedClock::new(at + chrono::Duration::hours(1))));

        let first = sync.sync_transactions(30).await.unwrap();
        assert_eq!(first.imported, 1);
        let second = sync.sync_transactions(30).await.unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(sync.store().list_transactions().await.unwrap().len(), 1);
    }
}
