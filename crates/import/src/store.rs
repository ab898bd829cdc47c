use async_trait::async_trait;
use chrono::Utc;
use smsledger_core::{
    default_tiers, Category, CategoryId, CategoryRule, IgnoreRule, NewTransaction,
    NotificationTier, Transaction, TransactionId, DEFAULT_CATEGORIES,
};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The raw message text is already stored.
    #[error("transaction already recorded")]
    Duplicate,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The ledger and the user-owned configuration collections.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append a transaction. Fails with [`StoreError::Duplicate`] when its
    /// raw message text is already present.
    async fn insert_transaction(&self, tx: &NewTransaction) -> Result<TransactionId, StoreError>;
    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError>;

    async fn list_ignore_rules(&self) -> Result<Vec<IgnoreRule>, StoreError>;
    /// Insert when `rule.id` is `None`, else update. Returns the row id.
    async fn save_ignore_rule(&self, rule: &IgnoreRule) -> Result<i64, StoreError>;
    async fn delete_ignore_rule(&self, id: i64) -> Result<(), StoreError>;

    /// Active and inactive rules, highest priority first.
    async fn list_category_rules(&self) -> Result<Vec<CategoryRule>, StoreError>;
    async fn save_category_rule(&self, rule: &CategoryRule) -> Result<i64, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .list_categories()
            .await?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim())))
    }

    /// Ordered by minimum amount.
    async fn list_notification_tiers(&self) -> Result<Vec<NotificationTier>, StoreError>;
    async fn save_notification_tier(&self, tier: &NotificationTier) -> Result<i64, StoreError>;
}

#[derive(Default)]
struct Ledger {
    transactions: Vec<Transaction>,
    ignore_rules: Vec<IgnoreRule>,
    category_rules: Vec<CategoryRule>,
    categories: Vec<Category>,
    tiers: Vec<NotificationTier>,
    next_id: i64,
}

impl Ledger {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory ledger seeded like a fresh database.
pub struct MemoryLedger {
    inner: Mutex<Ledger>,
    fail_inserts_containing: Option<String>,
    offline: bool,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        let mut ledger = Ledger::default();
        for (name, kind) in DEFAULT_CATEGORIES {
            let id = ledger.next_id();
            ledger.categories.push(Category {
                id: CategoryId(id),
                name: name.to_string(),
                kind: *kind,
            });
        }
        for mut tier in default_tiers() {
            tier.id = Some(ledger.next_id());
            ledger.tiers.push(tier);
        }
        Self {
            inner: Mutex::new(ledger),
            fail_inserts_containing: None,
            offline: false,
        }
    }

    /// Inserts whose raw text contains `needle` fail with a backend error.
    pub fn fail_inserts_containing(mut self, needle: &str) -> Self {
        self.fail_inserts_containing = Some(needle.to_string());
        self
    }

    /// Every call fails with a backend error.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new()
        }
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Backend("ledger offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn insert_transaction(&self, tx: &NewTransaction) -> Result<TransactionId, StoreError> {
        self.check_online()?;
        if let (Some(needle), Some(raw)) = (&self.fail_inserts_containing, &tx.raw_sms) {
            if raw.contains(needle.as_str()) {
                return Err(StoreError::Backend("simulated write failure".to_string()));
            }
        }
        let mut ledger = self.inner.lock().await;
        if tx.raw_sms.is_some()
            && ledger
                .transactions
                .iter()
                .any(|t| t.raw_sms.is_some() && t.raw_sms == tx.raw_sms)
        {
            return Err(StoreError::Duplicate);
        }
        let id = TransactionId(ledger.next_id());
        ledger
            .transactions
            .push(Transaction::from_new(id, tx.clone(), Utc::now()));
        Ok(id)
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        self.check_online()?;
        let mut all = self.inner.lock().await.transactions.clone();
        all.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(all)
    }

    async fn list_ignore_rules(&self) -> Result<Vec<IgnoreRule>, StoreError> {
        self.check_online()?;
        Ok(self.inner.lock().await.ignore_rules.clone())
    }

    async fn save_ignore_rule(&self, rule: &IgnoreRule) -> Result<i64, StoreError> {
        self.check_online()?;
        let mut ledger = self.inner.lock().await;
        match rule.id {
            Some(id) => {
                let slot = ledger
                    .ignore_rules
                    .iter_mut()
                    .find(|r| r.id == Some(id))
                    .ok_or_else(|| StoreError::NotFound(format!("ignore rule {id}")))?;
                *slot = rule.clone();
                Ok(id)
            }
            None => {
                let id = ledger.next_id();
                let mut rule = rule.clone();
                rule.id = Some(id);
                ledger.ignore_rules.push(rule);
                Ok(id)
            }
        }
    }

    async fn delete_ignore_rule(&self, id: i64) -> Result<(), StoreError> {
        self.check_online()?;
        let mut ledger = self.inner.lock().await;
        let before = ledger.ignore_rules.len();
        ledger.ignore_rules.retain(|r| r.id != Some(id));
        if ledger.ignore_rules.len() == before {
            return Err(StoreError::NotFound(format!("ignore rule {id}")));
        }
        Ok(())
    }

    async fn list_category_rules(&self) -> Result<Vec<CategoryRule>, StoreError> {
        self.check_online()?;
        let mut rules = self.inner.lock().await.category_rules.clone();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(rules)
    }

    async fn save_category_rule(&self, rule: &CategoryRule) -> Result<i64, StoreError> {
        self.check_online()?;
        let mut ledger = self.inner.lock().await;
        if !ledger.categories.iter().any(|c| c.id == rule.category_id) {
            return Err(StoreError::NotFound(format!("category {}", rule.category_id)));
        }
        match rule.id {
            Some(id) => {
                let slot = ledger
                    .category_rules
                    .iter_mut()
                    .find(|r| r.id == Some(id))
                    .ok_or_else(|| StoreError::NotFound(format!("category rule {id}")))?;
                *slot = rule.clone();
                Ok(id)
            }
            None => {
                let id = ledger.next_id();
                let mut rule = rule.clone();
                rule.id = Some(id);
                ledger.category_rules.push(rule);
                Ok(id)
            }
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.check_online()?;
        Ok(self.inner.lock().await.categories.clone())
    }

    async fn list_notification_tiers(&self) -> Result<Vec<NotificationTier>, StoreError> {
        self.check_online()?;
        let mut tiers = self.inner.lock().await.tiers.clone();
        tiers.sort_by_key(|t| t.min_amount);
        Ok(tiers)
    }

    async fn save_notification_tier(&self, tier: &NotificationTier) -> Result<i64, StoreError> {
        self.check_online()?;
        let mut ledger = self.inner.lock().await;
        if let Some(slot) = ledger.tiers.iter_mut().find(|t| t.key == tier.key) {
            let id = slot.id.unwrap_or_default();
            *slot = NotificationTier {
                id: slot.id,
                ..tier.clone()
            };
            return Ok(id);
        }
        let id = ledger.next_id();
        ledger.tiers.push(NotificationTier {
            id: Some(id),
            ..tier.clone()
        });
        Ok(id)
    }
}
