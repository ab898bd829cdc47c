use chrono::{DateTime, TimeZone, Utc};
use smsledger_core::{
    default_tiers, Category, CategoryId, CategoryRule, IgnoreRule, Money, NewTransaction,
    NotificationTier, Transaction, TransactionId, DEFAULT_CATEGORIES,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;

use crate::hash::raw_sms_hash;

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;
    seed_defaults(&pool).await?;
    tracing::debug!(path = %path.display(), "ledger database ready");

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount_cents INTEGER NOT NULL,
            kind TEXT NOT NULL,
            occurred_at INTEGER NOT NULL,
            merchant TEXT,
            category_id INTEGER REFERENCES categories(id),
            account_last_four TEXT,
            bank_name TEXT,
            reference_number TEXT,
            balance_cents INTEGER,
            notes TEXT,
            source TEXT NOT NULL,
            raw_sms TEXT,
            raw_sms_hash TEXT UNIQUE,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_occurred_at ON transactions(occurred_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS category_rules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pattern TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES categories(id),
            priority INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ignore_rules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            pattern TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notification_tiers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT NOT NULL UNIQUE,
            label TEXT NOT NULL,
            min_amount_cents INTEGER NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            sound INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Default categories and tiers. Rows the user already has are left alone.
pub async fn seed_defaults(pool: &DbPool) -> Result<(), sqlx::Error> {
    for (name, kind) in DEFAULT_CATEGORIES {
        sqlx::query("INSERT OR IGNORE INTO categories (name, kind) VALUES (?, ?)")
            .bind(*name)
            .bind(kind.to_string())
            .execute(pool)
            .await?;
    }
    for tier in default_tiers() {
        sqlx::query(
            "INSERT OR IGNORE INTO notification_tiers (key, label, min_amount_cents, enabled, sound) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&tier.key)
        .bind(&tier.label)
        .bind(tier.min_amount.to_cents())
        .bind(tier.enabled as i64)
        .bind(tier.sound as i64)
        .execute(pool)
        .await?;
    }
    Ok(())
}

fn corrupt(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| corrupt(format!("timestamp out of range: {ms}")))
}

// ── Transactions ──

type TransactionRow = (
    i64,
    i64,
    String,
    i64,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    String,
    Option<String>,
    i64,
);

fn transaction_from_row(r: TransactionRow) -> Result<Transaction, sqlx::Error> {
    Ok(Transaction {
        id: TransactionId(r.0),
        amount: Money::from_cents(r.1),
        kind: r.2.parse().map_err(corrupt)?,
        occurred_at: from_millis(r.3)?,
        merchant: r.4,
        category_id: r.5.map(CategoryId),
        account_last_four: r.6,
        bank_name: r.7,
        reference_number: r.8,
        balance: r.9.map(Money::from_cents),
        notes: r.10,
        source: r.11.parse().map_err(corrupt)?,
        raw_sms: r.12,
        created_at: from_millis(r.13)?,
    })
}

/// Fails with a unique violation when the raw text is already stored.
pub async fn insert_transaction(
    pool: &DbPool,
    tx: &NewTransaction,
) -> Result<TransactionId, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO transactions (
            amount_cents, kind, occurred_at, merchant, category_id, account_last_four,
            bank_name, reference_number, balance_cents, notes, source, raw_sms,
            raw_sms_hash, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tx.amount.to_cents())
    .bind(tx.kind.to_string())
    .bind(tx.occurred_at.timestamp_millis())
    .bind(&tx.merchant)
    .bind(tx.category_id.map(|c| c.0))
    .bind(&tx.account_last_four)
    .bind(&tx.bank_name)
    .bind(&tx.reference_number)
    .bind(tx.balance.map(Money::to_cents))
    .bind(&tx.notes)
    .bind(tx.source.to_string())
    .bind(&tx.raw_sms)
    .bind(tx.raw_sms.as_deref().map(raw_sms_hash))
    .bind(Utc::now().timestamp_millis())
    .execute(pool)
    .await?;

    Ok(TransactionId(result.last_insert_rowid()))
}

/// Newest first.
pub async fn get_transactions(pool: &DbPool) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT id, amount_cents, kind, occurred_at, merchant, category_id, account_last_four,
               bank_name, reference_number, balance_cents, notes, source, raw_sms, created_at
        FROM transactions
        ORDER BY occurred_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(transaction_from_row).collect()
}

// ── Categories ──

pub async fn get_categories(pool: &DbPool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, name, kind FROM categories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(Category {
                id: CategoryId(r.0),
                name: r.1,
                kind: r.2.parse().map_err(corrupt)?,
            })
        })
        .collect()
}

pub async fn get_category_by_name(
    pool: &DbPool,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, name, kind FROM categories WHERE name = ? COLLATE NOCASE",
    )
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;

    row.map(|r| {
        Ok(Category {
            id: CategoryId(r.0),
            name: r.1,
            kind: r.2.parse().map_err(corrupt)?,
        })
    })
    .transpose()
}

// ── Category rules ──

pub async fn get_category_rules(pool: &DbPool) -> Result<Vec<CategoryRule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, i64, i64, i64)>(
        "SELECT id, pattern, category_id, priority, is_active FROM category_rules ORDER BY priority DESC, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| CategoryRule {
            id: Some(r.0),
            pattern: r.1,
            category_id: CategoryId(r.2),
            priority: r.3 as i32,
            is_active: r.4 != 0,
        })
        .collect())
}

pub async fn save_category_rule(pool: &DbPool, rule: &CategoryRule) -> Result<i64, sqlx::Error> {
    match rule.id {
        Some(id) => {
            let result = sqlx::query(
                "UPDATE category_rules SET pattern = ?, category_id = ?, priority = ?, is_active = ? WHERE id = ?",
            )
            .bind(&rule.pattern)
            .bind(rule.category_id.0)
            .bind(rule.priority as i64)
            .bind(rule.is_active as i64)
            .bind(id)
            .execute(pool)
            .await?;
            if result.rows_affected() == 0 {
                return Err(sqlx::Error::RowNotFound);
            }
            Ok(id)
        }
        None => {
            let result = sqlx::query(
                "INSERT INTO category_rules (pattern, category_id, priority, is_active) VALUES (?, ?, ?, ?)",
            )
            .bind(&rule.pattern)
            .bind(rule.category_id.0)
            .bind(rule.priority as i64)
            .bind(rule.is_active as i64)
            .execute(pool)
            .await?;
            Ok(result.last_insert_rowid())
        }
    }
}

// ── Ignore rules ──

/// In insertion order, which is also evaluation order.
pub async fn get_ignore_rules(pool: &DbPool) -> Result<Vec<IgnoreRule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, i64)>(
        "SELECT id, kind, pattern, is_active FROM ignore_rules ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            Ok(IgnoreRule {
                id: Some(r.0),
                kind: r.1.parse().map_err(corrupt)?,
                pattern: r.2,
                is_active: r.3 != 0,
            })
        })
        .collect()
}

pub async fn save_ignore_rule(pool: &DbPool, rule: &IgnoreRule) -> Result<i64, sqlx::Error> {
    match rule.id {
        Some(id) => {
            let result =
                sqlx::query("UPDATE ignore_rules SET kind = ?, pattern = ?, is_active = ? WHERE id = ?")
                    .bind(rule.kind.to_string())
                    .bind(&rule.pattern)
                    .bind(rule.is_active as i64)
                    .bind(id)
                    .execute(pool)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(sqlx::Error::RowNotFound);
            }
            Ok(id)
        }
        None => {
            let result =
                sqlx::query("INSERT INTO ignore_rules (kind, pattern, is_active) VALUES (?, ?, ?)")
                    .bind(rule.kind.to_string())
                    .bind(&rule.pattern)
                    .bind(rule.is_active as i64)
                    .execute(pool)
                    .await?;
            Ok(result.last_insert_rowid())
        }
    }
}

pub async fn delete_ignore_rule(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
    let result = sqlx::query("DELETE FROM ignore_rules WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

// ── Notification tiers ──

pub async fn get_notification_tiers(pool: &DbPool) -> Result<Vec<NotificationTier>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, i64, i64, i64)>(
        "SELECT id, key, label, min_amount_cents, enabled, sound FROM notification_tiers ORDER BY min_amount_cents, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| NotificationTier {
            id: Some(r.0),
            key: r.1,
            label: r.2,
            min_amount: Money::from_cents(r.3),
            enabled: r.4 != 0,
            sound: r.5 != 0,
        })
        .collect())
}

/// Insert, or replace the tier with the same key.
pub async fn save_notification_tier(
    pool: &DbPool,
    tier: &NotificationTier,
) -> Result<i64, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notification_tiers (key, label, min_amount_cents, enabled, sound)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
            label = excluded.label,
            min_amount_cents = excluded.min_amount_cents,
            enabled = excluded.enabled,
            sound = excluded.sound
        "#,
    )
    .bind(&tier.key)
    .bind(&tier.label)
    .bind(tier.min_amount.to_cents())
    .bind(tier.enabled as i64)
    .bind(tier.sound as i64)
    .execute(pool)
    .await?;

    let (id,) = sqlx::query_as::<_, (i64,)>("SELECT id FROM notification_tiers WHERE key = ?")
        .bind(&tier.key)
        .fetch_one(pool)
        .await?;
    Ok(id)
}
