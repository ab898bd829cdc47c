//! Command handlers. Each returns the text to print so it can be checked in
//! tests without capturing stdout.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use smsledger_core::{CategoryRule, IgnoreRule, IgnoreRuleKind, Money, NotificationTier};
use smsledger_import::{LedgerStore, RecurringDetector, SyncConfig, SyncOrchestrator};
use smsledger_storage::SqliteLedger;

use crate::notify::ChannelNotifier;
use crate::source::JsonExportSource;

const ALERT_QUEUE: usize = 64;

pub async fn sync(
    ledger: SqliteLedger,
    config: &SyncConfig,
    input: &Path,
    days_back: u32,
) -> Result<String> {
    let (notifier, printer) = ChannelNotifier::printing(ALERT_QUEUE);
    let orchestrator = SyncOrchestrator::new(JsonExportSource::new(input), ledger, notifier)
        .with_config(config.clone());

    let summary = orchestrator
        .sync_with_progress(days_back, |done, total| {
            tracing::trace!(done, total, "sync progress");
        })
        .await
        .with_context(|| format!("Sync from {} failed", input.display()))?;

    // Closing the last sender lets the printer drain and stop.
    drop(orchestrator);
    if let Err(e) = printer.await {
        tracing::warn!("alert printer stopped: {e}");
    }

    Ok(format!(
        "Imported {}, skipped {}, errors {}",
        summary.imported, summary.skipped, summary.errors
    ))
}

pub async fn recurring(ledger: &SqliteLedger, config: &SyncConfig, json: bool) -> Result<String> {
    let history = ledger.list_transactions().await?;
    let suggestions = RecurringDetector::new(config).detect(&history, Utc::now());
    if json {
        return Ok(serde_json::to_string_pretty(&suggestions)?);
    }
    if suggestions.is_empty() {
        return Ok("No recurring payments found".to_string());
    }
    let mut out = String::new();
    for s in &suggestions {
        writeln!(
            out,
            "{:<24} {:>12}  {} (every ~{} days, {} charges)",
            s.merchant,
            s.average_amount.to_string(),
            s.frequency,
            s.average_interval_days,
            s.count
        )?;
    }
    Ok(out)
}

pub async fn list_ignore_rules(ledger: &SqliteLedger) -> Result<String> {
    let rules = ledger.list_ignore_rules().await?;
    if rules.is_empty() {
        return Ok("No ignore rules".to_string());
    }
    let mut out = String::new();
    for r in &rules {
        let state = if r.is_active { "" } else { " (inactive)" };
        writeln!(
            out,
            "{:>4}  {:<8} {}{state}",
            r.id.unwrap_or_default(),
            r.kind.to_string(),
            r.pattern
        )?;
    }
    Ok(out)
}

pub async fn add_ignore_rule(ledger: &SqliteLedger, kind: &str, pattern: &str) -> Result<String> {
    let kind: IgnoreRuleKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    if pattern.trim().is_empty() {
        return Err(anyhow!("Ignore pattern must not be empty"));
    }
    let id = ledger
        .save_ignore_rule(&IgnoreRule::new(kind, pattern.trim()))
        .await?;
    Ok(format!("Added ignore rule {id}"))
}

pub async fn remove_ignore_rule(ledger: &SqliteLedger, id: i64) -> Result<String> {
    ledger.delete_ignore_rule(id).await?;
    Ok(format!("Removed ignore rule {id}"))
}

pub async fn add_category_rule(
    ledger: &SqliteLedger,
    pattern: &str,
    category: &str,
    priority: i32,
) -> Result<String> {
    let found = ledger
        .find_category_by_name(category)
        .await?
        .ok_or_else(|| anyhow!("Unknown category: '{category}'"))?;
    let pattern = pattern.trim().to_lowercase();
    if pattern.is_empty() {
        return Err(anyhow!("Category rule pattern must not be empty"));
    }
    let id = ledger
        .save_category_rule(&CategoryRule::new(&pattern, found.id, priority))
        .await?;
    Ok(format!("Added rule {id}: '{pattern}' -> {}", found.name))
}

pub async fn list_categories(ledger: &SqliteLedger) -> Result<String> {
    let mut out = String::new();
    for c in ledger.list_categories().await? {
        writeln!(out, "{:>4}  {:<8} {}", c.id.0, c.kind.to_string(), c.name)?;
    }
    Ok(out)
}

pub async fn list_tiers(ledger: &SqliteLedger) -> Result<String> {
    let mut out = String::new();
    for t in ledger.list_notification_tiers().await? {
        let flags = match (t.enabled, t.sound) {
            (false, _) => "disabled",
            (true, true) => "sound",
            (true, false) => "silent",
        };
        writeln!(
            out,
            "{:<10} {:<12} {:>12}  {flags}",
            t.key,
            t.label,
            t.min_amount.to_string()
        )?;
    }
    Ok(out)
}

pub struct TierUpdate<'a> {
    pub key: &'a str,
    pub label: Option<&'a str>,
    pub min_amount: Option<&'a str>,
    pub enabled: Option<bool>,
    pub sound: Option<bool>,
}

/// Update a tier in place, or create it when the key is new.
pub async fn set_tier(ledger: &SqliteLedger, update: TierUpdate<'_>) -> Result<String> {
    let existing = ledger
        .list_notification_tiers()
        .await?
        .into_iter()
        .find(|t| t.key == update.key);

    let min_amount = match update.min_amount {
        Some(raw) => Some(
            Money::parse(raw)
                .filter(|m| !m.amount().is_sign_negative())
                .ok_or_else(|| anyhow!("Invalid amount: '{raw}'"))?,
        ),
        None => None,
    };

    let mut tier = match existing {
        Some(t) => t,
        None => {
            let min = min_amount.ok_or_else(|| anyhow!("A new tier needs --min"))?;
            NotificationTier::new(update.key, update.label.unwrap_or(update.key), min)
        }
    };
    if let Some(label) = update.label {
        tier.label = label.to_string();
    }
    if let Some(min) = min_amount {
        tier.min_amount = min;
    }
    if let Some(enabled) = update.enabled {
        tier.enabled = enabled;
    }
    if let Some(sound) = update.sound {
        tier.sound = sound;
    }

    ledger.save_notification_tier(&tier).await?;
    Ok(format!(
        "Tier '{}' now {} at {}",
        tier.key,
        if tier.enabled { "alerts" } else { "is off" },
        tier.min_amount
    ))
}
