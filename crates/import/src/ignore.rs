//! Message pre-filtering: user ignore rules plus the built-in noise filter.

use regex::{Regex, RegexBuilder};
use smsledger_core::{IgnoreRule, IgnoreRuleKind, InboundMessage};
use smsledger_parse::has_transaction_keyword;

/// Sender-id prefixes Indian carriers assign to promotional traffic.
const PROMO_SENDER_PREFIXES: &[&str] = &["AD-", "VD-", "VM-", "VK-", "DM-", "MD-", "TM-"];

smsledger_parse::re!(otp_re,
    r"(?i)\b(?:otp|one\s+time\s+password|verification\s+code|verify\s+your)\b");
smsledger_parse::re!(promo_keyword_re,
    r"(?i)\b(?:offers?|discounts?|sale|cashback\s+offer|limited\s+time|hurry|subscribe|unsubscribe|reply\s+stop)\b");

/// The static, non-configurable noise filter.
///
/// OTP and verification messages are always dropped. Promotional senders and
/// promotional wording are dropped only when the body carries no transaction
/// vocabulary, since banks also send real alerts from `AD-`/`VM-` style ids.
pub fn is_default_ignored(message: &InboundMessage) -> bool {
    if otp_re().is_match(&message.body) {
        return true;
    }
    if has_transaction_keyword(&message.body) {
        return false;
    }
    let sender = message.sender.to_uppercase();
    PROMO_SENDER_PREFIXES.iter().any(|p| sender.starts_with(p))
        || promo_keyword_re().is_match(&message.body)
}

enum Matcher {
    /// Upper-cased.
    Sender(String),
    /// Lower-cased.
    Keyword(String),
    Regex(Regex),
}

/// An immutable snapshot of the active user ignore rules, compiled once per
/// sync run and evaluated in load order.
pub struct IgnoreRuleSet {
    matchers: Vec<Matcher>,
}

impl IgnoreRuleSet {
    pub fn new(rules: impl IntoIterator<Item = IgnoreRule>) -> Self {
        let matchers = rules
            .into_iter()
            .filter(|r| r.is_active && !r.pattern.trim().is_empty())
            .filter_map(|rule| match rule.kind {
                IgnoreRuleKind::Sender => Some(Matcher::Sender(rule.pattern.to_uppercase())),
                IgnoreRuleKind::Keyword => Some(Matcher::Keyword(rule.pattern.to_lowercase())),
                IgnoreRuleKind::Regex => match RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                {
                    Ok(re) => Some(Matcher::Regex(re)),
                    Err(e) => {
                        tracing::warn!(pattern = %rule.pattern, error = %e, "skipping invalid ignore regex");
                        None
                    }
                },
            })
            .collect();
        Self { matchers }
    }

    pub fn empty() -> Self {
        Self { matchers: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn should_ignore(&self, message: &InboundMessage) -> bool {
        let sender = message.sender.to_uppercase();
        let body = message.body.to_lowercase();
        self.matchers.iter().any(|m| match m {
            Matcher::Sender(p) => sender.contains(p.as_str()),
            Matcher::Keyword(p) => body.contains(p.as_str()),
            Matcher::Regex(re) => re.is_match(&message.body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(sender: &str, body: &str) -> InboundMessage {
        InboundMessage::new(sender, body, Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn otp_is_always_ignored() {
        assert!(is_default_ignored(&msg("VM-HDFCBK", "123456 is your OTP for txn of Rs 500")));
        assert!(is_default_ignored(&msg("JD-AMAZON", "Your verification code is 9981")));
    }

    #[test]
    fn noise_patterns_are_compiled_once() {
        assert!(std::ptr::eq(otp_re(), otp_re()));
        assert!(std::ptr::eq(promo_keyword_re(), promo_keyword_re()));
        assert!(otp_re().is_match("Your One Time Password is 4411"));
        assert!(!otp_re().is_match("Shop at OTPHUB today"));
        assert!(promo_keyword_re().is_match("Reply STOP to opt out"));
    }

    #[test]
    fn promo_sender_without_transaction_words_is_ignored() {
        assert!(is_default_ignored(&msg("AD-MYNTRA", "End of season styles are here!")));
        assert!(is_default_ignored(&msg("+919812345678", "Flat 50% discount this weekend")));
    }

    #[test]
    fn promo_prefix_never_drops_a_transaction() {
        let m = msg("AD-HSBCIM-S", "INR 2,500.00 debited from A/c XX1234 at RELIANCE DIGITAL");
        assert!(!is_default_ignored(&m));
        let m = msg("VM-AXISBK", "INR 5000.00 credited to A/c no. XX5439 on sale of units");
        assert!(!is_default_ignored(&m));
    }

    #[test]
    fn plain_bank_message_passes() {
        assert!(!is_default_ignored(&msg("HDFCBK", "Your statement is ready")));
    }

    #[test]
    fn user_rules_by_kind() {
        let set = IgnoreRuleSet::new(vec![
            IgnoreRule::new(IgnoreRuleKind::Sender, "dream11"),
            IgnoreRule::new(IgnoreRuleKind::Keyword, "Wallet Top-Up"),
            IgnoreRule::new(IgnoreRuleKind::Regex, r"^lottery\s+\d+"),
        ]);
        assert_eq!(set.len(), 3);
        assert!(set.should_ignore(&msg("VK-DREAM11", "Rs 100 added")));
        assert!(set.should_ignore(&msg("PAYTM", "Rs 100 wallet top-up successful")));
        assert!(set.should_ignore(&msg("X", "LOTTERY 2026 results")));
        assert!(!set.should_ignore(&msg("HDFCBK", "Rs 100 debited")));
    }

    #[test]
    fn inactive_and_invalid_rules_are_skipped() {
        let mut inactive = IgnoreRule::new(IgnoreRuleKind::Keyword, "debited");
        inactive.is_active = false;
        let set = IgnoreRuleSet::new(vec![
            inactive,
            IgnoreRule::new(IgnoreRuleKind::Regex, "(unclosed"),
            IgnoreRule::new(IgnoreRuleKind::Keyword, "cricket"),
        ]);
        assert_eq!(set.len(), 1);
        assert!(!set.should_ignore(&msg("HDFCBK", "Rs 100 debited")));
        assert!(set.should_ignore(&msg("HDFCBK", "Cricket score update")));
    }
}
