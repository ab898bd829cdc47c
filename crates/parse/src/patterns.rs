//! Shared extraction primitives. Every bank parser falls back to these when
//! none of its own templates recognise the message layout.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use smsledger_core::{Money, TransactionType};

/// How far back from an amount we look for a balance label.
const BALANCE_LOOKBEHIND_CHARS: usize = 25;
/// Keyword hits within this many characters of the amount count double.
const PROXIMITY_WINDOW_CHARS: usize = 30;
const PROXIMITY_BOOST: u32 = 2;
const STRONG: u32 = 3;
const WEAK: u32 = 1;
const MODIFIER: u32 = 2;

const MERCHANT_MIN_LEN: usize = 3;
const MERCHANT_MAX_LEN: usize = 49;

// ── Amount ───────────────────────────────────────────────────────────────────

re!(re_amount_before_keyword,
    r"(?i)(?:\brs\.?|\binr|₹)\s*(\d[\d,]*(?:\.\d{1,2})?)\s*(?:/-\s*)?(?:(?:has\s+been|have\s+been|is|was)\s+)?(?:debited|credited|deducted|withdrawn|spent|paid|received|sent|transferred|charged|deposited|refunded|reversed)\b");
re!(re_amount_after_keyword,
    r"(?i)\b(?:debited|credited|deducted|withdrawn|spent|paid|received|sent|transferred|charged|deposited|refunded|reversed|debit\s+of|credit\s+of|payment\s+of|purchase\s+of)\s+(?:(?:by|for|with|of|amounting\s+to)\s+)?(?:(?:rs\.?|inr|₹)\s*)?(\d[\d,]*(?:\.\d{1,2})?)");
re!(re_amount_labeled,
    r"(?i)\b(?:transaction\s+amount|txn\s+amt|amount|amt)\b\s*(?:of|is|:|-|=)?\s*(?:(?:rs\.?|inr|₹)\s*)?(\d[\d,]*(?:\.\d{1,2})?)");
re!(re_amount_no_space,
    r"(?i)(?:\brs\.|\brs|\binr|₹)(\d[\d,]*(?:\.\d{1,2})?)");
re!(re_amount_currency,
    r"(?i)(?:\brs\.?|\binr|₹)\s*(\d[\d,]*(?:\.\d{1,2})?)");
re!(re_amount_trailing,
    r"(?i)\b(\d[\d,]*(?:\.\d{1,2})?)\s*(?:/-|\binr\b|\brs\b|\brupees\b)");

re!(re_balance_word,
    r"(?i)\b(?:(?:avl|avbl|avail(?:able)?)\.?\s*)?bal(?:ance)?\b|\b(?:avl|avbl|avail(?:able)?)\b");
re!(re_date_or_time_tail, r"^[-/:]\d");

/// A transaction amount together with where it sits in the body.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountMatch {
    pub amount: Money,
    pub span: Range<usize>,
}

/// Locate the transaction amount, trying each layout from most to least
/// specific. Figures introduced by a balance label are never returned.
pub fn find_amount(body: &str) -> Option<AmountMatch> {
    let patterns = [
        re_amount_before_keyword(),
        re_amount_after_keyword(),
        re_amount_labeled(),
        re_amount_no_space(),
        re_amount_currency(),
        re_amount_trailing(),
    ];
    patterns.iter().find_map(|re| {
        re.captures_iter(body).find_map(|caps| {
            let m = caps.get(1)?;
            if preceded_by_balance_label(body, m.start()) {
                return None;
            }
            if re_date_or_time_tail().is_match(&body[m.end()..]) {
                return None;
            }
            let amount = Money::parse(m.as_str())?;
            amount.is_positive().then(|| AmountMatch {
                amount,
                span: m.range(),
            })
        })
    })
}

pub fn extract_amount(body: &str) -> Option<Money> {
    find_amount(body).map(|m| m.amount)
}

fn preceded_by_balance_label(body: &str, start: usize) -> bool {
    let prefix = &body[..start];
    let from = prefix
        .char_indices()
        .rev()
        .nth(BALANCE_LOOKBEHIND_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let mut window = &prefix[from..];
    // A label followed by its own figure belongs to that figure.
    if let Some(last) = re_amount_currency().find_iter(window).last() {
        window = &window[last.end()..];
    }
    re_balance_word().is_match(window)
}

// ── Direction ────────────────────────────────────────────────────────────────

/// Whole-word direction vocabulary with its weight. Abbreviations count as
/// strong signals.
const TYPE_KEYWORDS: &[(&str, TransactionType, u32)] = &[
    ("debited", TransactionType::Debit, STRONG),
    ("deducted", TransactionType::Debit, STRONG),
    ("withdrawn", TransactionType::Debit, STRONG),
    ("charged", TransactionType::Debit, STRONG),
    ("dbtd", TransactionType::Debit, STRONG),
    ("wdl", TransactionType::Debit, STRONG),
    ("paid", TransactionType::Debit, WEAK),
    ("sent", TransactionType::Debit, WEAK),
    ("debit", TransactionType::Debit, WEAK),
    ("payment", TransactionType::Debit, WEAK),
    ("spent", TransactionType::Debit, WEAK),
    ("purchase", TransactionType::Debit, WEAK),
    ("transferred", TransactionType::Debit, WEAK),
    ("top-up", TransactionType::Debit, WEAK),
    ("autopay", TransactionType::Debit, WEAK),
    ("auto-pay", TransactionType::Debit, WEAK),
    ("credited", TransactionType::Credit, STRONG),
    ("deposited", TransactionType::Credit, STRONG),
    ("refund", TransactionType::Credit, STRONG),
    ("refunded", TransactionType::Credit, STRONG),
    ("reversed", TransactionType::Credit, STRONG),
    ("crd", TransactionType::Credit, STRONG),
    ("received", TransactionType::Credit, WEAK),
    ("credit", TransactionType::Credit, WEAK),
    ("cashback", TransactionType::Credit, WEAK),
    ("salary", TransactionType::Credit, WEAK),
    ("inward", TransactionType::Credit, WEAK),
];

/// Phrases that shift the balance regardless of proximity. Using a card of
/// either kind is spending.
const TYPE_MODIFIERS: &[(&str, TransactionType)] = &[
    (r"debit\s+card", TransactionType::Debit),
    (r"credit\s+card", TransactionType::Debit),
    ("emi", TransactionType::Debit),
    ("atm", TransactionType::Debit),
    (r"loan\s+disbursed", TransactionType::Credit),
];

fn keyword_matchers() -> &'static [(Regex, TransactionType, u32)] {
    static R: OnceLock<Vec<(Regex, TransactionType, u32)>> = OnceLock::new();
    R.get_or_init(|| {
        TYPE_KEYWORDS
            .iter()
            .map(|(kw, kind, weight)| {
                let re = Regex::new(&format!(r"(?i)\b{kw}\b")).expect("invalid regex");
                (re, *kind, *weight)
            })
            .collect()
    })
}

fn modifier_matchers() -> &'static [(Regex, TransactionType)] {
    static R: OnceLock<Vec<(Regex, TransactionType)>> = OnceLock::new();
    R.get_or_init(|| {
        TYPE_MODIFIERS
            .iter()
            .map(|(phrase, kind)| {
                let re = Regex::new(&format!(r"(?i)\b{phrase}\b")).expect("invalid regex");
                (re, *kind)
            })
            .collect()
    })
}

/// Accumulated evidence for each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeScore {
    pub debit: u32,
    pub credit: u32,
}

impl TypeScore {
    fn add(&mut self, kind: TransactionType, weight: u32) {
        match kind {
            TransactionType::Debit => self.debit += weight,
            TransactionType::Credit => self.credit += weight,
        }
    }

    /// `None` when there is no evidence at all. Ties go to debit.
    pub fn resolve(&self) -> Option<TransactionType> {
        match (self.debit, self.credit) {
            (0, 0) => None,
            (d, c) if d >= c => Some(TransactionType::Debit),
            _ => Some(TransactionType::Credit),
        }
    }
}

/// Score both directions. Each keyword contributes once, at its best
/// occurrence; an occurrence near the amount counts double.
pub fn score_transaction_type(body: &str) -> TypeScore {
    let amount_span = find_amount(body).map(|m| m.span);
    let mut score = TypeScore::default();

    for (re, kind, weight) in keyword_matchers() {
        let best = re
            .find_iter(body)
            .map(|m| {
                let near = amount_span.as_ref().is_some_and(|span| {
                    char_gap(body, span, &m.range()) <= PROXIMITY_WINDOW_CHARS
                });
                if near {
                    weight * PROXIMITY_BOOST
                } else {
                    *weight
                }
            })
            .max();
        if let Some(w) = best {
            score.add(*kind, w);
        }
    }

    for (re, kind) in modifier_matchers() {
        if re.is_match(body) {
            score.add(*kind, MODIFIER);
        }
    }

    score
}

pub fn extract_transaction_type(body: &str) -> Option<TransactionType> {
    score_transaction_type(body).resolve()
}

/// True if the body uses any word from the direction vocabulary.
pub fn has_transaction_keyword(body: &str) -> bool {
    keyword_matchers().iter().any(|(re, _, _)| re.is_match(body))
}

/// Characters between two byte ranges of `body`; zero when they overlap.
fn char_gap(body: &str, a: &Range<usize>, b: &Range<usize>) -> usize {
    let between = if b.start >= a.end {
        &body[a.end..b.start]
    } else if a.start >= b.end {
        &body[b.end..a.start]
    } else {
        return 0;
    };
    between.chars().count()
}

// ── Account ──────────────────────────────────────────────────────────────────

re!(re_account_labeled,
    r"(?i)\b(?:a/c|acct|account|card|ac)\b\.?\s*(?:no\.?|number|ending(?:\s+(?:with|in))?)?\s*[:#-]?\s*[x*.]*\s*(\d{3,})");
re!(re_account_masked,
    r"(?i)(?:\bx{2,}|\*{2,})(\d{3,4})\b");

/// The last (up to) four digits of the account or card the message refers to.
pub fn extract_account_last_four(body: &str) -> Option<String> {
    [re_account_labeled(), re_account_masked()]
        .iter()
        .find_map(|re| re.captures(body))
        .and_then(|c| c.get(1))
        .map(|m| last_four(m.as_str()))
}

pub(crate) fn last_four(digits: &str) -> String {
    let start = digits.len().saturating_sub(4);
    digits[start..].to_string()
}

// ── Merchant ─────────────────────────────────────────────────────────────────

re!(re_merchant_vpa_labeled,
    r"(?i)\b(?:to|from)\s+(?:vpa\s+)?([a-z0-9][a-z0-9._-]*@[a-z]{2,})");
re!(re_merchant_preposition,
    r"(?im)(?:\b(?:at|to|from)|@)\s+([a-z0-9][a-z0-9 &'_-]*?)(?:\s+(?:on|ref|txn|for|via|using|with|upi|avl|bal|dated|info)\b|[.,;:(]|$)");
re!(re_merchant_vpa_bare,
    r"(?i)\b([a-z0-9][a-z0-9._-]*@[a-z]{2,})\b");
re!(re_merchant_stopword,
    r"(?i)^(?:your|you|ur|a/c|ac|acct|account|card|beneficiary|mobile|number|no)\b|\ba/c\b|\bx{2,}\d");

/// The raw counterparty name, before normalization.
pub fn extract_merchant(body: &str) -> Option<String> {
    [
        re_merchant_vpa_labeled(),
        re_merchant_preposition(),
        re_merchant_vpa_bare(),
    ]
    .iter()
    .find_map(|re| {
        re.captures_iter(body)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .find(|candidate| is_plausible_merchant(candidate))
            .map(str::to_string)
    })
}

pub(crate) fn is_plausible_merchant(candidate: &str) -> bool {
    let len = candidate.chars().count();
    (MERCHANT_MIN_LEN..=MERCHANT_MAX_LEN).contains(&len)
        && candidate.chars().any(char::is_alphabetic)
        && !re_merchant_stopword().is_match(candidate)
}

// ── Reference ────────────────────────────────────────────────────────────────

re!(re_reference_labeled,
    r"(?i)\b(?:ref|txn|utr|rrn|trans|reference|transaction)[^\d]{0,20}?(\d{8,})");
re!(re_reference_utr,
    r"(?i)\butr\b[\s:.#-]{0,5}([a-z0-9]{10,22})\b");
re!(re_reference_upi,
    r"(?i)\bupi[\s:/-]{1,3}(?:[a-z0-9]+/)?(\d{8,})");

pub fn extract_reference_number(body: &str) -> Option<String> {
    [re_reference_utr(), re_reference_labeled(), re_reference_upi()]
        .iter()
        .find_map(|re| re.captures(body))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_uppercase())
}

// ── Balance ──────────────────────────────────────────────────────────────────

re!(re_balance,
    r"(?i)\b(?:avl\.?\s*bal(?:ance)?|avbl\.?\s*bal(?:ance)?|avail(?:able)?\.?\s*bal(?:ance)?|bal(?:ance)?)\b[^\d]{0,20}?(\d[\d,]*(?:\.\d{1,2})?)");

/// The balance quoted after the transaction, if the bank includes one.
pub fn extract_balance(body: &str) -> Option<Money> {
    let c = re_balance().captures(body)?;
    Money::parse(c.get(1)?.as_str())
}

// ── Message state ────────────────────────────────────────────────────────────

re!(re_non_final,
    r"(?i)\b(?:pending|will\s+be\s+(?:debited|credited|deducted|charged)|is\s+due|due\s+(?:on|by|date)|thank\s+you\s+for\s+(?:paying|your\s+payment)|payment\s+reminder|is\s+scheduled|has\s+requested|collect\s+request)\b");
re!(re_failed,
    r"(?i)\b(?:transaction|txn|payment|transfer|debit)\b[^.]{0,40}?\b(?:failed|declined|unsuccessful)\b|\b(?:failed|declined|unsuccessful)\s+(?:transaction|txn|payment|transfer|debit)\b");
re!(re_reversal,
    r"(?i)\b(?:refund(?:ed)?|revers(?:ed|al)|credited\s+back)\b");
re!(re_outgoing_confirmation,
    r"(?is)\b(?:neft|imps|rtgs)\b.*?\bcredited\s+to\s+(?:the\s+)?(?:beneficiary|benef)");

/// Pending, failed, reminder and thank-you messages describe something other
/// than a completed transaction. A refund or reversal of a failed payment is
/// itself a completed credit.
pub fn is_non_final(body: &str) -> bool {
    re_non_final().is_match(body)
        || (re_failed().is_match(body) && !re_reversal().is_match(body))
}

/// "Your NEFT ... credited to beneficiary" confirms the payee's side of a
/// transfer whose debit arrives as its own message.
pub fn is_outgoing_confirmation(body: &str) -> bool {
    re_outgoing_confirmation().is_match(body)
}
