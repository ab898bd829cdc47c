//! Turns the text of a bank or payment-app SMS into a [`ParsedTransaction`].
//!
//! Everything here is pure: no I/O, no clock, no shared state beyond the
//! lazily compiled regex cache. Parsers are conservative and return `None`
//! for anything that does not read as a completed transaction.
//!
//! [`ParsedTransaction`]: smsledger_core::ParsedTransaction

// ── Compiled regex cache ─────────────────────────────────────────────────────

/// Declare `fn $name() -> &'static Regex`, compiled on first use.
#[macro_export]
macro_rules! re {
    ($vis:vis $name:ident, $pat:expr) => {
        $vis fn $name() -> &'static $crate::regex::Regex {
            static R: std::sync::OnceLock<$crate::regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| $crate::regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

#[doc(hidden)]
pub use regex;

pub mod merchant;
pub mod parsers;
pub mod patterns;
pub mod router;

pub use merchant::normalize_merchant;
pub use parsers::{
    AxisParser, BankParser, FreeTextParser, FreeTextTransaction, GenericParser, HdfcParser,
    HsbcParser, IciciParser, KotakParser, PnbParser, SbiParser, UpiParser,
};
pub use patterns::{
    extract_account_last_four, extract_amount, extract_balance, extract_merchant,
    extract_reference_number, extract_transaction_type, find_amount, has_transaction_keyword,
    is_non_final, is_outgoing_confirmation, score_transaction_type, AmountMatch, TypeScore,
};
pub use router::ParserRouter;
