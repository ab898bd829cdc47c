pub mod category;
pub mod clock;
pub mod ignore_rule;
pub mod message;
pub mod money;
pub mod period;
pub mod tier;
pub mod transaction;

pub use category::{Category, CategoryId, CategoryKind, CategoryRule, DEFAULT_CATEGORIES};
pub use clock::{Clock, FixedClock, SystemClock};
pub use ignore_rule::{IgnoreRule, IgnoreRuleKind};
pub use message::InboundMessage;
pub use money::Money;
pub use period::Period;
pub use tier::{default_tiers, NotificationTier};
pub use transaction::{
    NewTransaction, ParsedTransaction, Transaction, TransactionId, TransactionSource,
    TransactionType,
};
