//! SQLite persistence for the ledger and its user-owned rule tables.

pub mod db;
pub mod hash;
pub mod ledger;

pub use db::{create_db, seed_defaults, DbPool};
pub use hash::raw_sms_hash;
pub use ledger::SqliteLedger;
