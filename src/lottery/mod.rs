//! Lottery domain model.
//!
//! # Data Flow
//! ```text
//! LotteryService (trait) ──reads──▶ Item / OwnerSet / LotteryStatus projections
//!                        ◀─writes── controller submit_* operations
//! WalletProvider (trait) ──accounts──▶ Session.active_address
//! address.rs normalizes every textual address before comparison
//! ```

pub mod address;
pub mod service;
pub mod types;

pub use address::{is_valid_address, normalize_address};
pub use service::{LotteryService, WalletProvider};
pub use types::{Item, ItemCatalog, LotteryStatus, OwnerSet, TxReceipt};
