//! Chain access: the production `LotteryService` and `WalletProvider`.
//!
//! # Data Flow
//! ```text
//! LOTTERY_PRIVATE_KEYS (comma-separated)
//!     → wallet.rs (local signers, active account, account switches)
//!     → client.rs (failover reads, primary-only signed writes, receipts)
//!     → abi.rs (sol! bindings for the deployed contract)
//! ```
//!
//! # Constraints
//! - Keys come from the environment only and are never logged
//! - Every RPC call is bounded by a timeout
//! - An unreachable node degrades reads; it never aborts the controller

pub mod abi;
pub mod client;
pub mod types;
pub mod wallet;

pub use client::LotteryClient;
pub use types::{BlockchainError, BlockchainResult, ChainId};
pub use wallet::Wallet;
