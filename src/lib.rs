//! Lottery console library.
//!
//! A client for a pre-deployed lottery contract: keeps local projections of
//! the contract state fresh by polling, binds to a wallet session, and submits
//! bids and owner actions.

pub mod blockchain;
pub mod config;
pub mod controller;
pub mod lifecycle;
pub mod lottery;
pub mod observability;

pub use config::LotteryConfig;
pub use controller::SessionController;
pub use lifecycle::Shutdown;
