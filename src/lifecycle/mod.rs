//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Wallet (optional) → LotteryClient → SessionController
//!
//! Signals (signals.rs):
//!     Ctrl-C / SIGTERM → Shutdown.trigger()
//!
//! Shutdown (shutdown.rs):
//!     broadcast → controller.run() returns → teardown
//! ```
//!
//! # Design Decisions
//! - A missing wallet is not a startup error; the controller reports it
//! - Shutdown is cooperative: subscribers exit on the broadcast

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
