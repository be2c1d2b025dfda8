//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LotteryConfig (validated, immutable)
//!     → handed to the blockchain client and controller at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets are referenced by environment variable name, never inlined

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BlockchainConfig;
pub use schema::LotteryConfig;
pub use schema::LotteryContractConfig;
pub use schema::ObservabilityConfig;
pub use schema::WalletConfig;
