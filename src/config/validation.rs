//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the contract address and RPC URLs parse
//! - Validate value ranges (intervals > 0, bid amount parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LotteryConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::utils::parse_ether;
use alloy::primitives::Address;

use crate::config::schema::LotteryConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration.
pub fn validate_config(config: &LotteryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.lottery.contract_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "lottery.contract_address",
            format!("'{}' is not an address", config.lottery.contract_address),
        ));
    }

    if config.lottery.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "lottery.poll_interval_ms",
            "must be greater than zero",
        ));
    }

    if let Err(e) = parse_ether(&config.lottery.bid_amount_ether) {
        errors.push(ValidationError::new(
            "lottery.bid_amount_ether",
            format!("'{}' is not an ether amount: {}", config.lottery.bid_amount_ether, e),
        ));
    }

    if config.lottery.bid_gas_limit == 0 {
        errors.push(ValidationError::new(
            "lottery.bid_gas_limit",
            "must be greater than zero",
        ));
    }

    if config.blockchain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new(
            "blockchain.rpc_url",
            format!("'{}' is not a URL", config.blockchain.rpc_url),
        ));
    }

    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.rpc_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.wallet.private_keys_env.trim().is_empty() {
        errors.push(ValidationError::new(
            "wallet.private_keys_env",
            "must name an environment variable",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
