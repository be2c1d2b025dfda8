//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the console.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::wallet::PRIVATE_KEYS_ENV_VAR;

/// Root configuration for the lottery console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LotteryConfig {
    /// JSON-RPC connection settings.
    pub blockchain: BlockchainConfig,

    /// Lottery contract and polling settings.
    pub lottery: LotteryContractConfig,

    /// Local wallet settings.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Maximum time to wait for a submitted transaction to be mined, in seconds.
    pub tx_timeout_secs: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            tx_timeout_secs: 120,
        }
    }
}

/// Lottery contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LotteryContractConfig {
    /// Address of the deployed lottery contract.
    pub contract_address: String,

    /// Interval between full refreshes in milliseconds.
    pub poll_interval_ms: u64,

    /// Payment attached to every bid, in ether.
    pub bid_amount_ether: String,

    /// Gas allowance for a bid transaction.
    pub bid_gas_limit: u64,

    /// Display names indexed by item id.
    pub item_names: Vec<String>,
}

impl Default for LotteryContractConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            poll_interval_ms: 4000,
            bid_amount_ether: "0.01".to_string(),
            bid_gas_limit: 1_000_000,
            item_names: vec![
                "car".to_string(),
                "laptop".to_string(),
                "smartphone".to_string(),
            ],
        }
    }
}

/// Local wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Name of the environment variable holding comma-separated private keys.
    ///
    /// The keys themselves never appear in the config file.
    pub private_keys_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_keys_env: PRIVATE_KEYS_ENV_VAR.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = LotteryConfig::default();
        assert_eq!(config.lottery.poll_interval_ms, 4000);
        assert_eq!(config.lottery.bid_amount_ether, "0.01");
        assert_eq!(config.lottery.bid_gas_limit, 1_000_000);
        assert_eq!(config.lottery.item_names.len(), 3);
        assert_eq!(config.wallet.private_keys_env, "LOTTERY_PRIVATE_KEYS");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LotteryConfig = toml::from_str(
            r#"
            [lottery]
            contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            poll_interval_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.lottery.poll_interval_ms, 1000);
        assert_eq!(config.lottery.bid_gas_limit, 1_000_000);
        assert_eq!(config.blockchain.rpc_url, "http://localhost:8545");
    }
}
