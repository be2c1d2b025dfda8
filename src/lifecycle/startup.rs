//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the wallet from the environment, if one is configured
//! - Build the contract client, signing through the wallet when present
//! - Assemble the controller
//!
//! # Design Decisions
//! - Fail fast on bad configuration or malformed keys
//! - A missing key variable means "no wallet provider", not an error

use alloy::primitives::utils::UnitsError;
use alloy::primitives::Address;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::blockchain::{LotteryClient, Wallet};
use crate::config::LotteryConfig;
use crate::controller::{ControllerSettings, SessionController};
use crate::lottery::service::WalletProvider;
use crate::lottery::types::ItemCatalog;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid contract address '{0}'")]
    ContractAddress(String),

    #[error("invalid bid amount: {0}")]
    BidAmount(#[from] UnitsError),

    #[error("wallet: {0}")]
    Wallet(BlockchainError),

    #[error("client: {0}")]
    Client(BlockchainError),
}

/// Everything the binary needs after startup.
pub struct App {
    pub controller: Arc<SessionController>,
    pub wallet: Option<Wallet>,
    pub catalog: ItemCatalog,
}

/// Build the application from a validated configuration.
///
/// # Arguments
/// * `config` - Validated configuration
/// * `account` - Index of the loaded key to make active, if not the first
pub async fn start(config: &LotteryConfig, account: Option<usize>) -> Result<App, StartupError> {
    let contract: Address = config
        .lottery
        .contract_address
        .parse()
        .map_err(|_| StartupError::ContractAddress(config.lottery.contract_address.clone()))?;

    let settings = ControllerSettings::from_config(&config.lottery)?;

    let wallet = match Wallet::from_env(&config.wallet.private_keys_env, config.blockchain.chain_id) {
        Ok(wallet) => Some(wallet),
        Err(BlockchainError::NotAvailable(reason)) => {
            tracing::info!(reason = %reason, "Starting without a wallet provider");
            None
        }
        Err(e) => return Err(StartupError::Wallet(e)),
    };

    if let (Some(wallet), Some(index)) = (&wallet, account) {
        wallet.switch_account(index).map_err(StartupError::Wallet)?;
    }

    let client = LotteryClient::new(
        config.blockchain.clone(),
        contract,
        wallet.as_ref().map(Wallet::ethereum_wallet),
    )
    .await
    .map_err(StartupError::Client)?;

    if !client.is_healthy().await {
        tracing::warn!(
            rpc_url = %config.blockchain.rpc_url,
            "RPC endpoint unreachable; reads will retry on every poll"
        );
    }

    let provider = wallet
        .clone()
        .map(|w| Arc::new(w) as Arc<dyn WalletProvider>);

    let controller = Arc::new(SessionController::new(provider, Arc::new(client), settings));

    Ok(App {
        controller,
        wallet,
        catalog: ItemCatalog::new(config.lottery.item_names.clone()),
    })
}
