//! Lottery contract RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Read lottery state (items, owners, winners flag, balance)
//! - Submit signed write transactions and wait for their receipts
//! - Handle timeouts and network errors gracefully
//!
//! Reads fail over across providers. Writes go to the primary only so a
//! transaction is never broadcast twice.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::abi::ILottery::{self, ILotteryInstance};
use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
use crate::lottery::service::LotteryService;
use crate::lottery::types::{Item, TxReceipt};
use crate::observability::metrics;

/// Contract client wrapper with failover support.
#[derive(Clone)]
pub struct LotteryClient {
    /// Read-only providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Contract bindings over each read provider, same order.
    readers: Vec<ILotteryInstance<DynProvider>>,
    /// Contract binding over the signing primary provider, if a wallet was supplied.
    writer: Option<ILotteryInstance<DynProvider>>,
    /// Deployed contract address.
    contract: Address,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl LotteryClient {
    /// Create a new contract client.
    ///
    /// # Arguments
    /// * `config` - Blockchain configuration
    /// * `contract` - Deployed lottery contract address
    /// * `wallet` - Signing wallet; without one every write fails with `NotAvailable`
    pub async fn new(
        config: BlockchainConfig,
        contract: Address,
        wallet: Option<EthereumWallet>,
    ) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(ProviderBuilder::new().connect_http(primary_url.clone()).erased());

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(ProviderBuilder::new().connect_http(url).erased());
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        // 3. Signing provider on the primary endpoint
        let writer = wallet.map(|wallet| {
            let provider = ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(primary_url)
                .erased();
            ILottery::new(contract, provider)
        });

        let readers = providers
            .iter()
            .map(|p| ILottery::new(contract, p.clone()))
            .collect();

        let client = Self {
            providers,
            readers,
            writer,
            contract,
            config: config.clone(),
            timeout_duration,
        };

        // Verify chain ID matches configuration
        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    contract = %contract,
                    "Lottery client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Lottery client initialized but chain verification failed"
                );
                // Don't fail initialization - the poll loop heals once the RPC is up
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    /// Run a contract read against each provider in turn until one answers.
    async fn read<T, F, Fut>(&self, what: &'static str, call: F) -> BlockchainResult<T>
    where
        F: Fn(ILotteryInstance<DynProvider>) -> Fut,
        Fut: Future<Output = Result<T, alloy::contract::Error>>,
    {
        for (i, reader) in self.readers.iter().enumerate() {
            match timeout(self.timeout_duration, call(reader.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, call = what, error = %e, "Contract call failed"),
                Err(_) => tracing::warn!(provider_idx = i, call = what, "Contract call timeout"),
            }
        }
        Err(BlockchainError::Rpc(format!("All providers failed to {}", what)))
    }

    /// Send a write through the signing provider and wait for it to be mined.
    async fn send<F, Fut>(&self, action: &'static str, from: Address, call: F) -> BlockchainResult<TxReceipt>
    where
        F: FnOnce(ILotteryInstance<DynProvider>) -> Fut,
        Fut: Future<Output = BlockchainResult<TransactionReceipt>>,
    {
        let writer = self.writer.clone().ok_or_else(|| {
            BlockchainError::NotAvailable("no signing wallet configured".to_string())
        })?;

        tracing::debug!(action = action, from = %from, "Submitting transaction");

        let tx_timeout = Duration::from_secs(self.config.tx_timeout_secs);
        let receipt = match timeout(tx_timeout, call(writer)).await {
            Ok(result) => result?,
            Err(_) => return Err(BlockchainError::Timeout(self.config.tx_timeout_secs)),
        };

        if !receipt.status() {
            return Err(BlockchainError::Reverted {
                action,
                tx: receipt.transaction_hash,
            });
        }

        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    /// Check if the RPC is reachable.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_chain_id().await.is_ok();
        metrics::record_rpc_health(healthy);
        healthy
    }
}

#[async_trait]
impl LotteryService for LotteryClient {
    fn contract_address(&self) -> Address {
        self.contract
    }

    async fn get_items(&self) -> BlockchainResult<Vec<Item>> {
        let raw = self
            .read("get items", |c| async move { c.getItems().call().await })
            .await?;

        raw.into_iter()
            .map(|item| {
                let id = u64::try_from(item.itemId).map_err(|_| {
                    BlockchainError::Contract(format!("item id {} does not fit in u64", item.itemId))
                })?;
                Ok(Item::from_contract(id, item.itemTokens, item.winner))
            })
            .collect()
    }

    async fn get_owners(&self) -> BlockchainResult<Vec<Address>> {
        self.read("get owners", |c| async move { c.getOwners().call().await })
            .await
    }

    async fn get_winners_declared(&self) -> BlockchainResult<bool> {
        self.read("get winners status", |c| async move {
            c.getWinnersDeclaredStatus().call().await
        })
        .await
    }

    async fn get_balance(&self, contract: Address) -> BlockchainResult<U256> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_balance(contract);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get balance".to_string()))
    }

    async fn bid(
        &self,
        from: Address,
        item_id: u64,
        value: U256,
        gas_limit: u64,
    ) -> BlockchainResult<TxReceipt> {
        self.send("bid", from, move |c| async move {
            let pending = c
                .bid(U256::from(item_id))
                .from(from)
                .value(value)
                .gas(gas_limit)
                .send()
                .await?;
            Ok::<_, BlockchainError>(pending.get_receipt().await?)
        })
        .await
    }

    async fn declare_winners(&self, from: Address) -> BlockchainResult<TxReceipt> {
        self.send("declare winners", from, move |c| async move {
            let pending = c.declareWinners().from(from).send().await?;
            Ok::<_, BlockchainError>(pending.get_receipt().await?)
        })
        .await
    }

    async fn withdraw(&self, from: Address) -> BlockchainResult<TxReceipt> {
        self.send("withdraw", from, move |c| async move {
            let pending = c.withdraw().from(from).send().await?;
            Ok::<_, BlockchainError>(pending.get_receipt().await?)
        })
        .await
    }

    async fn reset(&self, from: Address) -> BlockchainResult<TxReceipt> {
        self.send("reset", from, move |c| async move {
            let pending = c.reset().from(from).send().await?;
            Ok::<_, BlockchainError>(pending.get_receipt().await?)
        })
        .await
    }

    async fn transfer_ownership(
        &self,
        from: Address,
        new_owner: Address,
    ) -> BlockchainResult<TxReceipt> {
        self.send("transfer ownership", from, move |c| async move {
            let pending = c.transferOwnership(new_owner).from(from).send().await?;
            Ok::<_, BlockchainError>(pending.get_receipt().await?)
        })
        .await
    }

    async fn self_destruct(&self, from: Address) -> BlockchainResult<TxReceipt> {
        self.send("self destruct", from, move |c| async move {
            let pending = c.selfDestruct().from(from).send().await?;
            Ok::<_, BlockchainError>(pending.get_receipt().await?)
        })
        .await
    }
}

impl std::fmt::Debug for LotteryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotteryClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("contract", &self.contract)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .field("can_sign", &self.writer.is_some())
            .finish()
    }
}
