//! Seams to the two external collaborators.
//!
//! The controller only ever talks to these traits. `blockchain::LotteryClient`
//! and `blockchain::Wallet` are the production implementations; tests swap in
//! in-memory fakes.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::blockchain::types::BlockchainResult;
use crate::lottery::types::{Item, TxReceipt};

/// Remote interface to the deployed lottery contract.
///
/// Reads are free and side-effect free. Writes are sent from `from`, which must
/// be an account the signing wallet holds; ownership rules are enforced by the
/// contract, not here.
#[async_trait]
pub trait LotteryService: Send + Sync {
    /// Address of the contract instance every call is keyed to.
    fn contract_address(&self) -> Address;

    async fn get_items(&self) -> BlockchainResult<Vec<Item>>;

    async fn get_owners(&self) -> BlockchainResult<Vec<Address>>;

    async fn get_winners_declared(&self) -> BlockchainResult<bool>;

    /// Native balance held by `contract`, in wei.
    async fn get_balance(&self, contract: Address) -> BlockchainResult<U256>;

    /// Place a paid bid on `item_id`.
    async fn bid(
        &self,
        from: Address,
        item_id: u64,
        value: U256,
        gas_limit: u64,
    ) -> BlockchainResult<TxReceipt>;

    async fn declare_winners(&self, from: Address) -> BlockchainResult<TxReceipt>;

    async fn withdraw(&self, from: Address) -> BlockchainResult<TxReceipt>;

    async fn reset(&self, from: Address) -> BlockchainResult<TxReceipt>;

    async fn transfer_ownership(
        &self,
        from: Address,
        new_owner: Address,
    ) -> BlockchainResult<TxReceipt>;

    async fn self_destruct(&self, from: Address) -> BlockchainResult<TxReceipt>;
}

/// Holder of the user's accounts.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask for access to the user's accounts. The first entry is the active one.
    ///
    /// An error or an empty list both mean access was not granted.
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>>;

    /// Subscribe to account switches. Each message lists the accounts with the
    /// newly active one first.
    fn account_changes(&self) -> broadcast::Receiver<Vec<Address>>;
}
